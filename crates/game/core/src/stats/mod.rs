//! Stat model.
//!
//! ```text
//! [ raw stat (entity dictionary + equipment) ]
//!      ↓  modifiers, insertion order (ADD adds, MULT multiplies)
//! [ floor at 0, round to nearest ]
//!      ↓  StatTransform (linear / saturating / speed)
//! [ effective value ]
//! ```
//!
//! Display formatting is computed separately and never feeds the simulation.

pub mod modifiers;
pub mod stat;

pub use modifiers::{ModifierOp, StatModifier, apply_modifiers};
pub use stat::{Stat, StatKind, StatTransform};
