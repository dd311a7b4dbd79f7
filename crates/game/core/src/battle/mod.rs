//! Battle simulation.
//!
//! ```text
//! Battle (state machine)
//!   ├─ Roster ─ [BattleGroup; 2] ─ BattleEntity (wraps Entity)
//!   ├─ TurnScheduler (round counter + speed balance)
//!   ├─ ActionWindow (which user may still act this turn)
//!   └─ log: Vec<BattleMessage>
//! ```
//!
//! The engine is synchronous and deterministic for a given [`RandomSource`]:
//! waiting for users is the caller's concern (see the runtime crate), the
//! engine only decides what each event means.
//!
//! [`RandomSource`]: crate::rng::RandomSource

mod action;
mod chapter;
mod combat;
mod combatant;
mod group;
mod message;
mod roster;
mod turn;
mod window;

use std::fmt;

pub use action::{Action, ActionReport, BattleActionData};
pub use chapter::{Battle, BattleOutcome, BattlePhase, TurnStart};
pub use combat::{AttackResult, HitFlags, calculate_damage, resolve_attack};
pub use combatant::BattleEntity;
pub use group::BattleGroup;
pub use message::BattleMessage;
pub use roster::Roster;
pub use turn::{TurnScheduler, TurnTransition};
pub use window::{ActionWindow, CloseReason, WindowDecision, WindowEvent};

/// One of the two opposing groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// Position of a combatant: its side and its index within the group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId {
    pub side: Side,
    pub index: usize,
}

impl CombatantId {
    pub const fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.side, self.index)
    }
}
