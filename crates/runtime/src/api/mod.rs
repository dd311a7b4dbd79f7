//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the session and event modules can stay focused on orchestration.

pub mod collaborators;
pub mod errors;
pub mod handle;

pub use collaborators::{BattleMessenger, Localizer, MemoryWallet, NullMessenger, Wallet};
pub use errors::{CollaboratorKind, Result, RuntimeError};
pub use handle::SessionHandle;
