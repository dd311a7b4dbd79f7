//! Async driver for battles.
//!
//! This crate wires the pure battle engine to real time and to the chat
//! platform. Consumers build a [`BattleSession`] around a
//! [`battle_core::Battle`], spawn [`BattleSession::run`], and forward user
//! input through [`SessionHandle`].
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the session loop and builder
//! - [`api`] exposes the collaborator traits, handle and errors
//! - [`events`] provides topic-based event bus for observers
//! - [`timer`] implements the cancellable action window countdown
pub mod api;
pub mod events;
pub mod session;
pub mod timer;

pub use api::{
    BattleMessenger, CollaboratorKind, Localizer, MemoryWallet, NullMessenger, Result,
    RuntimeError, SessionHandle, Wallet,
};
pub use events::{ActionEvent, BattleEvent, EventBus, OutcomeEvent, Topic, TurnEvent};
pub use session::{BattleSession, BattleSessionBuilder, SessionConfig, SessionOutcome};
pub use timer::{ActionWindowTimer, TimerState};
