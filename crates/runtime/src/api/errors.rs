//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from session coordination, collaborators, and the battle
//! engine so clients can bubble them up with consistent context.
use std::fmt;

use thiserror::Error;
use tokio::sync::oneshot;

use battle_core::{ActionRejection, BattleError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("action rejected: {0}")]
    Rejected(#[source] ActionRejection),

    #[error("{kind} collaborator not set")]
    CollaboratorNotSet { kind: CollaboratorKind },

    #[error("{kind} collaborator failed: {reason}")]
    Collaborator {
        kind: CollaboratorKind,
        reason: String,
    },

    #[error("battle session command channel closed")]
    CommandChannelClosed,

    #[error("battle session reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("battle session task join failed")]
    SessionJoin(#[source] tokio::task::JoinError),

    #[error("battle did not finish within {turns} turns")]
    TurnLimitReached { turns: u64 },
}

impl RuntimeError {
    pub fn messenger(reason: impl fmt::Display) -> Self {
        Self::Collaborator {
            kind: CollaboratorKind::Messenger,
            reason: reason.to_string(),
        }
    }

    pub fn wallet(reason: impl fmt::Display) -> Self {
        Self::Collaborator {
            kind: CollaboratorKind::Wallet,
            reason: reason.to_string(),
        }
    }

    /// The rejection reason, when the engine refused a submitted action.
    pub fn rejection(&self) -> Option<&ActionRejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CollaboratorKind {
    Messenger,
    Wallet,
}

impl fmt::Display for CollaboratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CollaboratorKind::Messenger => "messenger",
            CollaboratorKind::Wallet => "wallet",
        };
        write!(f, "{}", label)
    }
}
