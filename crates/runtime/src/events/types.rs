//! Event payloads published by a battle session.

use battle_core::{ActionReport, BattleOutcome, CloseReason, Side, UserId};

/// Turn management events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnEvent {
    /// A side started its turn; `awaiting` lists users with an open window.
    Started {
        side: Side,
        round: u32,
        multiplier: i64,
        awaiting: Vec<UserId>,
    },
    /// The user window of the current turn closed.
    WindowSettled { side: Side, reason: CloseReason },
}

/// One resolved user or bot action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionEvent {
    pub report: ActionReport,
    /// Submitted through a session handle rather than chosen by a bot.
    pub by_user: bool,
}

/// Terminal events, published once per battle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutcomeEvent {
    Finished(BattleOutcome),
    RewardPaid { user: UserId, amount: i64 },
    RewardFailed { user: UserId, amount: i64 },
}
