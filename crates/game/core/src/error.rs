//! Error types for battle construction and action validation.
//!
//! Two families are kept apart:
//!
//! - [`BattleError`]: invariant violations (bad content, misuse of the API).
//!   These indicate data or programming bugs and abort construction.
//! - [`ActionRejection`]: an action attempt that is not currently legal.
//!   Rejections never change state; the actor may submit again.

use crate::ability::AbilityId;
use crate::battle::Side;
use crate::stats::Stat;

/// Invariant violations surfaced while building or driving a battle.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BattleError {
    #[error("battle group {side} has no combatants")]
    EmptyGroup { side: Side },

    #[error("persistent modifier targets non-persistent stat {stat}")]
    NonPersistentModifier { stat: Stat },

    #[error("unknown ability '{0}'")]
    UnknownAbility(AbilityId),

    #[error("ability rule for '{ability}' has an invalid hp band [{low}, {high}]")]
    InvalidAbilityRule {
        ability: AbilityId,
        low: f64,
        high: f64,
    },

    #[error("battle has already been started")]
    AlreadyStarted,
}

/// Reasons an action attempt was refused.
///
/// The engine treats every rejection as "no effect": no RNG is consumed, no
/// stat changes, and the actor keeps its turn slot.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionRejection {
    #[error("battle is already finished")]
    BattleFinished,

    #[error("battle is not accepting user actions right now")]
    NotAcceptingActions,

    #[error("it is not this user's turn")]
    NotYourTurn,

    #[error("user is not eligible to act this turn")]
    NotEligible,

    #[error("user already acted this turn")]
    AlreadyActed,

    #[error("acting combatant is dead")]
    ActorDead,

    #[error("acting combatant is stunned")]
    Stunned,

    #[error("target is not valid for this action")]
    InvalidTarget,

    #[error("no ability equipped in slot {slot}")]
    InvalidAbilitySlot { slot: usize },

    #[error("ability '{0}' is not registered")]
    UnknownAbility(AbilityId),

    #[error("not enough AP: required {required}, available {available}")]
    InsufficientAp { required: i64, available: i64 },
}

impl ActionRejection {
    /// Returns true if the same actor may fix its choice and try again in the
    /// current window.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidTarget
                | Self::InvalidAbilitySlot { .. }
                | Self::UnknownAbility(_)
                | Self::InsufficientAp { .. }
        )
    }
}
