use battle_core::{AbilityId, BattleError};

/// Content lookup and validation failures.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ContentError {
    #[error("unknown enemy template '{0}'")]
    UnknownTemplate(String),

    #[error("duplicate enemy template '{0}'")]
    DuplicateTemplate(String),

    #[error("unknown enemy pool '{0}'")]
    UnknownPool(String),

    #[error("enemy pool '{0}' is empty")]
    EmptyPool(String),

    #[error("template '{template}' equips unknown ability '{ability}'")]
    UnknownAbility { template: String, ability: AbilityId },

    #[error("template '{template}' has an invalid strategy: {source}")]
    InvalidStrategy {
        template: String,
        #[source]
        source: BattleError,
    },
}
