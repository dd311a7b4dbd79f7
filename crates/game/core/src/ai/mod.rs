//! Decision strategies for bot-controlled combatants.
//!
//! A strategy sees its own [`BattleEntity`] and a [`BattleActionData`]
//! describing the candidates, and returns a [`BotChoice`]. Strategies may
//! set `forced_ability` on the data to have the engine cast that ability
//! instead of the returned action.

mod ability;

use std::fmt;

pub use ability::{AbilityAi, AbilityRule};

use crate::ability::AbilityRegistry;
use crate::battle::{Action, BattleActionData, BattleEntity, CombatantId};
use crate::error::BattleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BotChoice {
    pub action: Action,
    pub target: Option<CombatantId>,
}

impl BotChoice {
    pub fn attack(target: Option<CombatantId>) -> Self {
        Self {
            action: Action::Attack,
            target,
        }
    }
}

pub trait BotAi: Send + fmt::Debug {
    fn decide(&mut self, me: &BattleEntity, data: &mut BattleActionData) -> BotChoice;
}

/// Attacks the least focused candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefaultAi;

impl BotAi for DefaultAi {
    fn decide(&mut self, _me: &BattleEntity, data: &mut BattleActionData) -> BotChoice {
        BotChoice::attack(data.least_focused())
    }
}

/// Serializable strategy description, as found in enemy templates.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AiSpec {
    #[default]
    Default,
    Ability { rules: Vec<AbilityRule> },
}

impl AiSpec {
    /// Builds the strategy, resolving ability costs from `registry`.
    pub fn build(&self, registry: &AbilityRegistry) -> Result<Box<dyn BotAi>, BattleError> {
        match self {
            AiSpec::Default => Ok(Box::new(DefaultAi)),
            AiSpec::Ability { rules } => Ok(Box::new(AbilityAi::new(rules.clone(), registry)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::Side;
    use crate::entity::Entity;

    #[test]
    fn default_ai_attacks_least_focused() {
        let me = BattleEntity::new(Entity::enemy("rat", "Rat", 1));
        let first = CombatantId::new(Side::A, 0);
        let second = CombatantId::new(Side::A, 1);
        let mut data = BattleActionData {
            me: CombatantId::new(Side::B, 0),
            round_multiplier: 1,
            target_counts: vec![(first, 2), (second, 1)],
            forced_ability: None,
        };

        let choice = DefaultAi.decide(&me, &mut data);

        assert_eq!(choice, BotChoice::attack(Some(second)));
        assert!(data.forced_ability.is_none());
    }

    #[test]
    fn ability_strategy_rejects_unknown_ability() {
        let spec = AiSpec::Ability {
            rules: vec![AbilityRule::new(0.0, 0.5, "meteor", 1)],
        };
        let err = spec.build(&AbilityRegistry::standard()).unwrap_err();
        assert_eq!(err, BattleError::UnknownAbility("meteor".into()));
    }
}
