//! Logical battle log entries.
//!
//! The engine only selects which message applies; rendering goes through a
//! localization key plus named parameters.

use crate::ability::AbilityId;
use crate::stats::Stat;

use super::Side;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattleMessage {
    BattleStarted { first: Side },
    TurnStarted { side: Side, round: u32 },
    BonusTurn { side: Side },
    MultiplierIncreased { multiplier: i64 },
    Attacked { attacker: String, target: String, damage: i64, crit: bool },
    Evaded { attacker: String, target: String },
    Countered { attacker: String, target: String, damage: i64, crit: bool },
    CounterEvaded { attacker: String, target: String },
    Vamped { attacker: String, amount: i64 },
    Waited { name: String },
    AbilityUsed { caster: String, target: String, ability: AbilityId },
    AbilityDamage { target: String, ability: AbilityId, damage: i64 },
    AbilityHealed { target: String, ability: AbilityId, amount: i64 },
    AbilityBuff { target: String, ability: AbilityId, stat: Stat },
    AbilityEnded { target: String, ability: AbilityId },
    Stunned { name: String },
    Died { name: String },
    Victory { reward_each: i64 },
    Defeat,
}

impl BattleMessage {
    /// Localization key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::BattleStarted { .. } => "battle.start",
            Self::TurnStarted { .. } => "battle.turn",
            Self::BonusTurn { .. } => "battle.bonus_turn",
            Self::MultiplierIncreased { .. } => "battle.multiplier",
            Self::Attacked { crit: false, .. } => "battle.attack",
            Self::Attacked { crit: true, .. } => "battle.attack_crit",
            Self::Evaded { .. } => "battle.evade",
            Self::Countered { crit: false, .. } => "battle.counter",
            Self::Countered { crit: true, .. } => "battle.counter_crit",
            Self::CounterEvaded { .. } => "battle.counter_evade",
            Self::Vamped { .. } => "battle.vamp",
            Self::Waited { .. } => "battle.wait",
            Self::AbilityUsed { .. } => "ability.use",
            Self::AbilityDamage { .. } => "ability.damage",
            Self::AbilityHealed { .. } => "ability.heal",
            Self::AbilityBuff { .. } => "ability.buff",
            Self::AbilityEnded { .. } => "ability.end",
            Self::Stunned { .. } => "battle.stunned",
            Self::Died { .. } => "battle.died",
            Self::Victory { .. } => "battle.victory",
            Self::Defeat => "battle.defeat",
        }
    }

    /// Named parameters for the localized template.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::BattleStarted { first } => vec![("side", first.to_string())],
            Self::TurnStarted { side, round } => {
                vec![("side", side.to_string()), ("round", round.to_string())]
            }
            Self::BonusTurn { side } => vec![("side", side.to_string())],
            Self::MultiplierIncreased { multiplier } => {
                vec![("multiplier", multiplier.to_string())]
            }
            Self::Attacked { attacker, target, damage, .. }
            | Self::Countered { attacker, target, damage, .. } => vec![
                ("attacker", attacker.clone()),
                ("target", target.clone()),
                ("damage", damage.to_string()),
            ],
            Self::Evaded { attacker, target } | Self::CounterEvaded { attacker, target } => {
                vec![("attacker", attacker.clone()), ("target", target.clone())]
            }
            Self::Vamped { attacker, amount } => {
                vec![("attacker", attacker.clone()), ("amount", amount.to_string())]
            }
            Self::Waited { name } | Self::Stunned { name } | Self::Died { name } => {
                vec![("name", name.clone())]
            }
            Self::AbilityUsed { caster, target, ability } => vec![
                ("caster", caster.clone()),
                ("target", target.clone()),
                ("ability", ability.to_string()),
            ],
            Self::AbilityDamage { target, ability, damage } => vec![
                ("target", target.clone()),
                ("ability", ability.to_string()),
                ("damage", damage.to_string()),
            ],
            Self::AbilityHealed { target, ability, amount } => vec![
                ("target", target.clone()),
                ("ability", ability.to_string()),
                ("amount", amount.to_string()),
            ],
            Self::AbilityBuff { target, ability, stat } => vec![
                ("target", target.clone()),
                ("ability", ability.to_string()),
                ("stat", stat.to_string()),
            ],
            Self::AbilityEnded { target, ability } => {
                vec![("target", target.clone()), ("ability", ability.to_string())]
            }
            Self::Victory { reward_each } => vec![("reward", reward_each.to_string())],
            Self::Defeat => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crit_selects_a_different_key() {
        let plain = BattleMessage::Attacked {
            attacker: "Rin".into(),
            target: "Slime".into(),
            damage: 4,
            crit: false,
        };
        let crit = BattleMessage::Attacked {
            attacker: "Rin".into(),
            target: "Slime".into(),
            damage: 8,
            crit: true,
        };

        assert_eq!(plain.key(), "battle.attack");
        assert_eq!(crit.key(), "battle.attack_crit");
        assert_eq!(
            crit.params(),
            vec![
                ("attacker", "Rin".to_string()),
                ("target", "Slime".to_string()),
                ("damage", "8".to_string()),
            ]
        );
    }
}
