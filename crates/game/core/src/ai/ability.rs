use crate::ability::{AbilityId, AbilityRegistry, AbilityTarget};
use crate::battle::{BattleActionData, BattleEntity};
use crate::error::BattleError;

use super::{BotAi, BotChoice};

/// Casts a configured ability while HP is inside `[hp_low, hp_high]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityRule {
    pub hp_low: f64,
    pub hp_high: f64,
    pub ability: AbilityId,
    pub max_uses: u32,
}

impl AbilityRule {
    pub fn new(hp_low: f64, hp_high: f64, ability: impl Into<AbilityId>, max_uses: u32) -> Self {
        Self {
            hp_low,
            hp_high,
            ability: ability.into(),
            max_uses,
        }
    }

    fn validate(&self) -> Result<(), BattleError> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.hp_low) || !in_range(self.hp_high) || self.hp_low > self.hp_high {
            return Err(BattleError::InvalidAbilityRule {
                ability: self.ability.clone(),
                low: self.hp_low,
                high: self.hp_high,
            });
        }
        Ok(())
    }

    fn matches(&self, hp_fraction: f64) -> bool {
        (self.hp_low..=self.hp_high).contains(&hp_fraction)
    }
}

#[derive(Clone, Debug)]
struct ResolvedRule {
    rule: AbilityRule,
    cost: i64,
    target: AbilityTarget,
    uses: u32,
}

/// Rule-driven strategy that falls back to [`DefaultAi`](super::DefaultAi) behavior.
#[derive(Clone, Debug)]
pub struct AbilityAi {
    rules: Vec<ResolvedRule>,
}

impl AbilityAi {
    /// Validates bands and resolves each ability's cost and targeting.
    pub fn new(rules: Vec<AbilityRule>, registry: &AbilityRegistry) -> Result<Self, BattleError> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                rule.validate()?;
                let effect = registry
                    .get(&rule.ability)
                    .ok_or_else(|| BattleError::UnknownAbility(rule.ability.clone()))?;
                Ok(ResolvedRule {
                    cost: effect.cost(),
                    target: effect.target(),
                    uses: 0,
                    rule,
                })
            })
            .collect::<Result<_, BattleError>>()?;
        Ok(Self { rules })
    }

    /// Remaining uses of each rule, in rule order.
    pub fn remaining_uses(&self) -> Vec<u32> {
        self.rules
            .iter()
            .map(|r| r.rule.max_uses.saturating_sub(r.uses))
            .collect()
    }
}

impl BotAi for AbilityAi {
    fn decide(&mut self, me: &BattleEntity, data: &mut BattleActionData) -> BotChoice {
        let fallback = data.least_focused();
        let hp_fraction = me.hp_fraction();
        let ap = me.ap();

        let chosen = self.rules.iter_mut().find(|r| {
            r.uses < r.rule.max_uses && r.rule.matches(hp_fraction) && ap >= r.cost
        });

        match chosen {
            Some(rule) => {
                rule.uses += 1;
                data.forced_ability = Some(rule.rule.ability.clone());
                let target = match rule.target {
                    AbilityTarget::Ally => Some(data.me),
                    AbilityTarget::Enemy => fallback,
                };
                BotChoice::attack(target)
            }
            None => BotChoice::attack(fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::{CombatantId, Side};
    use crate::entity::Entity;
    use crate::stats::Stat;

    const ME: CombatantId = CombatantId::new(Side::B, 0);
    const FOE: CombatantId = CombatantId::new(Side::A, 0);

    fn shaman(hp: i64, ap: i64) -> BattleEntity {
        let mut entity = Entity::enemy("shaman", "Shaman", 5)
            .with_stat(Stat::Hp, 100)
            .with_stat(Stat::Ap, 10);
        entity.reset();
        let mut me = BattleEntity::new(entity);
        me.take_damage(100 - hp);
        me.spend_ap(10 - ap);
        me
    }

    fn data() -> BattleActionData {
        BattleActionData {
            me: ME,
            round_multiplier: 1,
            target_counts: vec![(FOE, 0)],
            forced_ability: None,
        }
    }

    fn ai() -> AbilityAi {
        AbilityAi::new(
            vec![
                AbilityRule::new(0.0, 0.5, "heal", 1),
                AbilityRule::new(0.0, 1.0, "poison", 2),
            ],
            &AbilityRegistry::standard(),
        )
        .unwrap()
    }

    #[test]
    fn rule_in_band_forces_ability_and_consumes_use() {
        let mut ai = ai();
        let mut data = data();

        let choice = ai.decide(&shaman(40, 10), &mut data);

        assert_eq!(data.forced_ability, Some(AbilityId::from("heal")));
        assert_eq!(choice.target, Some(ME));
        assert_eq!(ai.remaining_uses(), vec![0, 2]);
    }

    #[test]
    fn band_edges_are_inclusive() {
        let mut ai = ai();
        let mut data = data();
        ai.decide(&shaman(50, 10), &mut data);
        assert_eq!(data.forced_ability, Some(AbilityId::from("heal")));
    }

    #[test]
    fn exhausted_rule_falls_through_to_next() {
        let mut ai = ai();
        let me = shaman(40, 10);

        ai.decide(&me, &mut data());
        let mut second = data();
        let choice = ai.decide(&me, &mut second);

        assert_eq!(second.forced_ability, Some(AbilityId::from("poison")));
        assert_eq!(choice.target, Some(FOE));
    }

    #[test]
    fn short_ap_falls_back_to_attack() {
        let mut ai = ai();
        let mut data = data();

        let choice = ai.decide(&shaman(40, 2), &mut data);

        assert!(data.forced_ability.is_none());
        assert_eq!(choice, BotChoice::attack(Some(FOE)));
        assert_eq!(ai.remaining_uses(), vec![1, 2]);
    }

    #[test]
    fn inverted_band_is_rejected() {
        let err = AbilityAi::new(
            vec![AbilityRule::new(0.8, 0.2, "heal", 1)],
            &AbilityRegistry::standard(),
        )
        .unwrap_err();
        assert!(matches!(err, BattleError::InvalidAbilityRule { .. }));
    }
}
