//! Battle-scoped wrapper around an [`Entity`].

use std::fmt;

use crate::ability::AbilityInstance;
use crate::ai::BotAi;
use crate::entity::{Entity, UserId};
use crate::stats::{ModifierOp, Stat, StatModifier, apply_modifiers};

use super::CombatantId;

/// A combatant inside one battle.
///
/// Effective stats are the entity's raw stat, then the per-battle modifiers
/// captured when the wrapper was created, then the entity's live turn and
/// adventure modifiers, each list in insertion order.
pub struct BattleEntity {
    entity: Entity,
    battle_modifiers: Vec<StatModifier>,
    instances: Vec<AbilityInstance>,
    last_target: Option<CombatantId>,
    ai: Option<Box<dyn BotAi>>,
}

impl BattleEntity {
    pub fn new(entity: Entity) -> Self {
        let battle_modifiers = entity
            .battle_modifiers()
            .map(|m| StatModifier {
                duration: StatModifier::ADVENTURE,
                ..m.clone()
            })
            .collect();

        Self {
            entity,
            battle_modifiers,
            instances: Vec::new(),
            last_target: None,
            ai: None,
        }
    }

    /// Attaches a decision strategy. Ignored for user-controlled entities.
    pub fn with_ai(mut self, ai: Box<dyn BotAi>) -> Self {
        if !self.is_user() {
            self.ai = Some(ai);
        }
        self
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    pub fn into_entity(self) -> Entity {
        self.entity
    }

    pub fn name(&self) -> &str {
        self.entity.name()
    }

    pub fn user(&self) -> Option<UserId> {
        self.entity.user_id()
    }

    pub fn is_user(&self) -> bool {
        self.user().is_some()
    }

    pub fn is_controlled_by(&self, user: UserId) -> bool {
        self.user() == Some(user)
    }

    /// Raw stat after every modifier, before the stat transform.
    pub fn raw_stat(&self, stat: Stat) -> i64 {
        let modifiers = self
            .battle_modifiers
            .iter()
            .chain(self.entity.active_modifiers());
        apply_modifiers(stat, self.entity.get_stat(stat), modifiers)
    }

    /// Effective stat used by combat math.
    pub fn get_stat(&self, stat: Stat) -> f64 {
        stat.get_value(self.raw_stat(stat))
    }

    pub fn hp(&self) -> i64 {
        self.entity.get_persistent_value(Stat::Hp)
    }

    pub fn max_hp(&self) -> i64 {
        self.raw_stat(Stat::Hp)
    }

    pub fn missing_hp(&self) -> i64 {
        (self.max_hp() - self.hp()).max(0)
    }

    /// Current HP as a fraction of max HP; 0 when max HP is 0.
    pub fn hp_fraction(&self) -> f64 {
        let max = self.max_hp();
        if max == 0 {
            return 0.0;
        }
        self.hp() as f64 / max as f64
    }

    pub fn ap(&self) -> i64 {
        self.entity.get_persistent_value(Stat::Ap)
    }

    pub fn max_ap(&self) -> i64 {
        self.raw_stat(Stat::Ap)
    }

    pub fn is_dead(&self) -> bool {
        self.hp() == 0
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    /// Changes a live stat by `delta`, clamped to `[0, max]`.
    ///
    /// Returns the change actually applied.
    pub fn change_persistent(&mut self, stat: Stat, delta: i64) -> i64 {
        let max = self.raw_stat(stat).max(0);
        let before = self.entity.get_persistent_value(stat);
        let after = (before + delta).clamp(0, max);
        self.entity.store_persistent_value(stat, after);
        after - before
    }

    /// Removes up to `amount` HP. Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: i64) -> i64 {
        -self.change_persistent(Stat::Hp, -amount.max(0))
    }

    /// Restores up to `amount` HP. Returns the amount actually healed.
    pub fn heal(&mut self, amount: i64) -> i64 {
        self.change_persistent(Stat::Hp, amount.max(0))
    }

    pub fn spend_ap(&mut self, amount: i64) -> i64 {
        -self.change_persistent(Stat::Ap, -amount.max(0))
    }

    /// Regenerates AP, only for entities with an AP pool.
    pub fn regen_ap(&mut self, amount: i64) -> i64 {
        if self.max_ap() <= 0 {
            return 0;
        }
        self.change_persistent(Stat::Ap, amount)
    }

    /// Adds a modifier during battle.
    ///
    /// Persistent modifiers clamp against the battle maximum rather than the
    /// entity's own.
    pub fn add_modifier(&mut self, modifier: StatModifier) -> Result<(), crate::BattleError> {
        modifier.validate()?;
        if modifier.persistent {
            let current = self.entity.get_persistent_value(modifier.stat);
            let target = modifier.apply(current as f64).round() as i64;
            self.change_persistent(modifier.stat, target - current);
            Ok(())
        } else {
            self.entity.add_modifier(modifier)
        }
    }

    /// Adds a modifier that decays with the combatant's own turns.
    pub fn add_turn_modifier(&mut self, stat: Stat, value: f64, op: ModifierOp, turns: i32) {
        self.entity.push_turn_modifier(stat, value, op, turns);
    }

    /// Steps the turn clock; an expired bonus to a pool stat takes its excess with it.
    pub fn step_turn_modifiers(&mut self) {
        self.entity.step_turn_modifiers();
        self.clamp_persistent();
    }

    /// Clamps HP and AP to `[0, max]` against the battle maxima.
    pub(crate) fn clamp_persistent(&mut self) {
        for stat in [Stat::Hp, Stat::Ap] {
            let max = self.raw_stat(stat).max(0);
            let value = self.entity.get_persistent_value(stat).clamp(0, max);
            self.entity.store_persistent_value(stat, value);
        }
    }

    pub fn instances(&self) -> &[AbilityInstance] {
        &self.instances
    }

    pub(crate) fn attach(&mut self, instance: AbilityInstance) {
        self.instances.push(instance);
    }

    pub(crate) fn take_instances(&mut self) -> Vec<AbilityInstance> {
        std::mem::take(&mut self.instances)
    }

    /// Restores instances taken for ticking, keeping any attached meanwhile.
    pub(crate) fn restore_instances(&mut self, mut kept: Vec<AbilityInstance>) {
        kept.append(&mut self.instances);
        self.instances = kept;
    }

    pub(crate) fn clear_instances(&mut self) {
        self.instances.clear();
    }

    pub fn is_stunned(&self) -> bool {
        self.instances.iter().any(|instance| instance.stuns)
    }

    pub fn last_target(&self) -> Option<CombatantId> {
        self.last_target
    }

    pub(crate) fn set_last_target(&mut self, target: Option<CombatantId>) {
        self.last_target = target;
    }

    pub(crate) fn take_ai(&mut self) -> Option<Box<dyn BotAi>> {
        self.ai.take()
    }

    pub(crate) fn restore_ai(&mut self, ai: Box<dyn BotAi>) {
        self.ai = Some(ai);
    }
}

impl From<Entity> for BattleEntity {
    fn from(entity: Entity) -> Self {
        Self::new(entity)
    }
}

impl fmt::Debug for BattleEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleEntity")
            .field("name", &self.name())
            .field("hp", &self.hp())
            .field("max_hp", &self.max_hp())
            .field("ap", &self.ap())
            .field("instances", &self.instances)
            .field("last_target", &self.last_target)
            .field("ai", &self.ai)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> Entity {
        let mut entity = Entity::enemy("knight", "Knight", 0)
            .with_stat(Stat::Hp, 30)
            .with_stat(Stat::Ap, 3)
            .with_stat(Stat::Str, 4)
            .with_stat(Stat::Def, 10)
            .with_stat(Stat::Crit, 30);
        entity.reset();
        entity
    }

    #[test]
    fn effective_stat_applies_transform_last() {
        let fighter = BattleEntity::new(knight());
        assert_eq!(fighter.get_stat(Stat::Def), 10.0);
        assert!((fighter.get_stat(Stat::Crit) - 0.5).abs() < 1e-12);
        assert_eq!(fighter.get_stat(Stat::Eva), 0.0);
    }

    #[test]
    fn battle_snapshot_is_applied_before_live_modifiers() {
        let mut entity = knight();
        entity
            .add_modifier(StatModifier::battles(Stat::Str, 2.0, ModifierOp::Mult, 1))
            .unwrap();
        let mut fighter = BattleEntity::new(entity);

        // Stepping the entity's battle clock does not touch the snapshot.
        fighter.entity_mut().step_battle_modifiers();
        assert!(fighter.entity().modifiers().is_empty());

        fighter.add_turn_modifier(Stat::Str, 1.0, ModifierOp::Add, 2);
        assert_eq!(fighter.raw_stat(Stat::Str), 9);
    }

    #[test]
    fn hp_stays_within_bounds_for_any_sequence() {
        let mut fighter = BattleEntity::new(knight());
        let deltas = [-7, 100, -3, -500, 12, 1, -1, 40, -29, -2, 0, 5];

        for delta in deltas {
            if delta < 0 {
                fighter.take_damage(-delta);
            } else {
                fighter.heal(delta);
            }
            assert!(fighter.hp() >= 0);
            assert!(fighter.hp() <= fighter.max_hp());
        }
    }

    #[test]
    fn damage_and_heal_report_applied_amounts() {
        let mut fighter = BattleEntity::new(knight());
        assert_eq!(fighter.heal(10), 0);
        assert_eq!(fighter.take_damage(12), 12);
        assert_eq!(fighter.heal(100), 12);
        assert_eq!(fighter.take_damage(100), 30);
        assert!(fighter.is_dead());
        assert_eq!(fighter.hp_fraction(), 0.0);
    }

    #[test]
    fn persistent_modifier_clamps_against_battle_max() {
        let mut entity = knight();
        entity
            .add_modifier(StatModifier::battles(Stat::Hp, 10.0, ModifierOp::Add, 1))
            .unwrap();
        let mut fighter = BattleEntity::new(entity);
        assert_eq!(fighter.max_hp(), 40);

        fighter
            .add_modifier(StatModifier::persistent(Stat::Hp, 25.0).unwrap())
            .unwrap();
        assert_eq!(fighter.hp(), 40);
    }

    #[test]
    fn expiring_turn_bonus_takes_its_excess_hp() {
        let mut fighter = BattleEntity::new(knight());
        fighter.add_turn_modifier(Stat::Hp, 10.0, ModifierOp::Add, 2);
        fighter.add_turn_modifier(Stat::Ap, 2.0, ModifierOp::Add, 2);
        fighter.heal(10);
        fighter.regen_ap(2);
        assert_eq!((fighter.hp(), fighter.ap()), (40, 5));

        fighter.step_turn_modifiers();
        assert_eq!(fighter.max_hp(), 40);
        assert_eq!((fighter.hp(), fighter.ap()), (40, 5));

        fighter.step_turn_modifiers();
        assert_eq!(fighter.max_hp(), 30);
        assert_eq!((fighter.hp(), fighter.ap()), (30, 3));
    }

    #[test]
    fn ap_regen_requires_a_pool() {
        let mut fighter = BattleEntity::new(knight());
        fighter.spend_ap(3);
        assert_eq!(fighter.regen_ap(1), 1);

        let mut brute = BattleEntity::new(Entity::enemy("brute", "Brute", 0).with_stat(Stat::Hp, 5));
        brute.entity_mut().reset();
        assert_eq!(brute.regen_ap(1), 0);
        assert_eq!(brute.ap(), 0);
    }
}
