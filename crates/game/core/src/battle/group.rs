use crate::ai::BotAi;
use crate::config::BattleConfig;
use crate::entity::{Entity, UserId};
use crate::stats::Stat;

use super::{BattleEntity, Side};

/// Group speed used when a side has no members.
const EMPTY_GROUP_SPEED: f64 = 1.0;

/// One side of a battle.
///
/// Entities may be queued raw and bound into [`BattleEntity`] wrappers on
/// [`BattleGroup::load`].
#[derive(Debug)]
pub struct BattleGroup {
    side: Side,
    members: Vec<BattleEntity>,
    pending: Vec<(Entity, Option<Box<dyn BotAi>>)>,
}

impl BattleGroup {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            members: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Queues an entity to be bound on load.
    pub fn add_entity(&mut self, entity: Entity) -> &mut Self {
        self.pending.push((entity, None));
        self
    }

    /// Queues a bot entity with an explicit strategy.
    pub fn add_bot(&mut self, entity: Entity, ai: Box<dyn BotAi>) -> &mut Self {
        self.pending.push((entity, Some(ai)));
        self
    }

    /// Adds an already bound member.
    pub fn add_member(&mut self, member: BattleEntity) -> &mut Self {
        self.members.push(member);
        self
    }

    /// Bound members plus queued entities.
    pub fn len(&self) -> usize {
        self.members.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn members(&self) -> &[BattleEntity] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [BattleEntity] {
        &mut self.members
    }

    pub fn get(&self, index: usize) -> Option<&BattleEntity> {
        self.members.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut BattleEntity> {
        self.members.get_mut(index)
    }

    /// Binds queued entities, ticks the battle clock once and pulls HP into
    /// `[entry floor, max]` and AP into `[0, max]`.
    ///
    /// Entities that never fought are reset first; veterans keep their HP,
    /// AP and modifiers from earlier chapters.
    pub fn load(&mut self, config: &BattleConfig) {
        for (mut entity, ai) in self.pending.drain(..) {
            if !entity.is_initialized() {
                entity.reset();
            }
            let mut member = BattleEntity::new(entity);
            if let Some(ai) = ai {
                member = member.with_ai(ai);
            }
            self.members.push(member);
        }

        for member in &mut self.members {
            member.entity_mut().step_battle_modifiers();
            member.clamp_persistent();

            let floor = (member.max_hp() * config.entry_hp_floor_percent + 99) / 100;
            if member.hp() < floor {
                member.heal(floor - member.hp());
            }
        }
    }

    /// Mean effective SPD of all members; 1 for an empty group.
    pub fn get_speed(&self) -> f64 {
        if self.members.is_empty() {
            return EMPTY_GROUP_SPEED;
        }
        let total: f64 = self.members.iter().map(|m| m.get_stat(Stat::Spd)).sum();
        total / self.members.len() as f64
    }

    pub fn get_alive_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_alive()).count()
    }

    pub fn get_alive_user_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.is_alive() && m.is_user())
            .count()
    }

    pub fn alive_count(&self) -> usize {
        self.get_alive_count()
    }

    pub fn has_users(&self) -> bool {
        self.members.iter().any(BattleEntity::is_user)
    }

    /// Every user that fought on this side, dead or alive.
    pub fn users(&self) -> Vec<UserId> {
        self.members.iter().filter_map(BattleEntity::user).collect()
    }

    /// Money value of defeated bots.
    pub fn defeated_bot_money(&self) -> i64 {
        self.members
            .iter()
            .filter(|m| m.is_dead() && !m.is_user())
            .map(|m| m.entity().money_value())
            .sum()
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.members
            .into_iter()
            .map(BattleEntity::into_entity)
            .chain(self.pending.into_iter().map(|(entity, _)| entity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ModifierOp, StatModifier};

    fn fighter(name: &str, hp: i64, spd: i64) -> Entity {
        Entity::enemy(name, name, 10)
            .with_stat(Stat::Hp, hp)
            .with_stat(Stat::Spd, spd)
    }

    #[test]
    fn empty_group_has_unit_speed() {
        let group = BattleGroup::new(Side::A);
        assert_eq!(group.get_speed(), 1.0);
        assert!(group.is_empty());
    }

    #[test]
    fn speed_is_mean_of_effective_spd() {
        let mut group = BattleGroup::new(Side::B);
        group
            .add_entity(fighter("fast", 10, 20))
            .add_entity(fighter("slow", 10, 0));
        group.load(&BattleConfig::default());

        assert!((group.get_speed() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn load_resets_new_entities_only() {
        let mut veteran = Entity::user(UserId(1), "Vet");
        veteran.reset();
        veteran.change_persistent_value(Stat::Hp, -20);

        let mut group = BattleGroup::new(Side::A);
        group
            .add_entity(veteran)
            .add_entity(fighter("fresh", 30, 0));
        group.load(&BattleConfig::default());

        assert_eq!(group.members()[0].hp(), 30);
        assert_eq!(group.members()[1].hp(), 30);
        assert_eq!(group.get_alive_user_count(), 1);
        assert_eq!(group.get_alive_count(), 2);
    }

    #[test]
    fn load_pulls_overfull_pools_back_to_max() {
        let mut veteran = Entity::user(UserId(3), "Vet");
        veteran.reset();
        let (max_hp, max_ap) = (
            veteran.get_persistent_value(Stat::Hp),
            veteran.get_persistent_value(Stat::Ap),
        );
        veteran.store_persistent_value(Stat::Hp, max_hp + 10);
        veteran.store_persistent_value(Stat::Ap, max_ap + 4);

        let mut group = BattleGroup::new(Side::A);
        group.add_entity(veteran);
        group.load(&BattleConfig::default());

        let member = &group.members()[0];
        assert_eq!(member.hp(), member.max_hp());
        assert_eq!(member.hp(), max_hp);
        assert_eq!(member.ap(), max_ap);
    }

    #[test]
    fn entry_hp_floor_lifts_critically_low_members() {
        let mut user = Entity::user(UserId(2), "Low");
        user.reset();
        user.change_persistent_value(Stat::Hp, -50);
        assert_eq!(user.get_persistent_value(Stat::Hp), 0);

        let mut group = BattleGroup::new(Side::A);
        group.add_entity(user);
        group.load(&BattleConfig::default());

        assert_eq!(group.members()[0].hp(), 5);
    }

    #[test]
    fn entry_floor_rounds_up() {
        let mut entity = fighter("odd", 15, 0);
        entity.reset();
        entity.change_persistent_value(Stat::Hp, -15);

        let mut group = BattleGroup::new(Side::B);
        group.add_entity(entity);
        group.load(&BattleConfig::default());

        assert_eq!(group.members()[0].hp(), 2);
    }

    #[test]
    fn load_ticks_battle_modifiers_once() {
        let mut user = Entity::user(UserId(3), "Blessed");
        user.reset();
        user.add_modifier(StatModifier::battles(Stat::Str, 5.0, ModifierOp::Add, 2))
            .unwrap();

        let mut group = BattleGroup::new(Side::A);
        group.add_entity(user);
        group.load(&BattleConfig::default());

        let member = &group.members()[0];
        assert_eq!(member.raw_stat(Stat::Str), 10);
        assert_eq!(member.entity().modifiers()[0].duration, 1);
    }

    #[test]
    fn defeated_money_counts_dead_bots_only() {
        let mut group = BattleGroup::new(Side::B);
        group
            .add_entity(fighter("a", 5, 0))
            .add_entity(fighter("b", 5, 0));
        group.load(&BattleConfig::default());
        group.members_mut()[0].take_damage(5);

        assert_eq!(group.defeated_bot_money(), 10);
        assert_eq!(group.alive_count(), 1);
    }
}
