//! Long-lived combatant data.
//!
//! An [`Entity`] is either a user's character (created once, persisted by the
//! row store between adventures) or an enemy instantiated from a template for
//! a single battle. Only the persistent stats (HP, AP) carry a live value; all
//! other stats are derived on demand.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;
use strum::IntoEnumIterator;

use crate::ability::AbilityId;
use crate::config::BattleConfig;
use crate::error::BattleError;
use crate::stats::{ModifierOp, Stat, StatModifier, apply_modifiers};

/// Identity of a user of the chat platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    User(UserId),
    Enemy {
        template: String,
        /// Money split among the winning users when this enemy is defeated.
        money_value: i64,
    },
}

pub type AbilitySlots = ArrayVec<AbilityId, { BattleConfig::MAX_ABILITY_SLOTS }>;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    name: String,
    kind: EntityKind,
    stats: BTreeMap<Stat, i64>,
    equipment: BTreeMap<Stat, i64>,
    abilities: AbilitySlots,
    modifiers: Vec<StatModifier>,
    persistent: BTreeMap<Stat, i64>,
    initialized: bool,
}

impl Entity {
    /// Starting stats of a freshly created user character.
    pub const USER_BASE_STATS: [(Stat, i64); 4] =
        [(Stat::Hp, 50), (Stat::Ap, 5), (Stat::Str, 5), (Stat::Def, 5)];

    pub fn user(id: UserId, name: impl Into<String>) -> Self {
        let mut entity = Self::new(name, EntityKind::User(id));
        entity.stats.extend(Self::USER_BASE_STATS);
        entity
    }

    pub fn enemy(template: impl Into<String>, name: impl Into<String>, money_value: i64) -> Self {
        Self::new(
            name,
            EntityKind::Enemy {
                template: template.into(),
                money_value,
            },
        )
    }

    fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            stats: BTreeMap::new(),
            equipment: BTreeMap::new(),
            abilities: ArrayVec::new(),
            modifiers: Vec::new(),
            persistent: BTreeMap::new(),
            initialized: false,
        }
    }

    /// Sets a base stat (builder pattern).
    pub fn with_stat(mut self, stat: Stat, value: i64) -> Self {
        self.set_stat(stat, value);
        self
    }

    /// Equips an ability in the next free slot (builder pattern).
    ///
    /// Abilities beyond the slot capacity are ignored.
    pub fn with_ability(mut self, ability: impl Into<AbilityId>) -> Self {
        self.learn_ability(ability.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self.kind {
            EntityKind::User(id) => Some(id),
            EntityKind::Enemy { .. } => None,
        }
    }

    pub fn money_value(&self) -> i64 {
        match self.kind {
            EntityKind::User(_) => 0,
            EntityKind::Enemy { money_value, .. } => money_value,
        }
    }

    /// Base dictionary value plus equipment contributions; 0 when absent.
    pub fn get_stat(&self, stat: Stat) -> i64 {
        self.stats.get(&stat).copied().unwrap_or(0) + self.equipment.get(&stat).copied().unwrap_or(0)
    }

    pub fn set_stat(&mut self, stat: Stat, value: i64) {
        self.stats.insert(stat, value);
    }

    /// Adds an item bonus, capped by the stat's per-item limit.
    ///
    /// Returns the bonus actually applied.
    pub fn equip_bonus(&mut self, stat: Stat, value: i64) -> i64 {
        let limit = stat.item_limit();
        let applied = value.clamp(-limit, limit);
        *self.equipment.entry(stat).or_insert(0) += applied;
        applied
    }

    pub fn abilities(&self) -> &[AbilityId] {
        &self.abilities
    }

    pub fn ability(&self, slot: usize) -> Option<&AbilityId> {
        self.abilities.get(slot)
    }

    /// Returns false when every slot is taken.
    pub fn learn_ability(&mut self, ability: AbilityId) -> bool {
        self.abilities.try_push(ability).is_ok()
    }

    /// Live (non-persistent) modifiers in insertion order.
    pub fn modifiers(&self) -> &[StatModifier] {
        &self.modifiers
    }

    /// Modifiers that shape stats outside the per-battle snapshot: turn
    /// modifiers and adventure-long modifiers.
    pub fn active_modifiers(&self) -> impl Iterator<Item = &StatModifier> {
        self.modifiers.iter().filter(|m| !m.per_battle)
    }

    /// Modifiers captured by a battle at entry.
    pub fn battle_modifiers(&self) -> impl Iterator<Item = &StatModifier> {
        self.modifiers.iter().filter(|m| m.per_battle)
    }

    /// Stat value after the entity's own active modifiers.
    pub fn modified_stat(&self, stat: Stat) -> i64 {
        apply_modifiers(stat, self.get_stat(stat), self.active_modifiers())
    }

    /// Adds a modifier.
    ///
    /// Persistent modifiers are applied to the live value at once (clamped to
    /// `[0, max]`) and discarded; the rest join the live list.
    pub fn add_modifier(&mut self, modifier: StatModifier) -> Result<(), BattleError> {
        modifier.validate()?;
        if modifier.persistent {
            let current = self.get_persistent_value(modifier.stat) as f64;
            let target = modifier.apply(current).round() as i64;
            self.change_persistent_value(modifier.stat, target - current as i64);
        } else {
            self.modifiers.push(modifier);
        }
        Ok(())
    }

    /// Steps the turn clock: decrements turn-scoped modifiers, dropping expired ones.
    pub fn step_turn_modifiers(&mut self) {
        self.modifiers
            .retain_mut(|m| m.per_battle || m.persistent || m.tick());
    }

    /// Steps the battle clock: decrements per-battle modifiers, dropping expired ones.
    pub fn step_battle_modifiers(&mut self) {
        self.modifiers.retain_mut(|m| !m.per_battle || m.tick());
    }

    /// Drops turn-scoped modifiers once a battle is over. Per-battle and
    /// adventure-long modifiers stay.
    pub fn clear_turn_modifiers(&mut self) {
        self.modifiers
            .retain(|m| m.per_battle || m.is_adventure_long());
    }

    pub fn get_persistent_value(&self, stat: Stat) -> i64 {
        self.persistent.get(&stat).copied().unwrap_or(0)
    }

    /// Changes a live value by `delta`, clamped to `[0, max]`. Returns the new value.
    pub fn change_persistent_value(&mut self, stat: Stat, delta: i64) -> i64 {
        let max = self.modified_stat(stat);
        let value = (self.get_persistent_value(stat) + delta).clamp(0, max.max(0));
        self.persistent.insert(stat, value);
        value
    }

    /// Stores a live value already clamped by the caller; only the lower bound is enforced.
    pub(crate) fn store_persistent_value(&mut self, stat: Stat, value: i64) {
        self.persistent.insert(stat, value.max(0));
    }

    /// Pulls live values back under their current maxima after modifiers expire.
    pub fn clamp_persistent_values(&mut self) {
        for stat in Stat::iter().filter(|s| s.is_persistent()) {
            let max = self.modified_stat(stat).max(0);
            let value = self.get_persistent_value(stat).clamp(0, max);
            self.persistent.insert(stat, value);
        }
    }

    /// Clears live modifiers and refills persistent stats to their maxima.
    pub fn reset(&mut self) {
        self.modifiers.clear();
        for stat in Stat::iter().filter(|s| s.is_persistent()) {
            let max = self.modified_stat(stat);
            self.persistent.insert(stat, max);
        }
        self.initialized = true;
    }

    /// False until the first [`Entity::reset`].
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Rough strength rating: raw stats weighted by their kind.
    pub fn power_level(&self) -> f64 {
        Stat::iter()
            .map(|stat| self.modified_stat(stat) as f64 * stat.kind().power_weight())
            .sum()
    }

    /// Pushes a turn-scoped modifier. Turn modifiers are never persistent, so
    /// there is nothing to validate.
    pub(crate) fn push_turn_modifier(
        &mut self,
        stat: Stat,
        value: f64,
        op: ModifierOp,
        turns: i32,
    ) {
        self.modifiers
            .push(StatModifier::turns(stat, value, op, turns));
    }
}
