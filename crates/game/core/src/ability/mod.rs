//! Ability system.
//!
//! Every ability implements [`AbilityEffect`], a fixed set of lifecycle hooks
//! invoked by the battle at well-defined points:
//!
//! ```text
//! cast      -> cost check, AP deducted, on_use
//! attach    -> on_start, instance registered on the target (duration > 0)
//! turn tick -> on_turn while the instance is alive
//! expiry    -> on_end, instance removed
//! ```
//!
//! Abilities are resolved by id through an [`AbilityRegistry`] built once and
//! shared with every battle.

mod context;
mod kinds;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use context::AbilityContext;
pub use kinds::{Drain, Haste, Heal, Poison, Shield, Strike, Stun};

use crate::battle::CombatantId;

/// Identifier of an ability in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AbilityId(String);

impl AbilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AbilityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side an ability may be aimed at, relative to the caster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbilityTarget {
    Enemy,
    Ally,
}

/// Lifecycle hooks of a concrete ability.
pub trait AbilityEffect: Send + Sync {
    /// Registry key.
    fn id(&self) -> &'static str;

    /// AP cost paid on cast.
    fn cost(&self) -> i64;

    /// Number of target turns the attached instance lives; 0 means instant.
    fn duration(&self) -> i32 {
        0
    }

    fn target(&self) -> AbilityTarget {
        AbilityTarget::Enemy
    }

    /// Whether an attached instance prevents the target from acting.
    fn stuns(&self) -> bool {
        false
    }

    fn on_use(&self, _ctx: &mut AbilityContext<'_>) {}

    fn on_start(&self, _ctx: &mut AbilityContext<'_>) {}

    fn on_turn(&self, _ctx: &mut AbilityContext<'_>) {}

    fn on_end(&self, _ctx: &mut AbilityContext<'_>) {}
}

/// An active, time-limited effect attached to a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityInstance {
    pub ability: AbilityId,
    pub caster: CombatantId,
    pub remaining: i32,
    pub stuns: bool,
}

/// Lookup table from ability id to its effect.
#[derive(Clone, Default)]
pub struct AbilityRegistry {
    effects: BTreeMap<&'static str, Arc<dyn AbilityEffect>>,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in ability catalogue.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Strike);
        registry.register(Poison);
        registry.register(Heal);
        registry.register(Stun);
        registry.register(Shield);
        registry.register(Haste);
        registry.register(Drain);
        registry
    }

    /// Adds or replaces an ability.
    pub fn register(&mut self, effect: impl AbilityEffect + 'static) {
        self.effects.insert(effect.id(), Arc::new(effect));
    }

    pub fn get(&self, id: &AbilityId) -> Option<&dyn AbilityEffect> {
        self.effects.get(id.as_str()).map(|effect| effect.as_ref())
    }

    pub fn contains(&self, id: &AbilityId) -> bool {
        self.effects.contains_key(id.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = AbilityId> + '_ {
        self.effects.keys().map(|id| AbilityId::new(*id))
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityRegistry")
            .field("abilities", &self.effects.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_resolves_every_catalogue_entry() {
        let registry = AbilityRegistry::standard();
        for id in ["strike", "poison", "heal", "stun", "shield", "haste", "drain"] {
            let effect = registry.get(&AbilityId::from(id));
            assert!(effect.is_some(), "missing {id}");
            assert_eq!(effect.map(|e| e.id()), Some(id));
        }
        assert_eq!(registry.len(), 7);
        assert!(!registry.contains(&AbilityId::from("fireball")));
    }

    #[test]
    fn stun_is_the_only_stunning_ability() {
        let registry = AbilityRegistry::standard();
        let stunning: Vec<AbilityId> = registry
            .ids()
            .filter(|id| registry.get(id).is_some_and(|e| e.stuns()))
            .collect();
        assert_eq!(stunning, vec![AbilityId::from("stun")]);
    }
}
