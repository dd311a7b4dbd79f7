//! Process-wide content registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use battle_core::{
    AbilityId, AbilityRegistry, AiSpec, BattleConfig, BattleGroup, BotAi, Entity,
    RandomSource, Side, Stat,
};

use crate::error::ContentError;
use crate::messages::MessageCatalog;

/// Blueprint for instantiating an enemy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub money_value: i64,
    pub stats: Vec<(Stat, i64)>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<AbilityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ai: AiSpec,
}

impl EnemyTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, money_value: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            money_value,
            stats: Vec::new(),
            abilities: Vec::new(),
            ai: AiSpec::Default,
        }
    }

    pub fn with_stat(mut self, stat: Stat, value: i64) -> Self {
        self.stats.push((stat, value));
        self
    }

    pub fn with_ability(mut self, ability: impl Into<AbilityId>) -> Self {
        self.abilities.push(ability.into());
        self
    }

    pub fn with_ai(mut self, ai: AiSpec) -> Self {
        self.ai = ai;
        self
    }

    fn instantiate(&self) -> Entity {
        let mut entity = Entity::enemy(&self.id, &self.name, self.money_value);
        for &(stat, value) in &self.stats {
            entity.set_stat(stat, value);
        }
        for ability in &self.abilities {
            entity.learn_ability(ability.clone());
        }
        entity
    }
}

/// A fresh enemy with its strategy.
#[derive(Debug)]
pub struct SpawnedEnemy {
    pub entity: Entity,
    pub ai: Box<dyn BotAi>,
}

/// Enemy templates, enemy pools, abilities, messages and battle config.
///
/// Built once at startup; templates are validated against the ability
/// registry on insertion so a spawn never fails on bad content.
#[derive(Debug, Default)]
pub struct GameContentRegistry {
    abilities: Arc<AbilityRegistry>,
    config: BattleConfig,
    messages: MessageCatalog,
    templates: BTreeMap<String, EnemyTemplate>,
    pools: BTreeMap<String, Vec<String>>,
}

impl GameContentRegistry {
    pub fn new(abilities: AbilityRegistry, config: BattleConfig) -> Self {
        Self {
            abilities: Arc::new(abilities),
            config,
            messages: MessageCatalog::default(),
            templates: BTreeMap::new(),
            pools: BTreeMap::new(),
        }
    }

    /// Shared handle to the ability registry for battle construction.
    pub fn abilities(&self) -> Arc<AbilityRegistry> {
        Arc::clone(&self.abilities)
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    pub fn set_messages(&mut self, messages: MessageCatalog) {
        self.messages = messages;
    }

    pub fn add_template(&mut self, template: EnemyTemplate) -> Result<(), ContentError> {
        if self.templates.contains_key(&template.id) {
            return Err(ContentError::DuplicateTemplate(template.id));
        }
        if let Some(ability) = template
            .abilities
            .iter()
            .find(|ability| !self.abilities.contains(ability))
        {
            return Err(ContentError::UnknownAbility {
                template: template.id.clone(),
                ability: ability.clone(),
            });
        }
        template
            .ai
            .build(&self.abilities)
            .map_err(|source| ContentError::InvalidStrategy {
                template: template.id.clone(),
                source,
            })?;

        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    /// Registers a named pool. Every member must be a known template.
    pub fn add_pool(
        &mut self,
        name: impl Into<String>,
        members: Vec<String>,
    ) -> Result<(), ContentError> {
        let name = name.into();
        if members.is_empty() {
            return Err(ContentError::EmptyPool(name));
        }
        if let Some(unknown) = members.iter().find(|id| !self.templates.contains_key(*id)) {
            return Err(ContentError::UnknownTemplate(unknown.clone()));
        }
        self.pools.insert(name, members);
        Ok(())
    }

    pub fn template(&self, id: &str) -> Option<&EnemyTemplate> {
        self.templates.get(id)
    }

    pub fn template_ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn pool(&self, name: &str) -> Option<&[String]> {
        self.pools.get(name).map(Vec::as_slice)
    }

    /// Instantiates a fresh enemy from a template.
    pub fn spawn(&self, id: &str) -> Result<SpawnedEnemy, ContentError> {
        let template = self
            .templates
            .get(id)
            .ok_or_else(|| ContentError::UnknownTemplate(id.to_owned()))?;
        let ai = template
            .ai
            .build(&self.abilities)
            .map_err(|source| ContentError::InvalidStrategy {
                template: template.id.clone(),
                source,
            })?;

        Ok(SpawnedEnemy {
            entity: template.instantiate(),
            ai,
        })
    }

    /// Draws one enemy uniformly from `pool`.
    pub fn spawn_from_pool(
        &self,
        pool: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<SpawnedEnemy, ContentError> {
        let members = self
            .pools
            .get(pool)
            .ok_or_else(|| ContentError::UnknownPool(pool.to_owned()))?;
        let id = members
            .get(rng.index(members.len()))
            .ok_or_else(|| ContentError::EmptyPool(pool.to_owned()))?;
        self.spawn(id)
    }

    /// Builds an enemy group from template ids, in order.
    pub fn spawn_group(&self, side: Side, ids: &[&str]) -> Result<BattleGroup, ContentError> {
        let mut group = BattleGroup::new(side);
        for id in ids {
            let SpawnedEnemy { entity, ai } = self.spawn(id)?;
            group.add_bot(entity, ai);
        }
        Ok(group)
    }
}
