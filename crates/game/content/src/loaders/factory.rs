//! Content factory for building the registry from data files.

use std::path::{Path, PathBuf};

use battle_core::{AbilityRegistry, BattleConfig};

use crate::loaders::{ConfigLoader, EnemyLoader, LoadResult, MessageLoader, PoolLoader};
use crate::messages::MessageCatalog;
use crate::registry::{EnemyTemplate, GameContentRegistry};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml     (optional, defaults otherwise)
/// ├── enemies.ron
/// ├── pools.ron       (optional)
/// └── messages.toml   (optional)
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `config.toml`, or defaults when absent.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config.toml, using defaults");
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load enemy templates from `enemies.ron`.
    pub fn load_enemies(&self) -> LoadResult<Vec<EnemyTemplate>> {
        EnemyLoader::load(&self.data_dir.join("enemies.ron"))
    }

    /// Load enemy pools from `pools.ron`, or none when absent.
    pub fn load_pools(&self) -> LoadResult<Vec<(String, Vec<String>)>> {
        let path = self.data_dir.join("pools.ron");
        if !path.exists() {
            return Ok(Vec::new());
        }
        PoolLoader::load(&path)
    }

    /// Load message templates from `messages.toml`, or an empty catalog.
    pub fn load_messages(&self) -> LoadResult<MessageCatalog> {
        let path = self.data_dir.join("messages.toml");
        if !path.exists() {
            return Ok(MessageCatalog::default());
        }
        MessageLoader::load(&path)
    }

    /// Loads everything and validates it into a [`GameContentRegistry`]
    /// backed by the standard ability catalogue.
    pub fn build_registry(&self) -> LoadResult<GameContentRegistry> {
        let config = self.load_config()?;
        let mut registry = GameContentRegistry::new(AbilityRegistry::standard(), config);

        let enemies = self.load_enemies()?;
        let enemy_count = enemies.len();
        for template in enemies {
            registry.add_template(template)?;
        }

        let pools = self.load_pools()?;
        let pool_count = pools.len();
        for (name, members) in pools {
            registry.add_pool(name, members)?;
        }

        registry.set_messages(self.load_messages()?);

        tracing::info!(
            data_dir = %self.data_dir.display(),
            enemies = enemy_count,
            pools = pool_count,
            messages = registry.messages().len(),
            "content registry loaded"
        );
        Ok(registry)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
