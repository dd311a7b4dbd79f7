//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a [`BattleConfig`] from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.increase_every == 0 {
            anyhow::bail!("increase_every must be at least 1");
        }
        if !(0..=100).contains(&config.entry_hp_floor_percent) {
            anyhow::bail!(
                "entry_hp_floor_percent must be within 0..=100, got {}",
                config.entry_hp_floor_percent
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("multi_player_delay = 45\n").unwrap();
        assert_eq!(config.multi_player_delay, 45);
        assert_eq!(config.single_player_delay, BattleConfig::SINGLE_PLAYER_DELAY);
        assert_eq!(config.increase_every, BattleConfig::INCREASE_EVERY);
    }

    #[test]
    fn zero_round_step_is_rejected() {
        let err = ConfigLoader::parse("increase_every = 0\n").unwrap_err();
        assert!(err.to_string().contains("increase_every"));
    }
}
