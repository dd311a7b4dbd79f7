//! Party persistence between simulated battles.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use battle_core::{Entity, Stat, UserId};

const PARTY_FILE: &str = "party.bin";

/// A fresh user with the starter kit.
pub fn recruit(id: UserId, name: &str) -> Entity {
    Entity::user(id, name)
        .with_stat(Stat::Str, 7)
        .with_stat(Stat::Spd, 6)
        .with_ability("strike")
        .with_ability("heal")
}

pub fn party_path(dir: &Path) -> PathBuf {
    dir.join(PARTY_FILE)
}

/// Loads the saved party from `dir`, or recruits `names` when none is saved.
pub fn load_or_recruit(dir: &Path, names: &[String]) -> Result<Vec<Entity>> {
    let path = party_path(dir);
    if path.exists() {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read party file: {}", path.display()))?;
        let party: Vec<Entity> = bincode::deserialize(&bytes)
            .with_context(|| format!("Failed to decode party file: {}", path.display()))?;
        if !party.is_empty() {
            tracing::info!(path = %path.display(), members = party.len(), "loaded saved party");
            return Ok(party);
        }
    }

    Ok(names
        .iter()
        .zip(1u64..)
        .map(|(name, id)| recruit(UserId(id), name))
        .collect())
}

pub fn save(dir: &Path, party: &[Entity]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create save directory: {}", dir.display()))?;
    let path = party_path(dir);
    let bytes = bincode::serialize(party).context("Failed to encode party")?;
    std::fs::write(&path, bytes)
        .with_context(|| format!("Failed to write party file: {}", path.display()))?;
    tracing::info!(path = %path.display(), members = party.len(), "party saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recruits_when_nothing_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let party = load_or_recruit(dir.path(), &["Rin".into(), "Oskar".into()]).unwrap();

        assert_eq!(party.len(), 2);
        assert_eq!(party[1].user_id(), Some(UserId(2)));
        assert_eq!(party[0].abilities().len(), 2);
    }

    #[test]
    fn saved_party_wins_over_recruits() {
        let dir = tempfile::tempdir().unwrap();
        let mut veteran = recruit(UserId(9), "Vera");
        veteran.set_stat(Stat::Str, 20);
        save(dir.path(), &[veteran]).unwrap();

        let party = load_or_recruit(dir.path(), &["Rin".into()]).unwrap();

        assert_eq!(party.len(), 1);
        assert_eq!(party[0].name(), "Vera");
        assert_eq!(party[0].get_stat(Stat::Str), 20);
    }
}
