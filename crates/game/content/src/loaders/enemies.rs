//! Enemy template and pool loaders.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::registry::EnemyTemplate;

/// Loader for enemy templates from RON files.
///
/// RON format: `Vec<EnemyTemplate>`.
pub struct EnemyLoader;

impl EnemyLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<EnemyTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<EnemyTemplate>> {
        ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse enemy catalog RON: {}", e))
    }
}

/// Loader for named enemy pools from RON files.
///
/// RON format: `Vec<(String, Vec<String>)>`, pool name then template ids.
pub struct PoolLoader;

impl PoolLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<(String, Vec<String>)>> {
        let content = read_file(path)?;
        ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse enemy pools RON: {}", e))
    }
}
