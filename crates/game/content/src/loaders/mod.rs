//! Content loaders for reading battle data from files.
//!
//! RON for structured content (enemy templates, pools), TOML for flat
//! key/value data (battle config, message templates).

pub mod config;
pub mod enemies;
pub mod factory;
pub mod messages;

pub use config::ConfigLoader;
pub use enemies::{EnemyLoader, PoolLoader};
pub use factory::ContentFactory;
pub use messages::MessageLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
