//! Message template loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::messages::MessageCatalog;

/// Loader for `key = "template"` TOML files.
pub struct MessageLoader;

impl MessageLoader {
    pub fn load(path: &Path) -> LoadResult<MessageCatalog> {
        let content = read_file(path)?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse messages TOML {}: {}", path.display(), e))
    }
}
