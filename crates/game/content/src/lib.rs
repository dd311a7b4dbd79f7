//! Data-driven battle content and loaders.
//!
//! This crate houses static content and provides loaders for RON/TOML data files:
//! - Enemy templates and enemy pools (data-driven via RON)
//! - Battle configuration (data-driven via TOML)
//! - Localized message templates (data-driven via TOML)
//!
//! Everything is collected into a [`GameContentRegistry`] built once at
//! process start and passed by reference to whatever starts battles.

pub mod error;
pub mod messages;
pub mod registry;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use error::ContentError;
pub use messages::MessageCatalog;
pub use registry::{EnemyTemplate, GameContentRegistry, SpawnedEnemy};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, EnemyLoader, MessageLoader, PoolLoader};
