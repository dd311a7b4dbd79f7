//! Simulation configuration loaded from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Which enemies the party fights.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnemySource {
    /// Explicit template ids, in group order.
    Templates(Vec<String>),
    /// `count` draws from a named pool.
    Pool { name: String, count: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub content_dir: PathBuf,
    pub seed: u64,
    pub tick: Duration,
    pub enemies: EnemySource,
    pub party: Vec<String>,
    pub save_dir: Option<PathBuf>,
    pub session_id: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../game/content/data")),
            seed: 0x5eed,
            tick: Duration::from_millis(10),
            enemies: EnemySource::Pool {
                name: "camp".to_owned(),
                count: 2,
            },
            party: vec!["Rin".to_owned(), "Oskar".to_owned()],
            save_dir: None,
            session_id: None,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_CONTENT_DIR` - Content directory (default: shipped data)
    /// - `BATTLE_SEED` - RNG seed (default: fixed)
    /// - `BATTLE_TICK_MS` - Milliseconds per window tick (default: 10)
    /// - `BATTLE_ENEMIES` - Comma-separated template ids, or `pool:<name>:<count>`
    /// - `BATTLE_PARTY` - Comma-separated user names (default: two users)
    /// - `BATTLE_SAVE_DIR` - Where the party is persisted between runs (default: platform data dir)
    /// - `BATTLE_SESSION_ID` - Log session name (default: auto-generated)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("BATTLE_CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }

        if let Some(seed) = read_env::<u64>("BATTLE_SEED") {
            config.seed = seed;
        }

        if let Some(ms) = read_env::<u64>("BATTLE_TICK_MS") {
            config.tick = Duration::from_millis(ms.max(1));
        }

        if let Some(enemies) = env::var("BATTLE_ENEMIES").ok().and_then(|raw| parse_enemies(&raw)) {
            config.enemies = enemies;
        }

        if let Some(party) = env::var("BATTLE_PARTY").ok().map(|raw| split_list(&raw))
            && !party.is_empty()
        {
            config.party = party;
        }

        config.save_dir = env::var("BATTLE_SAVE_DIR").ok().map(PathBuf::from);
        config.session_id = env::var("BATTLE_SESSION_ID").ok();

        config
    }
}

/// `slime,rat` or `pool:forest:3`.
pub fn parse_enemies(raw: &str) -> Option<EnemySource> {
    if let Some(rest) = raw.trim().strip_prefix("pool:") {
        let (name, count) = match rest.split_once(':') {
            Some((name, count)) => (name, count.trim().parse().ok()?),
            None => (rest, 1),
        };
        if name.is_empty() || count == 0 {
            return None;
        }
        return Some(EnemySource::Pool {
            name: name.trim().to_owned(),
            count,
        });
    }

    let ids = split_list(raw);
    (!ids.is_empty()).then_some(EnemySource::Templates(ids))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
