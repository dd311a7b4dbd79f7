//! Battle simulator entry point.
mod config;
mod logging;
mod party;
mod sim;

use anyhow::Result;
use config::SimConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _guard = logging::setup_logging(config.session_id.as_deref())?;

    sim::run(&config).await
}
