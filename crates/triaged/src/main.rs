//! Triage Daemon - web API for the platform log triage tool.
//!
//! Serves the frontend bundle and a small authenticated JSON API; every
//! triage request runs the shared load + scan core in isolation.

use anyhow::Result;
use tracing::{info, warn, Level};

use triage_common::TriageConfig;
use triaged::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Triage web API v{} starting", env!("CARGO_PKG_VERSION"));

    let config = TriageConfig::load();
    if !config.mappings_path.exists() {
        warn!(
            "Default mapping table '{}' not found; requests must upload their own",
            config.mappings_path.display()
        );
    }

    server::run(AppState::new(config)).await
}
