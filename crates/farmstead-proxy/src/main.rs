//! Farmstead proxy binary.
//!
//! Loads `farmstead-config.yaml` (or the file named by
//! `FARMSTEAD_CONFIG`), starts an in-process ledger with the configured
//! chain and economy, and serves it over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use farmstead_core::FarmsteadConfig;
use farmstead_ledger::{LedgerBackend, MemoryLedger};
use farmstead_proxy::{AppState, ChainInfo, start_server};
use farmstead_rules::FarmClock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "farmstead-config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::var("FARMSTEAD_CONFIG")
        .map_or_else(|_unset| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, loaded) = if path.exists() {
        let config = FarmsteadConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?;
        (config, true)
    } else {
        (FarmsteadConfig::parse("")?, false)
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_unset| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    if loaded {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        warn!(path = %path.display(), "Config file not found, using defaults");
    }

    let ledger = Arc::new(MemoryLedger::new(
        config.remote.ledger_config(),
        FarmClock::System,
    ));
    info!(
        chain_id = config.remote.chain_id,
        plot_count = config.remote.plot_count,
        "In-process ledger ready"
    );

    let state = Arc::new(AppState::new(
        LedgerBackend::Memory(ledger),
        ChainInfo::from_config(&config.remote),
    ));
    start_server(&config.proxy, state)
        .await
        .context("proxy server failed")?;
    Ok(())
}
