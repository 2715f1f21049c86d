//! Configuration loading and typed config structures for Farmstead.
//!
//! The canonical configuration lives in `farmstead-config.yaml` at the
//! project root. Every section and field has a default, so an empty file
//! (or no file at all) yields a working local and remote setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use farmstead_ledger::MemoryLedgerConfig;
use farmstead_rules::economy;
use farmstead_types::ItemId;
use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FarmsteadConfig {
    /// Local simulation settings.
    #[serde(default)]
    pub local: LocalConfig,

    /// Remote ledger settings.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Gateway proxy settings.
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FarmsteadConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `FARMSTEAD_GATEWAY_URL` overrides `remote.gateway_url`
    /// - `FARMSTEAD_RPC_URL` overrides `remote.rpc_url`
    /// - `FARMSTEAD_PROXY_PORT` overrides `proxy.port`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and validate it.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FARMSTEAD_GATEWAY_URL") {
            self.remote.gateway_url = val;
        }
        if let Ok(val) = std::env::var("FARMSTEAD_RPC_URL") {
            self.remote.rpc_url = val;
        }
        if let Ok(val) = std::env::var("FARMSTEAD_PROXY_PORT") {
            match val.parse() {
                Ok(port) => self.proxy.port = port,
                Err(e) => warn!(value = %val, error = %e, "Ignoring invalid FARMSTEAD_PROXY_PORT"),
            }
        }
    }

    /// Reject values no engine can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if self.local.tick_interval_ms == 0 {
            return invalid("local.tick_interval_ms must be at least 1");
        }
        if self.local.grid_width == 0 || self.local.grid_height == 0 {
            return invalid("local grid must have at least one plot");
        }
        if self.remote.plot_count == 0 {
            return invalid("remote.plot_count must be at least 1");
        }
        if self.remote.poll_interval_ms == 0 || self.remote.confirmation_poll_interval_ms == 0 {
            return invalid("remote poll intervals must be at least 1 ms");
        }
        self.local.starting_items().map(|_| ())
    }
}

/// Local simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalConfig {
    /// Milliseconds between growth ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Key the snapshot is saved under.
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,

    /// Directory holding snapshot files.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Plots per row.
    #[serde(default = "default_grid_side")]
    pub grid_width: u32,

    /// Number of rows.
    #[serde(default = "default_grid_side")]
    pub grid_height: u32,

    /// Coins a new player starts with.
    #[serde(default = "default_starting_coins")]
    pub starting_coins: u64,

    /// Items a new player starts with, keyed by item id.
    #[serde(default = "default_starting_inventory")]
    pub starting_inventory: BTreeMap<String, u32>,
}

impl LocalConfig {
    /// Tick interval as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Starting inventory with parsed item ids.
    pub fn starting_items(&self) -> Result<BTreeMap<ItemId, u32>, ConfigError> {
        self.starting_inventory
            .iter()
            .map(|(id, qty)| {
                id.parse::<ItemId>()
                    .map(|item| (item, *qty))
                    .map_err(|e| ConfigError::Invalid {
                        reason: format!("local.starting_inventory: {e}"),
                    })
            })
            .collect()
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            snapshot_key: default_snapshot_key(),
            snapshot_dir: default_snapshot_dir(),
            grid_width: default_grid_side(),
            grid_height: default_grid_side(),
            starting_coins: default_starting_coins(),
            starting_inventory: default_starting_inventory(),
        }
    }
}

/// Remote ledger settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteConfig {
    /// Chain the ledger lives on.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Human-readable chain name.
    #[serde(default = "default_chain_name")]
    pub chain_name: String,

    /// Chain RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Address of the farming contract.
    #[serde(default = "default_contract_address")]
    pub contract_address: String,

    /// Base URL of the ledger gateway.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Milliseconds between background refreshes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Milliseconds between receipt polls while waiting for confirmation.
    #[serde(default = "default_confirmation_poll_interval_ms")]
    pub confirmation_poll_interval_ms: u64,

    /// Give up waiting for a confirmation after this many milliseconds.
    /// Unset means wait indefinitely.
    #[serde(default)]
    pub confirmation_timeout_ms: Option<u64>,

    /// Plots per player.
    #[serde(default = "default_plot_count")]
    pub plot_count: u32,

    /// Coins per native currency unit.
    #[serde(default = "default_coins_per_native_unit")]
    pub coins_per_native_unit: u64,

    /// Switch the session to the ledger's chain automatically.
    #[serde(default = "default_true")]
    pub auto_switch_network: bool,

    /// Coins a fresh player holds on an in-process ledger.
    #[serde(default = "default_starting_coins")]
    pub starting_coins: u64,
}

impl RemoteConfig {
    /// Background refresh interval.
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Receipt poll interval.
    pub const fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    /// Confirmation timeout, if any.
    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_ms.map(Duration::from_millis)
    }

    /// Parameters for an in-process ledger matching this configuration.
    pub const fn ledger_config(&self) -> MemoryLedgerConfig {
        MemoryLedgerConfig {
            chain_id: self.chain_id,
            starting_coins: self.starting_coins,
            plot_count: self.plot_count,
            coins_per_native_unit: self.coins_per_native_unit,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            chain_name: default_chain_name(),
            rpc_url: default_rpc_url(),
            contract_address: default_contract_address(),
            gateway_url: default_gateway_url(),
            poll_interval_ms: default_poll_interval_ms(),
            confirmation_poll_interval_ms: default_confirmation_poll_interval_ms(),
            confirmation_timeout_ms: None,
            plot_count: default_plot_count(),
            coins_per_native_unit: default_coins_per_native_unit(),
            auto_switch_network: default_true(),
            starting_coins: default_starting_coins(),
        }
    }
}

/// Gateway proxy settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyConfig {
    /// Interface to bind.
    #[serde(default = "default_proxy_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_proxy_port")]
    pub port: u16,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_tick_interval_ms() -> u64 {
    10_000
}

fn default_snapshot_key() -> String {
    "farming-simulator-state".to_owned()
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("data")
}

const fn default_grid_side() -> u32 {
    5
}

const fn default_starting_coins() -> u64 {
    100
}

fn default_starting_inventory() -> BTreeMap<String, u32> {
    BTreeMap::from([
        ("tomato-seed".to_owned(), 5),
        ("carrot-seed".to_owned(), 3),
        ("watering-can".to_owned(), 1),
    ])
}

const fn default_chain_id() -> u64 {
    10143
}

fn default_chain_name() -> String {
    "Monad Testnet".to_owned()
}

fn default_rpc_url() -> String {
    "https://testnet-rpc.monad.xyz".to_owned()
}

fn default_contract_address() -> String {
    "0x59db61af8500A5df9BD65Aad9611AbAcef261669".to_owned()
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:8080".to_owned()
}

const fn default_poll_interval_ms() -> u64 {
    5_000
}

const fn default_confirmation_poll_interval_ms() -> u64 {
    1_000
}

const fn default_plot_count() -> u32 {
    25
}

const fn default_coins_per_native_unit() -> u64 {
    economy::DEFAULT_COINS_PER_NATIVE_UNIT
}

const fn default_true() -> bool {
    true
}

fn default_proxy_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_proxy_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use farmstead_types::{CropKind, ToolKind};

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FarmsteadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.local.tick_interval_ms, 10_000);
        assert_eq!(config.local.snapshot_key, "farming-simulator-state");
        assert_eq!(config.remote.chain_id, 10143);
        assert_eq!(config.remote.plot_count, 25);
        assert_eq!(config.remote.coins_per_native_unit, 50);
    }

    #[test]
    fn starting_items_parse() {
        let items = LocalConfig::default().starting_items().unwrap_or_default();
        assert_eq!(items.get(&ItemId::Seed(CropKind::Tomato)), Some(&5));
        assert_eq!(items.get(&ItemId::Seed(CropKind::Carrot)), Some(&3));
        assert_eq!(items.get(&ItemId::Tool(ToolKind::WateringCan)), Some(&1));
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r"
local:
  tick_interval_ms: 500
  starting_coins: 250
remote:
  confirmation_timeout_ms: 30000
  auto_switch_network: false
logging:
  level: debug
";
        let config = FarmsteadConfig::parse(yaml).unwrap_or_default();
        assert_eq!(config.local.tick_interval_ms, 500);
        assert_eq!(config.local.starting_coins, 250);
        assert_eq!(config.local.grid_width, 5);
        assert_eq!(
            config.remote.confirmation_timeout(),
            Some(Duration::from_secs(30))
        );
        assert!(!config.remote.auto_switch_network);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(FarmsteadConfig::parse("").is_ok());
    }

    #[test]
    fn rejects_unknown_starting_item() {
        let yaml = "local:\n  starting_inventory:\n    banana-seed: 2\n";
        assert!(matches!(
            FarmsteadConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_zero_tick_interval() {
        let yaml = "local:\n  tick_interval_ms: 0\n";
        assert!(matches!(
            FarmsteadConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("farmstead-config.yaml");
        if path.exists() {
            let config = FarmsteadConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
