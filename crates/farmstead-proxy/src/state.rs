//! Shared application state for the proxy.

use farmstead_core::config::RemoteConfig;
use farmstead_ledger::LedgerBackend;

/// What the proxy tells clients about the chain it serves.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    /// Chain id.
    pub chain_id: u64,
    /// Human-readable chain name.
    pub chain_name: String,
    /// Chain RPC endpoint.
    pub rpc_url: String,
    /// Farming contract address.
    pub contract_address: String,
}

impl ChainInfo {
    /// Chain details from the `remote` configuration section.
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            chain_name: config.chain_name.clone(),
            rpc_url: config.rpc_url.clone(),
            contract_address: config.contract_address.clone(),
        }
    }
}

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// The ledger requests are relayed to.
    pub ledger: LedgerBackend,
    /// Chain details served at `/api/chain`.
    pub chain: ChainInfo,
}

impl AppState {
    /// Create state relaying to `ledger`.
    pub const fn new(ledger: LedgerBackend, chain: ChainInfo) -> Self {
        Self { ledger, chain }
    }
}
