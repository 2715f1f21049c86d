//! Remote authoritative ledger for the Farmstead farm simulation.
//!
//! The remote engine treats a ledger as the single source of truth for
//! player and plot state. Reads are plain request/response; writes are
//! submitted as [`StoreCall`]s and only count once their [`Receipt`]
//! reports [`TxStatus::Confirmed`].
//!
//! # Modules
//!
//! - [`call`] -- Calls, operation handles, receipts
//! - [`memory`] -- [`MemoryLedger`], an in-process ledger with contract rules
//! - [`http`] -- [`HttpLedger`], a `reqwest` client for the gateway routes
//! - [`backend`] -- [`LedgerBackend`] enum dispatch over both
//! - [`wire`] -- JSON bodies shared with the gateway
//! - [`error`] -- [`StoreError`]

pub mod backend;
pub mod call;
pub mod error;
pub mod http;
pub mod memory;
pub mod wire;

pub use backend::LedgerBackend;
pub use call::{OperationHandle, Receipt, StoreCall, TxStatus};
pub use error::StoreError;
pub use http::HttpLedger;
pub use memory::{MemoryLedger, MemoryLedgerConfig};
