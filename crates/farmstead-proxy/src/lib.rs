//! Ledger read proxy and transaction relay for Farmstead.
//!
//! The web mini-app cannot always reach the ledger directly. This crate
//! serves the ledger's reads and relays its state-changing calls over a
//! small JSON API, which `farmstead_ledger::HttpLedger` consumes.
//!
//! Reads return 400 for missing or malformed parameters and 404 for
//! plots that were never initialized.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ProxyError;
pub use router::build_router;
pub use server::{ServerError, serve, start_server};
pub use state::{AppState, ChainInfo};
