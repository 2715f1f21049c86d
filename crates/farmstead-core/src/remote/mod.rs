//! Remote ledger engine.
//!
//! - [`flight`] -- Single-flight guard for mutating calls
//! - [`engine`] -- [`RemoteEngine`], confirmation and refresh orchestration

pub mod engine;
pub mod flight;

pub use engine::{RemoteEngine, RemoteSettings};
pub use flight::{FlightGuard, SingleFlight};
