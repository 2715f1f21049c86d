//! Farm engines for Farmstead.
//!
//! Two interchangeable engines implement [`FarmEngine`]:
//!
//! - [`LocalEngine`] owns a `GameState`, accrues growth on a periodic tick
//!   and saves a snapshot after every change.
//! - [`RemoteEngine`] treats a ledger as the source of truth, allows one
//!   mutating call in flight per session and re-reads state after every
//!   confirmed call.
//!
//! # Modules
//!
//! - [`engine`] -- The [`FarmEngine`] capability and engine-independent views
//! - [`local`] -- Local simulation engine
//! - [`remote`] -- Remote ledger engine
//! - [`snapshot`] -- Flat key-value snapshot persistence
//! - [`config`] -- YAML configuration
//! - [`error`] -- [`EngineError`] and [`ExternalError`]

pub mod config;
pub mod engine;
pub mod error;
pub mod local;
pub mod remote;
pub mod snapshot;

pub use config::{ConfigError, FarmsteadConfig};
pub use engine::{EngineKind, FarmEngine, FarmView, PendingView, PlayerView, PlotView, SeedPolicy};
pub use error::{EngineError, ExternalError};
pub use local::{LocalEngine, LocalFarm, LocalSettings};
pub use remote::{RemoteEngine, RemoteSettings};
pub use snapshot::{SnapshotError, SnapshotStore};
