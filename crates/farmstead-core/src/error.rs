//! Error types for the farm engines.
//!
//! Domain errors are detected before anything is dispatched and leave all
//! state untouched. External errors come from the ledger after dispatch;
//! they never modify the cached confirmed state either.

use farmstead_ledger::StoreError;
use farmstead_rules::DomainError;
use farmstead_types::OperationId;

use crate::config::ConfigError;
use crate::engine::EngineKind;
use crate::snapshot::SnapshotError;

/// The remote ledger failed, rejected, or could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExternalError {
    /// A ledger call failed or was rejected.
    #[error("{operation} failed: {reason}")]
    RequestFailed {
        /// The ledger call.
        operation: String,
        /// Why it failed.
        reason: String,
    },

    /// The session is connected to a different chain than the ledger.
    #[error("wrong network: expected chain {expected}, connected to {actual}")]
    WrongNetwork {
        /// Chain the ledger lives on.
        expected: u64,
        /// Chain the session is on.
        actual: u64,
    },
}

impl ExternalError {
    /// Classify a ledger error raised while performing `operation`.
    pub fn from_store(operation: &str, err: StoreError) -> Self {
        match err {
            StoreError::WrongChain { expected, actual } => Self::WrongNetwork { expected, actual },
            other => Self::RequestFailed {
                operation: operation.to_owned(),
                reason: other.to_string(),
            },
        }
    }
}

/// Errors returned by a farm engine operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A gameplay rule rejected the action.
    #[error("domain error: {source}")]
    Domain {
        /// The rule violation.
        #[from]
        source: DomainError,
    },

    /// The remote ledger failed or rejected the action.
    #[error("external error: {source}")]
    External {
        /// The ledger failure.
        #[from]
        source: ExternalError,
    },

    /// Loading the saved game failed.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The snapshot failure.
        #[from]
        source: SnapshotError,
    },

    /// The engine configuration is unusable.
    #[error("config error: {source}")]
    Config {
        /// The configuration failure.
        #[from]
        source: ConfigError,
    },

    /// The ledger confirmed the call, but the state could not be read back
    /// afterwards. The call was applied; do not resubmit it.
    #[error("{operation} was confirmed as {operation_id}, but reading the new state failed: {source}")]
    RefreshFailed {
        /// The confirmed ledger call.
        operation: String,
        /// Ledger operation id of the confirmed call.
        operation_id: OperationId,
        /// Why the read failed.
        source: ExternalError,
    },

    /// Another mutating operation from this session is still in flight.
    #[error("busy: {in_flight} is still awaiting confirmation")]
    Busy {
        /// The operation that is in flight.
        in_flight: String,
    },

    /// The engine does not offer this operation.
    #[error("{operation} is not supported by the {engine} engine")]
    Unsupported {
        /// The requested operation.
        operation: &'static str,
        /// The engine it was requested from.
        engine: EngineKind,
    },

    /// The engine task has shut down.
    #[error("engine stopped")]
    Stopped,
}
