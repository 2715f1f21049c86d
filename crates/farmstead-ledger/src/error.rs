//! Error types for the `farmstead-ledger` crate.

use farmstead_types::OperationId;

/// Errors talking to, or reported by, the authoritative ledger.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The gateway could not be reached or the request did not complete.
    #[error("transport error during {operation}: {reason}")]
    Transport {
        /// Which ledger call was in progress.
        operation: String,
        /// Underlying failure.
        reason: String,
    },

    /// The gateway answered with a non-success status.
    #[error("gateway returned {status} for {operation}: {body}")]
    Status {
        /// Which ledger call was in progress.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The requested record or operation does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// What was looked up.
        what: String,
    },

    /// The call cannot be expressed on this ledger.
    #[error("unsupported: {reason}")]
    Unsupported {
        /// Why the call is unsupported.
        reason: String,
    },

    /// The session is bound to a different chain than the ledger.
    #[error("wrong chain: ledger is on {expected}, session is on {actual}")]
    WrongChain {
        /// Chain the ledger lives on.
        expected: u64,
        /// Chain the session is connected to.
        actual: u64,
    },

    /// No terminal receipt arrived in time.
    #[error("confirmation timed out for operation {operation}")]
    ConfirmationTimeout {
        /// The unconfirmed operation.
        operation: OperationId,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// The underlying error.
        #[from]
        source: serde_json::Error,
    },
}
