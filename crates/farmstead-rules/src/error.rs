//! Error types for the `farmstead-rules` crate.
//!
//! Every rule violation is detected before any state is touched, so a
//! [`DomainError`] always means "rejected, nothing changed".

/// A gameplay rule rejected the requested action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Not enough seeds, coins or items for the action.
    #[error("insufficient {resource}: required {required}, available {available}")]
    InsufficientResource {
        /// What was lacking (`coins`, `tomato-seed`, ...).
        resource: String,
        /// Amount the action needs.
        required: u64,
        /// Amount the player holds.
        available: u64,
    },

    /// The plot or crop is in a state that does not permit the action.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Human-readable explanation.
        reason: String,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Where the overflow happened.
        context: String,
    },
}

impl DomainError {
    /// Shorthand for an [`DomainError::InvalidState`] rejection.
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`DomainError::ArithmeticOverflow`].
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            context: context.into(),
        }
    }
}
