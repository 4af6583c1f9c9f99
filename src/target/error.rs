//! Error types for target normalization.

use thiserror::Error;

/// Reasons an input line does not become a [`Target`](super::Target).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// The line is empty after trimming; blank lines are ignored silently.
    #[error("blank input line")]
    Blank,

    /// The normalized address does not parse as a fetchable URL.
    #[error("invalid target '{address}': {reason}")]
    Malformed {
        /// The address after prefix joining.
        address: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl TargetError {
    /// Creates a `Malformed` error from any displayable parse failure.
    #[must_use]
    pub fn malformed(address: &str, reason: impl std::fmt::Display) -> Self {
        Self::Malformed {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Malformed` error for an address with a non-web scheme.
    #[must_use]
    pub fn unsupported_scheme(address: &str, scheme: &str) -> Self {
        Self::malformed(address, format!("scheme '{scheme}' is not supported"))
    }
}
