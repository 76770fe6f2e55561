//! Error types for paygate.

use crate::request::Chain;
use thiserror::Error;

/// Errors produced by the verification core.
///
/// Infrastructure failures (`Network`, `MalformedResponse`) are kept
/// distinct from business outcomes: a failed ledger query must never be
/// presented as "payment not found".
#[derive(Debug, Error)]
pub enum Error {
    /// A chain that keys its query by transaction reference was called
    /// without one.
    #[error("transaction reference required for {0}")]
    MissingReference(Chain),

    /// The requested tier has no configured minimum amount.
    #[error("unknown tier: {0}")]
    UnknownTier(String),

    /// No adapter is configured for the requested chain.
    #[error("unsupported chain: {0}")]
    UnsupportedChain(Chain),

    /// The ledger data source was unreachable, timed out, or rejected
    /// the query.
    #[error("ledger query failed: {0}")]
    Network(String),

    /// The ledger data source returned a payload that cannot be parsed
    /// into transfers.
    #[error("malformed ledger response: {0}")]
    MalformedResponse(String),

    /// Invalid or incomplete startup configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (configuration file access).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias using the crate error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if the failure is transient and worth a retry by the
    /// caller (the core itself never retries).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_network_is_retryable() {
        assert!(Error::Network("timed out".into()).is_retryable());
        assert!(!Error::UnknownTier("gold".into()).is_retryable());
        assert!(!Error::MalformedResponse("bad json".into()).is_retryable());
    }

    #[test]
    fn test_display_names_chain() {
        let err = Error::MissingReference(Chain::Solana);
        assert!(err.to_string().contains("solana"));
    }
}
