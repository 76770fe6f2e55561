//! Chain adapters: per-chain ledger queries normalized into transfers.
//!
//! Each supported chain has one adapter translating its ledger data
//! source's query API into a sequence of [`Transfer`]s. Adapters are
//! read-only (no keys, no signing), never retry internally, and are
//! isolated from each other: a failure in one has no effect on requests
//! routed to another.
//!
//! # Architecture
//!
//! ```text
//! VerificationRequest
//!        │
//!        ▼
//! ┌──────────────────┐     chain      ┌───────────────────────┐
//! │ AdapterRegistry  │ ─────────────► │ ChainAdapter impl     │
//! └──────────────────┘                │  solana / ethereum /  │
//!                                     │  tron / bsc           │
//!                                     └──────────┬────────────┘
//!                                                │ HTTP query
//!                                                ▼
//!                                     external ledger data source
//! ```

mod bsc;
mod ethereum;
mod solana;
mod tron;

pub use bsc::BscAdapter;
pub use ethereum::EthereumAdapter;
pub use solana::SolanaAdapter;
pub use tron::TronAdapter;

use crate::config::GateConfig;
use crate::error::{Error, Result};
use crate::request::{Chain, VerificationRequest};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// One observed on-ledger value movement, normalized across chains.
///
/// Adapter-owned output; the engine reads it but never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Token amount in the smallest on-ledger unit.
    pub raw_amount: u128,
    /// Decimal precision of the token the amount is denominated in.
    pub decimals: u32,
    /// Receiving address as reported by the ledger.
    pub recipient: String,
    /// Sending address, where the data source reports one.
    pub sender: Option<String>,
    /// Transaction signature/hash, where the data source reports one.
    pub tx_reference: Option<String>,
}

/// Per-chain ledger query strategy.
///
/// Implementations own their HTTP client (with a bounded timeout) and
/// their chain's address-equality rule, so the engine never has to know
/// per-chain comparison semantics.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// The chain this adapter serves.
    fn chain(&self) -> Chain;

    /// The configured receiving address payments must arrive at.
    fn receiving_address(&self) -> &str;

    /// Whether a transfer recipient matches the receiving address, using
    /// this chain's equality rule. Defaults to exact string match.
    fn recipient_matches(&self, candidate: &str) -> bool {
        candidate == self.receiving_address()
    }

    /// Query the ledger data source and return the observed transfers
    /// relevant to the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingReference`] if the chain requires a
    /// transaction reference and the request carries none,
    /// [`Error::Network`] if the data source is unreachable or times
    /// out, and [`Error::MalformedResponse`] if the payload cannot be
    /// parsed into transfers.
    async fn fetch_transfers(&self, request: &VerificationRequest) -> Result<Vec<Transfer>>;
}

/// Registry selecting a [`ChainAdapter`] by chain identifier.
///
/// Built once at startup; selection happens exactly once per request,
/// so a malformed request can never take more than one adapter path.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Chain, Arc<dyn ChainAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every chain enabled in the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if an enabled chain is missing a
    /// required credential or its HTTP client cannot be constructed.
    pub fn from_config(config: &GateConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.query_timeout_secs);
        let mut registry = Self::new();

        if config.solana.enabled {
            registry.register(Arc::new(SolanaAdapter::new(config.solana.clone(), timeout)?));
        }
        if config.ethereum.enabled {
            registry.register(Arc::new(EthereumAdapter::new(
                config.ethereum.clone(),
                timeout,
            )?));
        }
        if config.tron.enabled {
            registry.register(Arc::new(TronAdapter::new(config.tron.clone(), timeout)?));
        }
        if config.bsc.enabled {
            registry.register(Arc::new(BscAdapter::new(config.bsc.clone(), timeout)?));
        }

        info!(
            "Adapter registry initialized ({} chains enabled)",
            registry.len()
        );

        Ok(registry)
    }

    /// Register an adapter, replacing any previous one for the same chain.
    pub fn register(&mut self, adapter: Arc<dyn ChainAdapter>) {
        self.adapters.insert(adapter.chain(), adapter);
    }

    /// Look up the adapter for a chain, if one is registered.
    #[must_use]
    pub fn adapter_for(&self, chain: Chain) -> Option<Arc<dyn ChainAdapter>> {
        self.adapters.get(&chain).cloned()
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no adapters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Build a reqwest client with the per-request timeout every adapter
/// query runs under. A slow data source surfaces [`Error::Network`]
/// instead of blocking the caller indefinitely.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))
}

/// Map a reqwest transport failure onto the crate error taxonomy.
pub(crate) fn network_error(context: &str, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Network(format!("{context}: query timed out"))
    } else {
        Error::Network(format!("{context}: {err}"))
    }
}
