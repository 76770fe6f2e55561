//! Verification engine: one adapter call, one policy check, one verdict.
//!
//! The engine is stateless across calls; per-call state is a single
//! transition from pending to exactly one of Paid, NotPaid, or Error.
//! Infrastructure failures are never downgraded to NotPaid: a timed-out
//! ledger query must stay distinguishable from a genuine absence of
//! payment so the caller can retry it instead of telling the user their
//! payment was not found.

use crate::adapters::{AdapterRegistry, Transfer};
use crate::config::GateConfig;
use crate::error::{Error, Result};
use crate::policy::AmountPolicy;
use crate::request::VerificationRequest;
use std::fmt;
use tracing::{debug, info, warn};

/// Why a completed scan found no qualifying payment.
///
/// Typed so callers distinguish outcomes without inspecting message
/// text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPayment {
    /// The ledger query completed but returned no transfers at all.
    NoTransferFound,
    /// Transfers were observed, but none met both the minimum amount
    /// and the recipient rule.
    NoQualifyingTransfer,
}

impl fmt::Display for NoPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            NoPayment::NoTransferFound => "no transfer found",
            NoPayment::NoQualifyingTransfer => "amount or recipient mismatch",
        };
        write!(f, "{reason}")
    }
}

/// Outcome of one verification attempt.
#[derive(Debug)]
pub enum Verdict {
    /// A qualifying payment was observed.
    Paid {
        /// The transfer that satisfied the tier minimum and recipient
        /// rule.
        transfer: Transfer,
    },
    /// The scan completed without finding a qualifying payment. A
    /// legitimate business outcome, not a failure.
    NotPaid {
        /// Why nothing qualified.
        reason: NoPayment,
    },
    /// The verification could not be completed. Eligible for a retry by
    /// the caller when [`Error::is_retryable`] holds.
    Error {
        /// The underlying failure.
        cause: Error,
    },
}

impl Verdict {
    /// Returns true if a qualifying payment was observed.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        matches!(self, Verdict::Paid { .. })
    }

    /// The matched transfer, when the verdict is Paid.
    #[must_use]
    pub fn matched_transfer(&self) -> Option<&Transfer> {
        match self {
            Verdict::Paid { transfer } => Some(transfer),
            _ => None,
        }
    }
}

/// Payment verification engine.
///
/// Holds the adapter registry and the amount policy, both immutable
/// after startup; `verify` calls share no mutable state and may run
/// concurrently without coordination.
pub struct VerificationEngine {
    registry: AdapterRegistry,
    policy: AmountPolicy,
}

impl VerificationEngine {
    /// Create an engine from an adapter registry and an amount policy.
    #[must_use]
    pub fn new(registry: AdapterRegistry, policy: AmountPolicy) -> Self {
        Self { registry, policy }
    }

    /// Build the engine, registry, and policy from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if an enabled adapter cannot be
    /// constructed (for example, a missing required credential).
    pub fn from_config(config: &GateConfig) -> Result<Self> {
        let registry = AdapterRegistry::from_config(config)?;
        let policy = AmountPolicy::new(config.tiers.clone());

        info!(
            "Verification engine initialized ({} chains, {} tiers)",
            registry.len(),
            policy.len()
        );

        Ok(Self { registry, policy })
    }

    /// Verify one payment claim and render a verdict.
    ///
    /// Exactly one verdict is produced per request. `Paid` is only
    /// returned with a matched transfer whose normalized amount meets
    /// the tier minimum and whose recipient satisfies the adapter's own
    /// matching rule; the engine never re-implements per-chain address
    /// equality.
    pub async fn verify(&self, request: &VerificationRequest) -> Verdict {
        let minimum = match self.policy.minimum_for(request.tier) {
            Ok(minimum) => minimum,
            Err(cause) => return Verdict::Error { cause },
        };

        let Some(adapter) = self.registry.adapter_for(request.chain) else {
            return Verdict::Error {
                cause: Error::UnsupportedChain(request.chain),
            };
        };

        debug!(
            "Verifying {} payment for tier {} (minimum {})",
            request.chain, request.tier, minimum
        );

        let transfers = match adapter.fetch_transfers(request).await {
            Ok(transfers) => transfers,
            Err(cause) => {
                warn!("Ledger query failed on {}: {}", request.chain, cause);
                return Verdict::Error { cause };
            }
        };

        if transfers.is_empty() {
            debug!("No transfers observed on {}", request.chain);
            return Verdict::NotPaid {
                reason: NoPayment::NoTransferFound,
            };
        }

        for transfer in transfers {
            let amount = match AmountPolicy::normalize(transfer.raw_amount, transfer.decimals) {
                Ok(amount) => amount,
                Err(cause) => return Verdict::Error { cause },
            };
            if amount >= minimum && adapter.recipient_matches(&transfer.recipient) {
                info!(
                    "Payment verified on {}: {} >= {} to {}",
                    request.chain, amount, minimum, transfer.recipient
                );
                return Verdict::Paid { transfer };
            }
        }

        debug!("Transfers observed on {} but none qualified", request.chain);
        Verdict::NotPaid {
            reason: NoPayment::NoQualifyingTransfer,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adapters::ChainAdapter;
    use crate::request::{Chain, Tier};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct FixedAdapter {
        transfers: Vec<Transfer>,
    }

    #[async_trait]
    impl ChainAdapter for FixedAdapter {
        fn chain(&self) -> Chain {
            Chain::Ethereum
        }

        fn receiving_address(&self) -> &str {
            "0xreceiver"
        }

        async fn fetch_transfers(
            &self,
            _request: &VerificationRequest,
        ) -> crate::Result<Vec<Transfer>> {
            Ok(self.transfers.clone())
        }
    }

    fn engine_with(transfers: Vec<Transfer>) -> VerificationEngine {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(FixedAdapter { transfers }));
        let mut minimums = HashMap::new();
        minimums.insert(Tier::Premium, Decimal::from(49));
        VerificationEngine::new(registry, AmountPolicy::new(minimums))
    }

    fn request() -> VerificationRequest {
        VerificationRequest {
            chain: Chain::Ethereum,
            wallet: "0xpayer".to_string(),
            tier: Tier::Premium,
            tx_reference: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_tier_is_error_not_notpaid() {
        let engine = engine_with(Vec::new());
        let verdict = engine
            .verify(&VerificationRequest {
                tier: Tier::Basic, // not in the table above
                ..request()
            })
            .await;
        assert!(matches!(
            verdict,
            Verdict::Error {
                cause: Error::UnknownTier(_)
            }
        ));
    }

    #[tokio::test]
    async fn test_unsupported_chain() {
        let engine = engine_with(Vec::new());
        let verdict = engine
            .verify(&VerificationRequest {
                chain: Chain::Tron,
                ..request()
            })
            .await;
        assert!(matches!(
            verdict,
            Verdict::Error {
                cause: Error::UnsupportedChain(Chain::Tron)
            }
        ));
    }

    #[tokio::test]
    async fn test_paid_requires_both_amount_and_recipient() {
        // Right amount, wrong recipient: not paid.
        let engine = engine_with(vec![Transfer {
            raw_amount: 49_000_001,
            decimals: 6,
            recipient: "0xother".to_string(),
            sender: None,
            tx_reference: None,
        }]);
        let verdict = engine.verify(&request()).await;
        assert!(matches!(
            verdict,
            Verdict::NotPaid {
                reason: NoPayment::NoQualifyingTransfer
            }
        ));
    }

    #[tokio::test]
    async fn test_first_qualifying_transfer_wins() {
        let engine = engine_with(vec![
            Transfer {
                raw_amount: 1_000_000,
                decimals: 6,
                recipient: "0xreceiver".to_string(),
                sender: None,
                tx_reference: Some("small".to_string()),
            },
            Transfer {
                raw_amount: 50_000_000,
                decimals: 6,
                recipient: "0xreceiver".to_string(),
                sender: None,
                tx_reference: Some("big".to_string()),
            },
        ]);
        let verdict = engine.verify(&request()).await;
        let transfer = verdict.matched_transfer().expect("paid");
        assert_eq!(transfer.tx_reference.as_deref(), Some("big"));
    }
}
