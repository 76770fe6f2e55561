//! Verification request types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported blockchain networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    /// Solana, SPL token payments keyed by transaction signature.
    Solana,
    /// Ethereum, ERC-20 token payments.
    Ethereum,
    /// Tron, TRC-20 token payments.
    Tron,
    /// BNB Smart Chain, BEP-20 token payments.
    Bsc,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Chain::Solana => "solana",
            Chain::Ethereum => "ethereum",
            Chain::Tron => "tron",
            Chain::Bsc => "bsc",
        };
        write!(f, "{name}")
    }
}

/// Purchasable feature tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Entry tier.
    Basic,
    /// Full-feature tier.
    Premium,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Basic => "basic",
            Tier::Premium => "premium",
        };
        write!(f, "{name}")
    }
}

/// A single payment verification request.
///
/// Constructed per inbound call by the dispatcher, immutable afterwards,
/// and discarded once the verdict is rendered. Wallet addresses are
/// chain-specific strings; checksum validation is not performed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Chain the payment is claimed on.
    pub chain: Chain,

    /// Paying wallet address, in the chain's native format.
    pub wallet: String,

    /// Tier the caller wants unlocked.
    pub tier: Tier,

    /// Transaction reference (signature/hash). Required by chains that
    /// key their ledger query on it, ignored by the others.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_reference: Option<String>,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_serde_lowercase() {
        let json = serde_json::to_string(&Chain::Bsc).expect("serialize");
        assert_eq!(json, "\"bsc\"");
        let chain: Chain = serde_json::from_str("\"solana\"").expect("deserialize");
        assert_eq!(chain, Chain::Solana);
    }

    #[test]
    fn test_request_round_trip() {
        let request = VerificationRequest {
            chain: Chain::Tron,
            wallet: "TFGRg4us7h3eFF7oaddefAKnzPAXX5NQKC".to_string(),
            tier: Tier::Premium,
            tx_reference: None,
        };
        let json = serde_json::to_string(&request).expect("serialize");
        // tx_reference is omitted when absent
        assert!(!json.contains("tx_reference"));
        let back: VerificationRequest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.chain, Chain::Tron);
        assert_eq!(back.tier, Tier::Premium);
    }
}
