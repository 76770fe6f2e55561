//! Tier pricing and amount normalization.

use crate::error::{Error, Result};
use crate::request::Tier;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Maps tiers to minimum payment amounts and converts raw on-ledger
/// integer amounts into exact decimal amounts.
///
/// The table is read-only after construction; one policy instance is
/// shared by all verification calls.
#[derive(Debug, Clone)]
pub struct AmountPolicy {
    minimums: HashMap<Tier, Decimal>,
}

impl AmountPolicy {
    /// Create a policy from a tier minimum table.
    #[must_use]
    pub fn new(minimums: HashMap<Tier, Decimal>) -> Self {
        Self { minimums }
    }

    /// Minimum payment amount for a tier, in the token's canonical unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTier`] if the tier has no configured
    /// minimum.
    pub fn minimum_for(&self, tier: Tier) -> Result<Decimal> {
        self.minimums
            .get(&tier)
            .copied()
            .ok_or_else(|| Error::UnknownTier(tier.to_string()))
    }

    /// Convert a raw integer token amount into its decimal value given
    /// the token's decimal precision.
    ///
    /// The conversion is scaled-integer, not floating point, so it is
    /// exact for any raw amount a ledger can report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if the raw amount or scale
    /// exceeds what a 96-bit decimal mantissa can represent.
    pub fn normalize(raw_amount: u128, decimals: u32) -> Result<Decimal> {
        let mantissa = i128::try_from(raw_amount).map_err(|_| {
            Error::MalformedResponse(format!("token amount out of range: {raw_amount}"))
        })?;
        Decimal::try_from_i128_with_scale(mantissa, decimals).map_err(|e| {
            Error::MalformedResponse(format!(
                "cannot represent amount {raw_amount} at scale {decimals}: {e}"
            ))
        })
    }

    /// Number of configured tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.minimums.len()
    }

    /// Whether the table is empty (every lookup would fail).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.minimums.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn test_policy() -> AmountPolicy {
        let mut minimums = HashMap::new();
        minimums.insert(Tier::Basic, Decimal::from(19));
        minimums.insert(Tier::Premium, Decimal::from(49));
        AmountPolicy::new(minimums)
    }

    #[test]
    fn test_minimum_for_configured_tiers() {
        let policy = test_policy();
        assert_eq!(policy.minimum_for(Tier::Basic).unwrap(), Decimal::from(19));
        assert_eq!(policy.minimum_for(Tier::Premium).unwrap(), Decimal::from(49));
    }

    #[test]
    fn test_minimum_for_unconfigured_tier() {
        let policy = AmountPolicy::new(HashMap::new());
        let err = policy.minimum_for(Tier::Premium).unwrap_err();
        assert!(matches!(err, Error::UnknownTier(ref t) if t == "premium"));
    }

    #[test]
    fn test_normalize_is_exact() {
        assert_eq!(
            AmountPolicy::normalize(19_000_000, 6).unwrap(),
            Decimal::from(19)
        );
        assert_eq!(
            AmountPolicy::normalize(49_000_000, 6).unwrap(),
            Decimal::from(49)
        );
        assert_eq!(
            AmountPolicy::normalize(49_000_001, 6).unwrap(),
            Decimal::from_str("49.000001").unwrap()
        );
    }

    #[test]
    fn test_normalize_large_raw_amount() {
        // 18-decimal tokens produce raw amounts far beyond f64 precision
        let amount = AmountPolicy::normalize(1_234_567_890_123_456_789, 18).unwrap();
        assert_eq!(amount, Decimal::from_str("1.234567890123456789").unwrap());
    }

    #[test]
    fn test_normalize_rejects_unrepresentable() {
        assert!(AmountPolicy::normalize(u128::MAX, 6).is_err());
        assert!(AmountPolicy::normalize(1, 64).is_err());
    }

    proptest! {
        #[test]
        fn prop_normalize_whole_tokens(raw in 0u64..1_000_000_000, decimals in 0u32..=12) {
            // raw whole tokens scaled up then normalized come back exactly
            let scaled = u128::from(raw) * 10u128.pow(decimals);
            let amount = AmountPolicy::normalize(scaled, decimals).unwrap();
            prop_assert_eq!(amount, Decimal::from(raw));
        }
    }
}
