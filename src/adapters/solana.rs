//! Solana SPL adapter.
//!
//! Keyed by transaction signature: fetches a single parsed transaction
//! over JSON-RPC and reports the receiving account's token balance
//! delta for the configured mint. The delta, not the gross transferred
//! amount, is what the account actually gained, since a wallet may hold
//! a pre-existing balance.

use crate::adapters::{http_client, network_error, ChainAdapter, Transfer};
use crate::config::SolanaConfig;
use crate::error::{Error, Result};
use crate::request::{Chain, VerificationRequest};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Verifies SPL token payments by transaction signature.
pub struct SolanaAdapter {
    config: SolanaConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<ParsedTransaction>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ParsedTransaction {
    meta: Option<TransactionMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionMeta {
    #[serde(default)]
    pre_token_balances: Vec<TokenBalance>,
    #[serde(default)]
    post_token_balances: Vec<TokenBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalance {
    mint: String,
    owner: Option<String>,
    ui_token_amount: UiTokenAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiTokenAmount {
    /// Raw integer amount as a decimal string.
    amount: String,
    decimals: u32,
}

impl SolanaAdapter {
    /// Create a new Solana adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: SolanaConfig, timeout: Duration) -> Result<Self> {
        let client = http_client(timeout)?;
        Ok(Self { config, client })
    }

    /// Extract the receiving account's balance delta from a parsed
    /// transaction. Pure over the decoded payload, so it is testable
    /// without a network.
    fn transfers_from_transaction(
        &self,
        transaction: &ParsedTransaction,
        signature: &str,
    ) -> Result<Vec<Transfer>> {
        let Some(meta) = &transaction.meta else {
            return Ok(Vec::new());
        };

        let Some(post) = self.balance_row(&meta.post_token_balances) else {
            // Transaction exists but never touched the settlement token
            // at the receiving account.
            return Ok(Vec::new());
        };
        let pre_raw = match self.balance_row(&meta.pre_token_balances) {
            Some(pre) => parse_raw_amount(&pre.ui_token_amount.amount)?,
            None => 0,
        };
        let post_raw = parse_raw_amount(&post.ui_token_amount.amount)?;

        Ok(vec![Transfer {
            raw_amount: post_raw.saturating_sub(pre_raw),
            decimals: post.ui_token_amount.decimals,
            recipient: self.config.receiving_account.clone(),
            sender: None,
            tx_reference: Some(signature.to_string()),
        }])
    }

    /// Select the balance row for the configured mint, honouring the
    /// owner filter when enabled.
    fn balance_row<'a>(&self, rows: &'a [TokenBalance]) -> Option<&'a TokenBalance> {
        rows.iter().find(|row| {
            row.mint == self.config.token_mint
                && (!self.config.require_owner_match
                    || row.owner.as_deref() == Some(self.config.receiving_account.as_str()))
        })
    }
}

fn parse_raw_amount(amount: &str) -> Result<u128> {
    amount
        .parse::<u128>()
        .map_err(|_| Error::MalformedResponse(format!("invalid token amount: {amount}")))
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    fn chain(&self) -> Chain {
        Chain::Solana
    }

    fn receiving_address(&self) -> &str {
        &self.config.receiving_account
    }

    async fn fetch_transfers(&self, request: &VerificationRequest) -> Result<Vec<Transfer>> {
        // Reference check comes before any network traffic.
        let Some(signature) = request.tx_reference.as_deref() else {
            return Err(Error::MissingReference(Chain::Solana));
        };

        debug!("Fetching Solana transaction {signature}");

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTransaction",
            "params": [
                signature,
                { "encoding": "jsonParsed", "maxSupportedTransactionVersion": 0 }
            ]
        });

        let response = self
            .client
            .post(&self.config.rpc_endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error("solana", &e))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "solana: RPC returned status {}",
                response.status()
            )));
        }

        let decoded: RpcResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("solana: {e}")))?;

        if let Some(error) = decoded.error {
            return Err(Error::Network(format!(
                "solana: RPC error {}: {}",
                error.code, error.message
            )));
        }

        match decoded.result {
            // Transaction not found: empty sequence, the engine renders
            // it as "no transfer found" rather than an error.
            None => Ok(Vec::new()),
            Some(transaction) => self.transfers_from_transaction(&transaction, signature),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SolanaConfig;
    use crate::request::Tier;

    const MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
    const ACCOUNT: &str = "7GpjokVaV9vqKtzTQ1UqW8CxfA4cw8sNArfEv2ERvrPs";

    fn test_adapter(require_owner_match: bool) -> SolanaAdapter {
        let config = SolanaConfig {
            require_owner_match,
            ..Default::default()
        };
        SolanaAdapter::new(config, Duration::from_secs(1)).expect("adapter")
    }

    fn parsed_transaction(json: serde_json::Value) -> ParsedTransaction {
        serde_json::from_value(json).expect("fixture")
    }

    #[tokio::test]
    async fn test_missing_reference_before_any_network_call() {
        // Unroutable endpoint: if the adapter attempted a query the test
        // would surface a network error instead of MissingReference.
        let config = SolanaConfig {
            rpc_endpoint: "http://127.0.0.1:1/json_rpc".to_string(),
            ..Default::default()
        };
        let adapter = SolanaAdapter::new(config, Duration::from_secs(1)).expect("adapter");

        let request = VerificationRequest {
            chain: Chain::Solana,
            wallet: "payer".to_string(),
            tier: Tier::Basic,
            tx_reference: None,
        };

        let err = adapter.fetch_transfers(&request).await.unwrap_err();
        assert!(matches!(err, Error::MissingReference(Chain::Solana)));
    }

    #[test]
    fn test_balance_delta_not_gross_amount() {
        let adapter = test_adapter(true);
        let tx = parsed_transaction(serde_json::json!({
            "meta": {
                "preTokenBalances": [
                    { "mint": MINT, "owner": ACCOUNT,
                      "uiTokenAmount": { "amount": "5000000", "decimals": 6 } }
                ],
                "postTokenBalances": [
                    { "mint": MINT, "owner": ACCOUNT,
                      "uiTokenAmount": { "amount": "54000000", "decimals": 6 } }
                ]
            }
        }));

        let transfers = adapter.transfers_from_transaction(&tx, "sig").expect("parse");
        assert_eq!(transfers.len(), 1);
        // 54 - 5 pre-existing, not 54
        assert_eq!(transfers[0].raw_amount, 49_000_000);
        assert_eq!(transfers[0].decimals, 6);
        assert_eq!(transfers[0].recipient, ACCOUNT);
        assert_eq!(transfers[0].tx_reference.as_deref(), Some("sig"));
    }

    #[test]
    fn test_no_pre_balance_means_full_post_balance() {
        let adapter = test_adapter(true);
        let tx = parsed_transaction(serde_json::json!({
            "meta": {
                "preTokenBalances": [],
                "postTokenBalances": [
                    { "mint": MINT, "owner": ACCOUNT,
                      "uiTokenAmount": { "amount": "19000000", "decimals": 6 } }
                ]
            }
        }));

        let transfers = adapter.transfers_from_transaction(&tx, "sig").expect("parse");
        assert_eq!(transfers[0].raw_amount, 19_000_000);
    }

    #[test]
    fn test_owner_filter_skips_unrelated_accounts() {
        let adapter = test_adapter(true);
        let tx = parsed_transaction(serde_json::json!({
            "meta": {
                "preTokenBalances": [],
                "postTokenBalances": [
                    { "mint": MINT, "owner": "SomeoneElse",
                      "uiTokenAmount": { "amount": "99000000", "decimals": 6 } }
                ]
            }
        }));

        let transfers = adapter.transfers_from_transaction(&tx, "sig").expect("parse");
        assert!(transfers.is_empty());

        // With the filter off, the row counts.
        let adapter = test_adapter(false);
        let transfers = adapter.transfers_from_transaction(&tx, "sig").expect("parse");
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].raw_amount, 99_000_000);
    }

    #[test]
    fn test_other_mints_ignored() {
        let adapter = test_adapter(true);
        let tx = parsed_transaction(serde_json::json!({
            "meta": {
                "preTokenBalances": [],
                "postTokenBalances": [
                    { "mint": "OtherMint1111111111111111111111111111111111",
                      "owner": ACCOUNT,
                      "uiTokenAmount": { "amount": "49000000", "decimals": 6 } }
                ]
            }
        }));

        let transfers = adapter.transfers_from_transaction(&tx, "sig").expect("parse");
        assert!(transfers.is_empty());
    }

    #[test]
    fn test_unparseable_amount_is_malformed_response() {
        let adapter = test_adapter(true);
        let tx = parsed_transaction(serde_json::json!({
            "meta": {
                "preTokenBalances": [],
                "postTokenBalances": [
                    { "mint": MINT, "owner": ACCOUNT,
                      "uiTokenAmount": { "amount": "not-a-number", "decimals": 6 } }
                ]
            }
        }));

        let err = adapter.transfers_from_transaction(&tx, "sig").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_recipient_match_is_case_sensitive() {
        let adapter = test_adapter(true);
        assert!(adapter.recipient_matches(ACCOUNT));
        assert!(!adapter.recipient_matches(&ACCOUNT.to_lowercase()));
    }
}
