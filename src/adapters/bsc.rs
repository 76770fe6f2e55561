//! BNB Smart Chain BEP-20 adapter.
//!
//! Queries an explorer-style `account.tokentx` API keyed by the paying
//! account and the configured token contract. The explorer reports
//! addresses in lower-case hex, so the configured receiving address is
//! compared by exact string match.

use crate::adapters::{http_client, network_error, ChainAdapter, Transfer};
use crate::config::BscConfig;
use crate::error::{Error, Result};
use crate::request::{Chain, VerificationRequest};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Verifies BEP-20 token payments via an explorer token-transfer API.
pub struct BscAdapter {
    config: BscConfig,
    client: reqwest::Client,
}

/// Explorer envelope. `result` is an array of records on success and a
/// diagnostic string on failure, hence the loose typing.
#[derive(Debug, Deserialize)]
struct ScanResponse {
    status: String,
    message: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenTx {
    from: Option<String>,
    to: Option<String>,
    value: Option<String>,
    token_decimal: Option<String>,
    hash: Option<String>,
}

impl BscAdapter {
    /// Create a new BNB Smart Chain adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: BscConfig, timeout: Duration) -> Result<Self> {
        let client = http_client(timeout)?;
        Ok(Self { config, client })
    }

    fn transfers_from_response(response: ScanResponse) -> Result<Vec<Transfer>> {
        if response.status != "1" {
            // The explorer signals both "nothing there" and real
            // failures through status 0; only the former is a valid
            // empty result.
            if response.message.starts_with("No transactions") {
                return Ok(Vec::new());
            }
            let detail = response
                .result
                .as_str()
                .unwrap_or(response.message.as_str());
            return Err(Error::Network(format!("bsc: explorer error: {detail}")));
        }

        let records: Vec<TokenTx> = serde_json::from_value(response.result)
            .map_err(|e| Error::MalformedResponse(format!("bsc: {e}")))?;

        records
            .into_iter()
            .map(|record| {
                let recipient = record.to.ok_or_else(|| {
                    Error::MalformedResponse("bsc: transfer record missing recipient".into())
                })?;
                let value = record.value.ok_or_else(|| {
                    Error::MalformedResponse("bsc: transfer record missing value".into())
                })?;
                let decimals = record.token_decimal.ok_or_else(|| {
                    Error::MalformedResponse("bsc: transfer record missing decimals".into())
                })?;
                Ok(Transfer {
                    raw_amount: value.parse::<u128>().map_err(|_| {
                        Error::MalformedResponse(format!("bsc: invalid amount: {value}"))
                    })?,
                    decimals: decimals.parse::<u32>().map_err(|_| {
                        Error::MalformedResponse(format!("bsc: invalid decimals: {decimals}"))
                    })?,
                    recipient,
                    sender: record.from,
                    tx_reference: record.hash,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ChainAdapter for BscAdapter {
    fn chain(&self) -> Chain {
        Chain::Bsc
    }

    fn receiving_address(&self) -> &str {
        &self.config.receiving_address
    }

    async fn fetch_transfers(&self, request: &VerificationRequest) -> Result<Vec<Transfer>> {
        debug!(
            "Fetching up to {} BEP-20 transfers from account {}",
            self.config.max_records, request.wallet
        );

        let offset = self.config.max_records.to_string();
        let response = self
            .client
            .get(&self.config.api_endpoint)
            .query(&[
                ("module", "account"),
                ("action", "tokentx"),
                ("contractaddress", self.config.token_contract.as_str()),
                ("address", request.wallet.as_str()),
                ("page", "1"),
                ("offset", offset.as_str()),
                ("sort", "desc"),
                ("apikey", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| network_error("bsc", &e))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "bsc: explorer returned status {}",
                response.status()
            )));
        }

        let decoded: ScanResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("bsc: {e}")))?;

        Self::transfers_from_response(decoded)
    }
}
