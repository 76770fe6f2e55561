//! Tron TRC-20 adapter.
//!
//! Queries the paying wallet's recent TRC-20 transfer history for the
//! configured token contract and keeps only transfers addressed to the
//! receiving address. Tron addresses are base58 and case-sensitive, so
//! no normalization is applied on either side.

use crate::adapters::{http_client, network_error, ChainAdapter, Transfer};
use crate::config::TronConfig;
use crate::error::{Error, Result};
use crate::request::{Chain, VerificationRequest};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Verifies TRC-20 token payments via an account transfer-history API.
pub struct TronAdapter {
    config: TronConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TronResponse {
    #[serde(default)]
    data: Vec<TronTransfer>,
}

#[derive(Debug, Deserialize)]
struct TronTransfer {
    transaction_id: Option<String>,
    from: Option<String>,
    to: Option<String>,
    value: Option<String>,
    token_info: Option<TokenInfo>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    decimals: Option<u32>,
}

impl TronAdapter {
    /// Create a new Tron adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: TronConfig, timeout: Duration) -> Result<Self> {
        let client = http_client(timeout)?;
        Ok(Self { config, client })
    }

    /// Keep transfers addressed to the receiving address, exact match.
    fn transfers_from_response(&self, response: TronResponse) -> Result<Vec<Transfer>> {
        let mut transfers = Vec::new();
        for record in response.data {
            let Some(recipient) = record.to else {
                return Err(Error::MalformedResponse(
                    "tron: transfer record missing recipient".into(),
                ));
            };
            if !self.recipient_matches(&recipient) {
                continue;
            }
            let value = record.value.ok_or_else(|| {
                Error::MalformedResponse("tron: transfer record missing value".into())
            })?;
            transfers.push(Transfer {
                raw_amount: value.parse::<u128>().map_err(|_| {
                    Error::MalformedResponse(format!("tron: invalid amount: {value}"))
                })?,
                decimals: record
                    .token_info
                    .and_then(|info| info.decimals)
                    .unwrap_or(self.config.token_decimals),
                recipient,
                sender: record.from,
                tx_reference: record.transaction_id,
            });
        }
        Ok(transfers)
    }
}

#[async_trait]
impl ChainAdapter for TronAdapter {
    fn chain(&self) -> Chain {
        Chain::Tron
    }

    fn receiving_address(&self) -> &str {
        &self.config.receiving_address
    }

    async fn fetch_transfers(&self, request: &VerificationRequest) -> Result<Vec<Transfer>> {
        debug!(
            "Fetching up to {} TRC-20 transfers from wallet {}",
            self.config.max_records, request.wallet
        );

        let url = format!(
            "{}/v1/accounts/{}/transactions/trc20",
            self.config.api_endpoint, request.wallet
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("limit", self.config.max_records.to_string()),
                ("contract_address", self.config.token_contract.clone()),
            ])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| network_error("tron", &e))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "tron: API returned status {}",
                response.status()
            )));
        }

        let decoded: TronResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("tron: {e}")))?;

        self.transfers_from_response(decoded)
    }
}
