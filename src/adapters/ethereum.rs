//! Ethereum ERC-20 adapter.
//!
//! Queries an Alchemy-style transfer-history API for the most recent
//! token transfers addressed to the receiving address. EVM addresses
//! are case-insensitive-safe, but transport strings arrive in mixed
//! case, so both sides are lower-cased before comparison.

use crate::adapters::{http_client, network_error, ChainAdapter, Transfer};
use crate::config::EthereumConfig;
use crate::error::{Error, Result};
use crate::request::{Chain, VerificationRequest};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Verifies ERC-20 token payments via a transfer-history API.
#[derive(Debug)]
pub struct EthereumAdapter {
    config: EthereumConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<TransfersResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct TransfersResult {
    #[serde(default)]
    transfers: Vec<AssetTransfer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetTransfer {
    from: Option<String>,
    to: Option<String>,
    hash: Option<String>,
    raw_contract: RawContract,
}

#[derive(Debug, Deserialize)]
struct RawContract {
    /// Raw amount as a 0x-prefixed hex string.
    value: Option<String>,
    /// Token decimals as a 0x-prefixed hex string.
    decimal: Option<String>,
}

impl EthereumAdapter {
    /// Create a new Ethereum adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key is missing (a required
    /// credential is a startup-time problem, never a per-request one)
    /// or if the HTTP client cannot be built.
    pub fn new(config: EthereumConfig, timeout: Duration) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::Config(
                "ethereum adapter enabled but no API key configured".to_string(),
            ));
        }
        let client = http_client(timeout)?;
        Ok(Self { config, client })
    }

    fn transfers_from_result(&self, result: TransfersResult) -> Result<Vec<Transfer>> {
        result
            .transfers
            .into_iter()
            .map(|record| {
                let recipient = record.to.ok_or_else(|| {
                    Error::MalformedResponse("ethereum: transfer record missing recipient".into())
                })?;
                let value = record.raw_contract.value.ok_or_else(|| {
                    Error::MalformedResponse("ethereum: transfer record missing raw value".into())
                })?;
                Ok(Transfer {
                    raw_amount: parse_hex_u128(&value)?,
                    decimals: match record.raw_contract.decimal {
                        Some(ref d) => parse_hex_u32(d)?,
                        None => 0,
                    },
                    recipient,
                    sender: record.from,
                    tx_reference: record.hash,
                })
            })
            .collect()
    }
}

fn parse_hex_u128(value: &str) -> Result<u128> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u128::from_str_radix(digits, 16)
        .map_err(|_| Error::MalformedResponse(format!("ethereum: invalid hex amount: {value}")))
}

fn parse_hex_u32(value: &str) -> Result<u32> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u32::from_str_radix(digits, 16)
        .map_err(|_| Error::MalformedResponse(format!("ethereum: invalid hex decimals: {value}")))
}

#[async_trait]
impl ChainAdapter for EthereumAdapter {
    fn chain(&self) -> Chain {
        Chain::Ethereum
    }

    fn receiving_address(&self) -> &str {
        &self.config.receiving_address
    }

    fn recipient_matches(&self, candidate: &str) -> bool {
        candidate.to_lowercase() == self.config.receiving_address.to_lowercase()
    }

    async fn fetch_transfers(&self, _request: &VerificationRequest) -> Result<Vec<Transfer>> {
        debug!(
            "Fetching up to {} ERC-20 transfers to {}",
            self.config.max_records, self.config.receiving_address
        );

        let url = format!("{}/{}", self.config.api_endpoint, self.config.api_key);
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "alchemy_getAssetTransfers",
            "params": [{
                "toAddress": self.config.receiving_address,
                "contractAddresses": [self.config.token_contract],
                "category": ["erc20"],
                "order": "desc",
                "maxCount": format!("{:#x}", self.config.max_records),
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error("ethereum", &e))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "ethereum: API returned status {}",
                response.status()
            )));
        }

        let decoded: RpcResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("ethereum: {e}")))?;

        if let Some(error) = decoded.error {
            return Err(Error::Network(format!(
                "ethereum: API error {}: {}",
                error.code, error.message
            )));
        }

        match decoded.result {
            None => Ok(Vec::new()),
            Some(result) => self.transfers_from_result(result),
        }
    }
}
