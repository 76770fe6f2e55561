//! Configuration for paygate.
//!
//! Every constant the verification core depends on (receiving
//! addresses, token identifiers, decimal precision, tier minimums, API
//! credentials, endpoints) lives here and is injected at startup.
//! Nothing is read from the environment inside request handling, which
//! keeps the core deterministic under test.

use crate::request::Tier;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Timeout applied to every ledger data source query, in seconds.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Tier → minimum payment amount, in the settlement token's
    /// canonical unit.
    #[serde(default = "default_tiers")]
    pub tiers: HashMap<Tier, Decimal>,

    /// Solana (SPL) adapter configuration.
    #[serde(default)]
    pub solana: SolanaConfig,

    /// Ethereum (ERC-20) adapter configuration.
    #[serde(default)]
    pub ethereum: EthereumConfig,

    /// Tron (TRC-20) adapter configuration.
    #[serde(default)]
    pub tron: TronConfig,

    /// BNB Smart Chain (BEP-20) adapter configuration.
    #[serde(default)]
    pub bsc: BscConfig,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Solana adapter configuration.
///
/// The query is keyed by transaction signature and the amount is the
/// receiving account's token balance delta, so only the RPC endpoint,
/// the mint, and the receiving account are needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaConfig {
    /// Whether verification on this chain is offered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// JSON-RPC endpoint.
    #[serde(default = "default_solana_rpc")]
    pub rpc_endpoint: String,

    /// Token account expected to receive payments.
    #[serde(default = "default_solana_account")]
    pub receiving_account: String,

    /// Mint address of the settlement token.
    #[serde(default = "default_solana_mint")]
    pub token_mint: String,

    /// Decimal precision of the settlement token.
    #[serde(default = "default_usdt_decimals")]
    pub token_decimals: u32,

    /// Only count balance rows owned by the receiving account. Guards
    /// against a transaction that also touches unrelated accounts
    /// holding the same mint.
    #[serde(default = "default_true")]
    pub require_owner_match: bool,
}

/// Ethereum adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthereumConfig {
    /// Whether verification on this chain is offered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Transfer-history API endpoint; the API key is appended as the
    /// final path segment.
    #[serde(default = "default_ethereum_endpoint")]
    pub api_endpoint: String,

    /// API credential. Required: an enabled Ethereum adapter with an
    /// empty key is a startup configuration error.
    #[serde(default)]
    pub api_key: String,

    /// Address expected to receive payments.
    #[serde(default = "default_evm_address")]
    pub receiving_address: String,

    /// Contract address of the settlement token.
    #[serde(default = "default_ethereum_usdt")]
    pub token_contract: String,

    /// Number of most recent transfer records to scan.
    #[serde(default = "default_ethereum_records")]
    pub max_records: u32,
}

/// Tron adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TronConfig {
    /// Whether verification on this chain is offered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// REST API endpoint.
    #[serde(default = "default_tron_endpoint")]
    pub api_endpoint: String,

    /// Address expected to receive payments. Base58, case-sensitive.
    #[serde(default = "default_tron_address")]
    pub receiving_address: String,

    /// Contract address of the settlement token.
    #[serde(default = "default_tron_usdt")]
    pub token_contract: String,

    /// Decimal precision used when a record does not declare one.
    #[serde(default = "default_usdt_decimals")]
    pub token_decimals: u32,

    /// Number of most recent transfer records to scan.
    #[serde(default = "default_scan_records")]
    pub max_records: u32,
}

/// BNB Smart Chain adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BscConfig {
    /// Whether verification on this chain is offered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Explorer API endpoint.
    #[serde(default = "default_bsc_endpoint")]
    pub api_endpoint: String,

    /// API credential. The explorer accepts a shared public key at a
    /// reduced rate limit, so this one is optional.
    #[serde(default = "default_bsc_key")]
    pub api_key: String,

    /// Address expected to receive payments. The explorer reports
    /// lower-case hex; the configured value must match exactly.
    #[serde(default = "default_evm_address")]
    pub receiving_address: String,

    /// Contract address of the settlement token.
    #[serde(default = "default_bsc_usdt")]
    pub token_contract: String,

    /// Number of most recent transfer records to scan.
    #[serde(default = "default_scan_records")]
    pub max_records: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: default_query_timeout(),
            tiers: default_tiers(),
            solana: SolanaConfig::default(),
            ethereum: EthereumConfig::default(),
            tron: TronConfig::default(),
            bsc: BscConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rpc_endpoint: default_solana_rpc(),
            receiving_account: default_solana_account(),
            token_mint: default_solana_mint(),
            token_decimals: default_usdt_decimals(),
            require_owner_match: true,
        }
    }
}

impl Default for EthereumConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_endpoint: default_ethereum_endpoint(),
            api_key: String::new(),
            receiving_address: default_evm_address(),
            token_contract: default_ethereum_usdt(),
            max_records: default_ethereum_records(),
        }
    }
}

impl Default for TronConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_endpoint: default_tron_endpoint(),
            receiving_address: default_tron_address(),
            token_contract: default_tron_usdt(),
            token_decimals: default_usdt_decimals(),
            max_records: default_scan_records(),
        }
    }
}

impl Default for BscConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_endpoint: default_bsc_endpoint(),
            api_key: default_bsc_key(),
            receiving_address: default_evm_address(),
            token_contract: default_bsc_usdt(),
            max_records: default_scan_records(),
        }
    }
}

fn default_true() -> bool {
    true
}

const fn default_query_timeout() -> u64 {
    5
}

fn default_tiers() -> HashMap<Tier, Decimal> {
    let mut tiers = HashMap::new();
    tiers.insert(Tier::Basic, Decimal::from(19));
    tiers.insert(Tier::Premium, Decimal::from(49));
    tiers
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_solana_rpc() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}

fn default_solana_account() -> String {
    "7GpjokVaV9vqKtzTQ1UqW8CxfA4cw8sNArfEv2ERvrPs".to_string()
}

fn default_solana_mint() -> String {
    "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB".to_string()
}

const fn default_usdt_decimals() -> u32 {
    6
}

fn default_ethereum_endpoint() -> String {
    "https://eth-mainnet.g.alchemy.com/v2".to_string()
}

fn default_evm_address() -> String {
    "0xae10abaa803153489dee70da4a7679c1da2906d0".to_string()
}

fn default_ethereum_usdt() -> String {
    "0xdAC17F958D2ee523a2206206994597C13D831ec7".to_string()
}

const fn default_ethereum_records() -> u32 {
    25
}

fn default_tron_endpoint() -> String {
    "https://api.trongrid.io".to_string()
}

fn default_tron_address() -> String {
    "TFGRg4us7h3eFF7oaddefAKnzPAXX5NQKC".to_string()
}

fn default_tron_usdt() -> String {
    "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".to_string()
}

const fn default_scan_records() -> u32 {
    5
}

fn default_bsc_endpoint() -> String {
    "https://api.bscscan.com/api".to_string()
}

fn default_bsc_key() -> String {
    "freekey".to_string()
}

fn default_bsc_usdt() -> String {
    "0x55d398326f99059fF775485246999027B3197955".to_string()
}

impl GateConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
