//! Command-line interface definition.

use clap::{Parser, ValueEnum};
use paygate::config::GateConfig;
use paygate::{Chain, Tier, VerificationRequest};
use std::path::PathBuf;

/// Verify an on-chain payment claim and report the verdict.
#[derive(Parser, Debug)]
#[command(name = "paygate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Chain the payment is claimed on.
    #[arg(long, value_enum)]
    pub chain: CliChain,

    /// Paying wallet address, in the chain's native format.
    #[arg(long, short)]
    pub wallet: String,

    /// Tier to unlock.
    #[arg(long, short, value_enum)]
    pub tier: CliTier,

    /// Transaction signature/hash (required for Solana).
    #[arg(long)]
    pub tx_reference: Option<String>,

    /// Ethereum transfer-history API key.
    #[arg(long, env = "PAYGATE_ALCHEMY_KEY")]
    pub alchemy_key: Option<String>,

    /// BNB Smart Chain explorer API key.
    #[arg(long, env = "PAYGATE_BSCSCAN_KEY")]
    pub bscscan_key: Option<String>,

    /// Log level.
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Path to configuration file.
    #[arg(long, short, env = "PAYGATE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Chain CLI enum.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliChain {
    /// Solana SPL payment, keyed by transaction signature.
    Solana,
    /// Ethereum ERC-20 payment.
    Ethereum,
    /// Tron TRC-20 payment.
    Tron,
    /// BNB Smart Chain BEP-20 payment.
    Bsc,
}

/// Tier CLI enum.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliTier {
    /// Entry tier.
    Basic,
    /// Full-feature tier.
    Premium,
}

impl Cli {
    /// Load configuration, applying CLI/environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be
    /// loaded, or if no file is given and the default location exists
    /// but cannot be parsed.
    pub fn load_config(&self) -> color_eyre::Result<GateConfig> {
        let mut config = if let Some(ref path) = self.config {
            GateConfig::from_file(path)?
        } else if let Some(path) = default_config_path() {
            if path.exists() {
                GateConfig::from_file(&path)?
            } else {
                GateConfig::default()
            }
        } else {
            GateConfig::default()
        };

        if let Some(ref key) = self.alchemy_key {
            config.ethereum.api_key.clone_from(key);
        }
        if let Some(ref key) = self.bscscan_key {
            config.bsc.api_key.clone_from(key);
        }
        config.log_level.clone_from(&self.log_level);

        Ok(config)
    }

    /// Build the verification request from CLI arguments.
    #[must_use]
    pub fn into_request(self) -> VerificationRequest {
        VerificationRequest {
            chain: self.chain.into(),
            wallet: self.wallet,
            tier: self.tier.into(),
            tx_reference: self.tx_reference,
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "paygate")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

impl From<CliChain> for Chain {
    fn from(c: CliChain) -> Self {
        match c {
            CliChain::Solana => Chain::Solana,
            CliChain::Ethereum => Chain::Ethereum,
            CliChain::Tron => Chain::Tron,
            CliChain::Bsc => Chain::Bsc,
        }
    }
}

impl From<CliTier> for Tier {
    fn from(t: CliTier) -> Self {
        match t {
            CliTier::Basic => Tier::Basic,
            CliTier::Premium => Tier::Premium,
        }
    }
}
