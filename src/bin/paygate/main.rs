//! paygate CLI entry point.
//!
//! One-shot driver: loads configuration, runs a single verification,
//! reports the verdict, and exits non-zero unless the payment
//! qualified. Transport layers (HTTP and friends) are expected to call
//! the library the same way this binary does.

mod cli;

use clap::Parser;
use cli::Cli;
use paygate::{Verdict, VerificationEngine};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();
    let config = cli.load_config()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("paygate v{}", env!("CARGO_PKG_VERSION"));

    let engine = VerificationEngine::from_config(&config)?;
    let request = cli.into_request();

    info!(
        "Checking {} payment from wallet {} for tier {}",
        request.chain, request.wallet, request.tier
    );

    match engine.verify(&request).await {
        Verdict::Paid { transfer } => {
            info!(
                "Payment verified: tier {} unlocked (tx: {})",
                request.tier,
                transfer.tx_reference.as_deref().unwrap_or("n/a")
            );
            Ok(ExitCode::SUCCESS)
        }
        Verdict::NotPaid { reason } => {
            warn!("Payment not found: {reason}");
            Ok(ExitCode::from(1))
        }
        Verdict::Error { cause } => {
            // Log the cause in full here; transport layers must not leak
            // it to end users.
            error!("Verification failed: {cause}");
            Ok(ExitCode::from(2))
        }
    }
}
