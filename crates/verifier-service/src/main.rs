//! Main entry point for the transaction verifier.
//!
//! Looks up one or more transactions through the configured block explorer,
//! checks that each is buried under enough confirmations and prints a JSON
//! report per transaction with the data it anchors.

use clap::Parser;
use futures::future::join_all;
use std::path::PathBuf;
use verifier_config::Config;
use verifier_explorer::{create_explorer, ExplorerInterface};
use verifier_types::Network;

mod report;

use report::VerificationReport;

/// Command-line arguments for the verifier.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Network the transactions were sent on (mainnet, testnet)
	#[arg(short, long, default_value = "mainnet")]
	network: Network,

	/// Overrides the configured minimum number of confirmations
	#[arg(long, value_parser = clap::value_parser!(u64).range(1..=100))]
	min_confirmations: Option<u64>,

	/// Transaction ids to verify
	#[arg(required = true)]
	transactions: Vec<String>,
}

/// Main entry point for the verifier.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Verifies every transaction concurrently and prints the reports
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let mut config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration from {}", args.config.display());

	if let Some(min_confirmations) = args.min_confirmations {
		tracing::info!(
			"Overriding min_confirmations {} -> {}",
			config.explorer.min_confirmations,
			min_confirmations
		);
		config.explorer.min_confirmations = min_confirmations;
	}

	let explorer = create_explorer(&config.explorer)?;
	if !explorer.supported_networks().contains(&args.network) {
		return Err(format!("No explorer endpoint configured for network {}", args.network).into());
	}

	let reports = verify_all(explorer.as_ref(), args.network, &args.transactions).await;
	for report in &reports {
		println!("{}", serde_json::to_string_pretty(report)?);
	}

	let failed = reports.iter().filter(|report| !report.is_verified()).count();
	if failed > 0 {
		return Err(format!(
			"{} of {} transaction(s) failed verification",
			failed,
			reports.len()
		)
		.into());
	}

	tracing::info!("Verified {} transaction(s)", reports.len());
	Ok(())
}

/// Verifies every transaction concurrently, keeping the input order.
///
/// Each verification is independent; a failure of one does not affect the
/// others.
async fn verify_all(
	explorer: &dyn ExplorerInterface,
	network: Network,
	transaction_ids: &[String],
) -> Vec<VerificationReport> {
	let lookups = transaction_ids.iter().map(|transaction_id| async move {
		let result = explorer.get_transaction_data(transaction_id, network).await;
		VerificationReport::new(transaction_id, network, result)
	});

	join_all(lookups).await
}
