//! Block explorer module for the transaction verifier.
//!
//! This module confirms that a claimed transaction exists, extracts the data
//! it anchors and checks that its block is buried deeply enough to be trusted.
//! Every lookup goes through a remote explorer service in three dependent
//! steps: the transaction, its containing block, then the current chain head.
//!
//! All failures, whatever their origin, reach the caller as a single
//! [`VerifierError`] with status [`Status::FetchingRemoteHash`]. The concrete
//! cause is kept in the error's source chain as a [`FetchFailure`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use verifier_config::ExplorerConfig;
use verifier_types::{Network, Status, TransactionData, VerifierError};

pub mod response;
pub mod transport;

/// Re-export implementations
pub mod implementations {
	pub mod etherscan;
}

pub use response::{RemoteBlock, RemoteTransaction};
pub use transport::{ExplorerTransport, TransportError};

/// Message for any failure while looking up the anchored hash.
pub const REMOTE_HASH_FAILURE: &str = "Unable to get remote hash";

/// Message for a transaction whose block lacks the required confirmations.
pub const INSUFFICIENT_CONFIRMATIONS: &str = "Number of transaction confirmations were less than the minimum required, according to EtherScan API";

/// Errors that can occur while constructing an explorer.
#[derive(Debug, Error)]
pub enum ExplorerError {
	/// Error that occurs when the explorer configuration cannot be used.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// Error that occurs when the HTTP transport cannot be created.
	#[error("Transport error: {0}")]
	Transport(#[from] TransportError),
}

/// Underlying cause of a failed lookup.
///
/// Never returned directly; it is attached as the source of the
/// [`VerifierError`] produced at each stage boundary.
#[derive(Debug, Error)]
pub enum FetchFailure {
	/// The request could not be sent or returned an error status.
	#[error("Explorer request failed: {0}")]
	Transport(#[from] TransportError),
	/// The explorer did not answer in time.
	#[error("Explorer request timed out after {0:?}")]
	Timeout(Duration),
	/// The response body was not the expected JSON shape.
	#[error("Malformed explorer response: {0}")]
	Decode(#[from] serde_json::Error),
	/// No endpoint is configured for the requested network.
	#[error("No explorer endpoint configured for network {0}")]
	UnconfiguredNetwork(Network),
	/// The containing block is not buried deeply enough.
	#[error("Block {block} is not confirmed deeply enough at chain head {head}: {required} confirmation(s) required")]
	InsufficientConfirmations { head: u64, block: u64, required: u64 },
	/// A later stage of the pipeline failed.
	#[error("{0}")]
	Downstream(#[from] VerifierError),
}

/// Trait defining the interface for explorer-backed transaction lookups.
#[async_trait]
pub trait ExplorerInterface: Send + Sync {
	/// Returns the networks this explorer has endpoints for.
	fn supported_networks(&self) -> Vec<Network>;

	/// Looks up a transaction and returns the data it anchors.
	///
	/// Succeeds only when the transaction exists, its block can be fetched and
	/// the block has at least the configured number of confirmations.
	async fn get_transaction_data(
		&self,
		transaction_id: &str,
		network: Network,
	) -> Result<TransactionData, VerifierError>;
}

/// Wraps a stage failure into the outward error kind.
pub(crate) fn remote_hash_failure(cause: FetchFailure) -> VerifierError {
	VerifierError::with_source(Status::FetchingRemoteHash, REMOTE_HASH_FAILURE, cause)
}

/// Factory function to create an explorer from configuration.
///
/// Uses an HTTP transport whose client timeout matches the configured
/// request timeout.
pub fn create_explorer(config: &ExplorerConfig) -> Result<Box<dyn ExplorerInterface>, ExplorerError> {
	let timeout = Duration::from_secs(config.timeout_seconds);
	let transport = transport::http::HttpTransport::new(timeout)?;
	let explorer = implementations::etherscan::EtherscanExplorer::new(config, Arc::new(transport))?;
	Ok(Box::new(explorer))
}
