//! Etherscan-compatible explorer implementation.
//!
//! Talks to the `module=proxy` family of endpoints, which mirror the node
//! JSON-RPC methods. A verification runs three dependent queries in order:
//!
//! 1. `eth_getTransactionByHash` for the transaction record
//! 2. `eth_getBlockByNumber` for the containing block
//! 3. `eth_blockNumber` for the chain head, to count confirmations
//!
//! Each stage is one error boundary: whatever goes wrong inside it, including
//! a failure of the stage it delegates to, leaves as one [`VerifierError`].

use crate::response::{Envelope, Quantity, RemoteBlock, RemoteTransaction};
use crate::{
	remote_hash_failure, ExplorerError, ExplorerInterface, ExplorerTransport, FetchFailure,
	INSUFFICIENT_CONFIRMATIONS,
};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use verifier_config::ExplorerConfig;
use verifier_types::{
	cleanup_remote_hash, truncate_id, Network, Status, TransactionData, VerifierError,
};

const ACTION_TRANSACTION_BY_HASH: &str = "eth_getTransactionByHash";
const ACTION_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
const ACTION_BLOCK_NUMBER: &str = "eth_blockNumber";

/// Explorer endpoint resolved from configuration.
#[derive(Debug, Clone)]
struct Endpoint {
	base_url: Url,
	api_key: Option<String>,
}

/// Comparison of the chain head against the block holding a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ConfirmationCheck {
	head: u64,
	block: u64,
	required: u64,
}

impl ConfirmationCheck {
	/// Blocks mined on top of the target block, `None` if the head is behind it.
	fn confirmations(&self) -> Option<u64> {
		self.head.checked_sub(self.block)
	}

	fn passed(&self) -> bool {
		self.confirmations()
			.is_some_and(|confirmations| confirmations >= self.required)
	}
}

/// Explorer backed by an Etherscan-compatible API.
pub struct EtherscanExplorer {
	/// Transport used for every request.
	transport: Arc<dyn ExplorerTransport>,
	/// Endpoint per configured network.
	endpoints: HashMap<Network, Endpoint>,
	/// Confirmations required before transaction data is trusted.
	min_confirmations: u64,
	/// Upper bound for each individual request.
	request_timeout: Duration,
}

impl EtherscanExplorer {
	/// Creates an explorer from configuration, sending requests through
	/// `transport`.
	pub fn new(
		config: &ExplorerConfig,
		transport: Arc<dyn ExplorerTransport>,
	) -> Result<Self, ExplorerError> {
		let mut endpoints = HashMap::new();

		for (network, endpoint) in &config.networks {
			let base_url = Url::parse(endpoint.base_url.trim()).map_err(|e| {
				ExplorerError::Configuration(format!(
					"Invalid base_url for network {}: {}",
					network, e
				))
			})?;

			endpoints.insert(
				*network,
				Endpoint {
					base_url,
					api_key: endpoint.resolved_api_key().map(str::to_string),
				},
			);
		}

		Ok(Self {
			transport,
			endpoints,
			min_confirmations: config.min_confirmations,
			request_timeout: Duration::from_secs(config.timeout_seconds),
		})
	}

	/// Looks up a transaction and returns the data it anchors.
	///
	/// The block lookup and the confirmation check run only after the
	/// transaction record has been received and decoded.
	pub async fn lookup_transaction(
		&self,
		transaction_id: &str,
		network: Network,
	) -> Result<TransactionData, VerifierError> {
		self.fetch_transaction_data(transaction_id, network)
			.await
			.map_err(|cause| {
				tracing::warn!(
					"Failed to verify transaction {} on {}: {}",
					truncate_id(transaction_id),
					network,
					cause
				);
				remote_hash_failure(cause)
			})
	}

	async fn fetch_transaction_data(
		&self,
		transaction_id: &str,
		network: Network,
	) -> Result<TransactionData, FetchFailure> {
		let url = self.query_url(
			network,
			&[
				("action", ACTION_TRANSACTION_BY_HASH),
				("txhash", transaction_id),
			],
		)?;
		let transaction: RemoteTransaction = self.fetch(url).await?;
		if let Some(hash) = transaction
			.hash
			.as_deref()
			.filter(|hash| !hash.eq_ignore_ascii_case(transaction_id))
		{
			tracing::debug!(
				"Explorer returned transaction {} for requested {}",
				truncate_id(hash),
				truncate_id(transaction_id)
			);
		}
		let block = self.lookup_block(&transaction, network).await?;

		Ok(parse_explorer_response(&transaction, &block))
	}

	/// Fetches the block containing `transaction`.
	///
	/// The block is only returned once the confirmation check has passed.
	pub async fn lookup_block(
		&self,
		transaction: &RemoteTransaction,
		network: Network,
	) -> Result<RemoteBlock, VerifierError> {
		self.fetch_block(transaction.block_number.value(), network)
			.await
			.map_err(|cause| {
				tracing::debug!("Block lookup failed: {}", cause);
				remote_hash_failure(cause)
			})
	}

	async fn fetch_block(
		&self,
		block_number: u64,
		network: Network,
	) -> Result<RemoteBlock, FetchFailure> {
		let tag = format!("0x{:x}", block_number);
		let url = self.query_url(
			network,
			&[
				("action", ACTION_BLOCK_BY_NUMBER),
				("tag", &tag),
				("boolean", "true"),
			],
		)?;
		let block: RemoteBlock = self.fetch(url).await?;
		if let Some(number) = block.number.filter(|number| number.value() != block_number) {
			tracing::debug!(
				"Explorer returned block {} for requested tag {}",
				number.value(),
				tag
			);
		}
		self.check_confirmations(network, block_number).await?;

		Ok(block)
	}

	/// Checks that `block_number` has at least the configured number of
	/// confirmations and returns the current chain head.
	///
	/// A head exactly `min_confirmations` blocks ahead passes.
	pub async fn check_confirmations(
		&self,
		network: Network,
		block_number: u64,
	) -> Result<u64, VerifierError> {
		self.fetch_confirmation_check(network, block_number)
			.await
			.map_err(|cause| {
				tracing::debug!("Confirmation check failed: {}", cause);
				if matches!(cause, FetchFailure::InsufficientConfirmations { .. }) {
					VerifierError::with_source(
						Status::FetchingRemoteHash,
						INSUFFICIENT_CONFIRMATIONS,
						cause,
					)
				} else {
					remote_hash_failure(cause)
				}
			})
	}

	async fn fetch_confirmation_check(
		&self,
		network: Network,
		block_number: u64,
	) -> Result<u64, FetchFailure> {
		let url = self.query_url(network, &[("action", ACTION_BLOCK_NUMBER)])?;
		let head: Quantity = self.fetch(url).await?;

		let check = ConfirmationCheck {
			head: head.value(),
			block: block_number,
			required: self.min_confirmations,
		};
		if !check.passed() {
			return Err(FetchFailure::InsufficientConfirmations {
				head: check.head,
				block: check.block,
				required: check.required,
			});
		}

		tracing::debug!(
			"Block {} has {} confirmation(s) on {}",
			block_number,
			check.confirmations().unwrap_or_default(),
			network
		);
		Ok(check.head)
	}

	/// Builds the request URL for `network` with `params` appended.
	fn query_url(&self, network: Network, params: &[(&str, &str)]) -> Result<Url, FetchFailure> {
		let endpoint = self
			.endpoints
			.get(&network)
			.ok_or(FetchFailure::UnconfiguredNetwork(network))?;

		let mut url = endpoint.base_url.clone();
		{
			let mut query = url.query_pairs_mut();
			query.extend_pairs(params);
			if let Some(api_key) = &endpoint.api_key {
				query.append_pair("apikey", api_key);
			}
		}

		if let Some((_, action)) = params.iter().find(|(key, _)| *key == "action") {
			tracing::debug!("Querying {} explorer: {}", network, action);
		}
		Ok(url)
	}

	/// Sends one request and decodes the `result` of the response envelope.
	async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchFailure> {
		let body = tokio::time::timeout(self.request_timeout, self.transport.get(&url))
			.await
			.map_err(|_| FetchFailure::Timeout(self.request_timeout))??;

		let envelope: Envelope<T> = serde_json::from_str(&body)?;
		Ok(envelope.result)
	}
}

#[async_trait]
impl ExplorerInterface for EtherscanExplorer {
	fn supported_networks(&self) -> Vec<Network> {
		let mut networks: Vec<Network> = self.endpoints.keys().copied().collect();
		networks.sort();
		networks
	}

	async fn get_transaction_data(
		&self,
		transaction_id: &str,
		network: Network,
	) -> Result<TransactionData, VerifierError> {
		self.lookup_transaction(transaction_id, network).await
	}
}

/// Combines a transaction and its confirmed block into [`TransactionData`].
///
/// Account-model chains have no spendable outputs, so revocation by spent
/// output never applies and `revoked_addresses` is left unset.
pub fn parse_explorer_response(
	transaction: &RemoteTransaction,
	block: &RemoteBlock,
) -> TransactionData {
	TransactionData::new(
		cleanup_remote_hash(&transaction.input),
		transaction.from_address.clone(),
		block.timestamp,
		None,
	)
}
