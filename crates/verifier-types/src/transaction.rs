//! Normalized verification result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Data anchored by a verified transaction.
///
/// Only produced once the containing block has enough confirmations. The
/// fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
	/// Anchored payload with any `0x` prefix removed.
	remote_hash: String,
	/// Address that sent the transaction.
	issuing_address: String,
	/// Timestamp of the containing block.
	time: DateTime<Utc>,
	/// Addresses revoked by spent outputs. Always `None` for account-model
	/// chains, which have no outputs to spend.
	revoked_addresses: Option<Vec<String>>,
}

impl TransactionData {
	pub fn new(
		remote_hash: impl Into<String>,
		issuing_address: impl Into<String>,
		time: DateTime<Utc>,
		revoked_addresses: Option<Vec<String>>,
	) -> Self {
		Self {
			remote_hash: remote_hash.into(),
			issuing_address: issuing_address.into(),
			time,
			revoked_addresses,
		}
	}

	pub fn remote_hash(&self) -> &str {
		&self.remote_hash
	}

	pub fn issuing_address(&self) -> &str {
		&self.issuing_address
	}

	pub fn time(&self) -> DateTime<Utc> {
		self.time
	}

	pub fn revoked_addresses(&self) -> Option<&[String]> {
		self.revoked_addresses.as_deref()
	}
}
