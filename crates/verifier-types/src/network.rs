//! Network selector types.
//!
//! A verification always targets one deployed network. The selector is a
//! closed enumeration so that endpoint lookup never depends on comparing
//! free-form strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Network a transaction is looked up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
	/// Production network.
	Mainnet,
	/// Public test network.
	Testnet,
}

/// Error returned when a string does not name a known network.
#[derive(Debug, Error)]
#[error("Unknown network '{0}', expected one of: mainnet, testnet")]
pub struct NetworkParseError(String);

impl Network {
	pub fn as_str(&self) -> &'static str {
		match self {
			Network::Mainnet => "mainnet",
			Network::Testnet => "testnet",
		}
	}
}

impl fmt::Display for Network {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Accepts the canonical names plus the legacy chain codes used in
/// certificate metadata (`ethmain`, `ethropst`).
impl FromStr for Network {
	type Err = NetworkParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"mainnet" | "ethmain" => Ok(Network::Mainnet),
			"testnet" | "ethropst" | "ropsten" => Ok(Network::Testnet),
			_ => Err(NetworkParseError(s.to_string())),
		}
	}
}
