//! Conversion of numeric quantities returned by block explorers.
//!
//! Explorers are inconsistent about numbers: JSON-RPC style endpoints return
//! `0x`-prefixed hex strings while others return decimal strings or plain JSON
//! numbers. Block timestamps are always hex-encoded seconds.

use thiserror::Error;

/// Errors that can occur while decoding a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
	/// The quantity string was empty.
	#[error("Empty quantity")]
	Empty,
	/// The quantity string is not a valid number in the expected radix.
	#[error("Invalid quantity '{0}'")]
	Invalid(String),
}

/// Parses a quantity given either as `0x`-prefixed hex or as a decimal string.
pub fn parse_quantity(value: &str) -> Result<u64, QuantityError> {
	let value = value.trim();
	if value.is_empty() {
		return Err(QuantityError::Empty);
	}

	let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		Some(hex) => u64::from_str_radix(hex, 16),
		None => value.parse::<u64>(),
	};
	parsed.map_err(|_| QuantityError::Invalid(value.to_string()))
}

/// Parses a hex quantity, with or without the `0x` prefix.
pub fn parse_hex_quantity(value: &str) -> Result<u64, QuantityError> {
	let value = value.trim();
	let hex = value
		.strip_prefix("0x")
		.or_else(|| value.strip_prefix("0X"))
		.unwrap_or(value);
	if hex.is_empty() {
		return Err(QuantityError::Empty);
	}

	u64::from_str_radix(hex, 16).map_err(|_| QuantityError::Invalid(value.to_string()))
}
