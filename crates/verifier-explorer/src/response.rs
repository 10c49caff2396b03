//! Explorer response types.
//!
//! Every explorer query answers with an envelope whose `result` field holds
//! the payload. Only the fields the verifier relies on are decoded; anything
//! else in the payload is ignored.

use chrono::{DateTime, Utc};
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use verifier_types::{parse_hex_quantity, parse_quantity};

/// Response envelope shared by every explorer query.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
	pub result: T,
}

/// Transaction record returned by a transaction-by-hash query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTransaction {
	/// Transaction hash as reported by the explorer.
	#[serde(default)]
	pub hash: Option<String>,
	/// Number of the block containing the transaction.
	pub block_number: Quantity,
	/// Sender of the transaction.
	#[serde(rename = "from")]
	pub from_address: String,
	/// Raw call data carrying the anchored payload.
	pub input: String,
}

/// Block record returned by a block-by-number query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteBlock {
	/// Block number as reported by the explorer.
	#[serde(default)]
	pub number: Option<Quantity>,
	/// Block time, decoded from hex-encoded seconds.
	#[serde(deserialize_with = "deserialize_block_time")]
	pub timestamp: DateTime<Utc>,
}

/// Unsigned quantity given as a JSON number, a decimal string or a
/// `0x`-prefixed hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(pub u64);

impl Quantity {
	pub fn value(self) -> u64 {
		self.0
	}
}

impl<'de> Deserialize<'de> for Quantity {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct QuantityVisitor;

		impl Visitor<'_> for QuantityVisitor {
			type Value = Quantity;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a non-negative integer, decimal string or 0x-prefixed hex string")
			}

			fn visit_u64<E: de::Error>(self, value: u64) -> Result<Quantity, E> {
				Ok(Quantity(value))
			}

			fn visit_i64<E: de::Error>(self, value: i64) -> Result<Quantity, E> {
				u64::try_from(value)
					.map(Quantity)
					.map_err(|_| E::invalid_value(Unexpected::Signed(value), &self))
			}

			fn visit_str<E: de::Error>(self, value: &str) -> Result<Quantity, E> {
				parse_quantity(value).map(Quantity).map_err(E::custom)
			}
		}

		deserializer.deserialize_any(QuantityVisitor)
	}
}

/// Converts block time in seconds to an instant, going through milliseconds
/// since the epoch.
pub fn block_time_from_seconds(seconds: u64) -> Option<DateTime<Utc>> {
	let millis = i64::try_from(seconds).ok()?.checked_mul(1000)?;
	DateTime::from_timestamp_millis(millis)
}

fn deserialize_block_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;
	let seconds = parse_hex_quantity(&raw).map_err(de::Error::custom)?;
	block_time_from_seconds(seconds)
		.ok_or_else(|| de::Error::custom(format!("Block timestamp '{}' is out of range", raw)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_decode_transaction() {
		let body = r#"{
			"jsonrpc": "2.0",
			"id": 1,
			"result": {
				"blockHash": "0x1d59ff54b1eb26b013ce3cb5fc9dab3705b415a67127a003c3e61eb445bb8df2",
				"blockNumber": "0x5daf3b",
				"from": "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d",
				"hash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
				"input": "0x68656c6c6f21",
				"value": "0xf3dbb76162000"
			}
		}"#;

		let envelope: Envelope<RemoteTransaction> = serde_json::from_str(body).unwrap();
		let tx = envelope.result;
		assert_eq!(tx.block_number, Quantity(0x5daf3b));
		assert_eq!(tx.from_address, "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d");
		assert_eq!(tx.input, "0x68656c6c6f21");
		assert!(tx.hash.is_some());
	}

	#[test]
	fn test_missing_transaction_is_rejected() {
		let body = r#"{"jsonrpc":"2.0","id":1,"result":null}"#;
		assert!(serde_json::from_str::<Envelope<RemoteTransaction>>(body).is_err());
	}

	#[test]
	fn test_pending_transaction_is_rejected() {
		let body = r#"{"result":{"blockNumber":null,"from":"0xsender","input":"0x"}}"#;
		assert!(serde_json::from_str::<Envelope<RemoteTransaction>>(body).is_err());
	}

	#[test]
	fn test_explorer_error_body_is_rejected() {
		let body = r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#;
		assert!(serde_json::from_str::<Envelope<RemoteTransaction>>(body).is_err());

		let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid argument"}}"#;
		assert!(serde_json::from_str::<Envelope<Quantity>>(body).is_err());
	}

	#[test]
	fn test_decode_block_time() {
		let body = r#"{"result":{"number":"0x64","timestamp":"0x5f5e100","transactions":[]}}"#;
		let block = serde_json::from_str::<Envelope<RemoteBlock>>(body).unwrap().result;

		assert_eq!(block.number, Some(Quantity(100)));
		assert_eq!(
			block.timestamp,
			DateTime::from_timestamp_millis(100_000_000 * 1000).unwrap()
		);
	}

	#[test]
	fn test_invalid_block_time_is_rejected() {
		let body = r#"{"result":{"timestamp":"not-hex"}}"#;
		assert!(serde_json::from_str::<Envelope<RemoteBlock>>(body).is_err());

		let body = r#"{"result":{"timestamp":"0xffffffffffffffff"}}"#;
		assert!(serde_json::from_str::<Envelope<RemoteBlock>>(body).is_err());
	}

	#[test]
	fn test_quantity_forms() {
		let number: Envelope<Quantity> = serde_json::from_str(r#"{"result":106}"#).unwrap();
		let decimal: Envelope<Quantity> = serde_json::from_str(r#"{"result":"106"}"#).unwrap();
		let hex: Envelope<Quantity> = serde_json::from_str(r#"{"result":"0x6a"}"#).unwrap();

		assert_eq!(number.result.value(), 106);
		assert_eq!(decimal.result.value(), 106);
		assert_eq!(hex.result.value(), 106);

		assert!(serde_json::from_str::<Envelope<Quantity>>(r#"{"result":-1}"#).is_err());
		assert!(serde_json::from_str::<Envelope<Quantity>>(r#"{"result":1.5}"#).is_err());
	}
}
