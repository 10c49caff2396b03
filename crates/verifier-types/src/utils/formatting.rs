//! String formatting utilities.

/// Truncates an identifier for log output.
///
/// Shows the first 10 characters followed by ".." for longer strings, which
/// keeps the `0x` prefix plus 8 hex digits of a transaction hash.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(10) {
		Some((end, _)) => format!("{}..", &id[..end]),
		None => id.to_string(),
	}
}

/// Strips the literal `0x` prefix from an anchored payload.
///
/// Only the lowercase form is recognised; any other string is returned
/// unchanged.
pub fn cleanup_remote_hash(remote_hash: &str) -> &str {
	remote_hash.strip_prefix("0x").unwrap_or(remote_hash)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("0x12345678"), "0x12345678");
		assert_eq!(truncate_id("0x123456789"), "0x12345678..");
		assert_eq!(truncate_id(""), "");
	}

	#[test]
	fn test_cleanup_strips_prefix() {
		assert_eq!(cleanup_remote_hash("0xdeadbeef"), "deadbeef");
		assert_eq!(cleanup_remote_hash("0x"), "");
		// Only one prefix is removed
		assert_eq!(cleanup_remote_hash("0x0xabc"), "0xabc");
	}

	#[test]
	fn test_cleanup_preserves_unprefixed() {
		assert_eq!(cleanup_remote_hash("deadbeef"), "deadbeef");
		assert_eq!(cleanup_remote_hash(""), "");
		// Uppercase prefix is not the anchoring convention
		assert_eq!(cleanup_remote_hash("0Xdeadbeef"), "0Xdeadbeef");
	}

	#[test]
	fn test_cleanup_is_idempotent_on_stripped_payloads() {
		for input in ["0xdeadbeef", "deadbeef", ""] {
			let once = cleanup_remote_hash(input);
			assert_eq!(cleanup_remote_hash(once), once, "input: {input}");
		}
	}
}
