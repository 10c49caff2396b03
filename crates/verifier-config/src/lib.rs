//! Configuration module for the transaction verifier.
//!
//! This module provides structures and utilities for managing verifier configuration.
//! It supports loading configuration from TOML files and validates that every
//! explorer endpoint and trust threshold is usable before a verification runs.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)
//!
//! Values may reference environment variables as `${VAR}` or `${VAR:-default}`,
//! which is the expected way to supply explorer API keys.

mod loader;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use verifier_types::Network;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message without echoing the whole input back
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the verifier.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Block explorer used to look up transactions.
	pub explorer: ExplorerConfig,
}

/// Configuration for the block explorer service.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
	/// Minimum number of blocks that must be mined on top of the block
	/// containing a transaction before its data is trusted.
	/// Defaults to 1 if not specified.
	#[serde(default = "default_min_confirmations")]
	pub min_confirmations: u64,
	/// Upper bound in seconds for a single explorer request.
	/// Defaults to 30 seconds if not specified.
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
	/// Explorer endpoint for each network, keyed by network name.
	#[serde(deserialize_with = "deserialize_endpoints")]
	pub networks: HashMap<Network, EndpointConfig>,
}

/// Explorer endpoint for a single network.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
	/// Base URL of the explorer API, including any fixed query such as
	/// `?module=proxy`. Actions are appended as further query parameters.
	pub base_url: String,
	/// Explorer API key appended as `apikey` to every request.
	#[serde(default)]
	pub api_key: Option<String>,
}

impl EndpointConfig {
	/// Returns the API key, treating an empty value as absent.
	///
	/// An unset `${VAR:-}` substitution leaves an empty string behind.
	pub fn resolved_api_key(&self) -> Option<&str> {
		self.api_key.as_deref().filter(|key| !key.trim().is_empty())
	}
}

fn default_min_confirmations() -> u64 {
	1
}

fn default_timeout_seconds() -> u64 {
	30
}

/// Deserializes the endpoint table, whose keys are network names.
///
/// TOML table keys are always strings, so each key is parsed into a
/// [`Network`] explicitly to get a readable error for unknown names.
fn deserialize_endpoints<'de, D>(
	deserializer: D,
) -> Result<HashMap<Network, EndpointConfig>, D::Error>
where
	D: Deserializer<'de>,
{
	let string_map: HashMap<String, EndpointConfig> = HashMap::deserialize(deserializer)?;
	let mut result = HashMap::new();

	for (key, value) in string_map {
		let network = key.parse::<Network>().map_err(serde::de::Error::custom)?;
		if result.insert(network, value).is_some() {
			return Err(serde::de::Error::custom(format!(
				"Network '{}' is configured more than once",
				network
			)));
		}
	}

	Ok(result)
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
		let file_name = path
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path.display())))?;

		let mut loader = loader::ConfigLoader::new(base_dir);
		loader.load_config(file_name).await
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// - At least one network endpoint is configured
	/// - Every base URL is an absolute http(s) URL
	/// - `min_confirmations` is within 1..=100
	/// - `timeout_seconds` is within 1..=300
	fn validate(&self) -> Result<(), ConfigError> {
		let explorer = &self.explorer;

		if explorer.networks.is_empty() {
			return Err(ConfigError::Validation(
				"At least one explorer network must be configured".into(),
			));
		}

		for (network, endpoint) in &explorer.networks {
			let base_url = endpoint.base_url.trim();
			if base_url.is_empty() {
				return Err(ConfigError::Validation(format!(
					"Network {} must have a base_url",
					network
				)));
			}
			if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
				return Err(ConfigError::Validation(format!(
					"Network {} base_url must start with http:// or https://, got '{}'",
					network, base_url
				)));
			}
		}

		if explorer.min_confirmations == 0 {
			return Err(ConfigError::Validation(
				"min_confirmations must be at least 1".into(),
			));
		}
		if explorer.min_confirmations > 100 {
			return Err(ConfigError::Validation(
				"min_confirmations cannot exceed 100".into(),
			));
		}

		if explorer.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"timeout_seconds must be greater than 0".into(),
			));
		}
		if explorer.timeout_seconds > 300 {
			return Err(ConfigError::Validation(
				"timeout_seconds cannot exceed 300 (5 minutes)".into(),
			));
		}

		Ok(())
	}
}

/// Parses a configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		tracing::debug!(
			"Parsed explorer configuration for {} network(s)",
			config.explorer.networks.len()
		);
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE_CONFIG: &str = r#"
[explorer]
min_confirmations = 6

[explorer.networks.mainnet]
base_url = "https://api.etherscan.io/api?module=proxy"

[explorer.networks.testnet]
base_url = "https://api-ropsten.etherscan.io/api?module=proxy"
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("VERIFIER_TEST_HOST", "localhost");
		std::env::set_var("VERIFIER_TEST_PORT", "8545");

		let input = "url = \"http://${VERIFIER_TEST_HOST}:${VERIFIER_TEST_PORT}/api\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"http://localhost:8545/api\"");

		std::env::remove_var("VERIFIER_TEST_HOST");
		std::env::remove_var("VERIFIER_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${VERIFIER_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");

		let input = "value = \"${VERIFIER_MISSING_VAR:-}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${VERIFIER_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("VERIFIER_MISSING_VAR"));
	}

	#[test]
	fn test_parse_full_config() {
		let config: Config = BASE_CONFIG.parse().unwrap();

		assert_eq!(config.explorer.min_confirmations, 6);
		assert_eq!(config.explorer.timeout_seconds, 30);
		assert_eq!(config.explorer.networks.len(), 2);
		assert_eq!(
			config.explorer.networks[&Network::Mainnet].base_url,
			"https://api.etherscan.io/api?module=proxy"
		);
		assert!(config.explorer.networks[&Network::Testnet]
			.resolved_api_key()
			.is_none());
	}

	#[test]
	fn test_defaults_applied() {
		let config: Config = r#"
[explorer.networks.ethmain]
base_url = "https://api.etherscan.io/api?module=proxy"
"#
		.parse()
		.unwrap();

		assert_eq!(config.explorer.min_confirmations, 1);
		assert_eq!(config.explorer.timeout_seconds, 30);
		assert!(config.explorer.networks.contains_key(&Network::Mainnet));
	}

	#[test]
	fn test_single_network_is_valid() {
		let config: Config = r#"
[explorer.networks.testnet]
base_url = "https://api-ropsten.etherscan.io/api?module=proxy"
"#
		.parse()
		.unwrap();

		assert_eq!(config.explorer.networks.len(), 1);
		assert!(!config.explorer.networks.contains_key(&Network::Mainnet));
	}

	#[test]
	fn test_api_key_from_env() {
		std::env::set_var("VERIFIER_TEST_API_KEY", "secret-key");

		let config: Config = r#"
[explorer.networks.mainnet]
base_url = "https://api.etherscan.io/api?module=proxy"
api_key = "${VERIFIER_TEST_API_KEY}"

[explorer.networks.testnet]
base_url = "https://api-ropsten.etherscan.io/api?module=proxy"
api_key = "${VERIFIER_UNSET_API_KEY:-}"
"#
		.parse()
		.unwrap();

		assert_eq!(
			config.explorer.networks[&Network::Mainnet].resolved_api_key(),
			Some("secret-key")
		);
		assert_eq!(
			config.explorer.networks[&Network::Testnet].resolved_api_key(),
			None
		);

		std::env::remove_var("VERIFIER_TEST_API_KEY");
	}

	#[test]
	fn test_unknown_network_rejected() {
		let result = Config::from_str(
			r#"
[explorer.networks.dogecoin]
base_url = "https://example.com/api"
"#,
		);

		let err = result.unwrap_err();
		assert!(err.to_string().contains("dogecoin"), "got: {}", err);
	}

	#[test]
	fn test_duplicate_network_alias_rejected() {
		let result = Config::from_str(
			r#"
[explorer.networks.mainnet]
base_url = "https://api.etherscan.io/api?module=proxy"

[explorer.networks.ethmain]
base_url = "https://api.etherscan.io/api?module=proxy"
"#,
		);

		let err = result.unwrap_err();
		assert!(err.to_string().contains("more than once"), "got: {}", err);
	}

	#[test]
	fn test_empty_networks_rejected() {
		let result = Config::from_str(
			r#"
[explorer]
min_confirmations = 6
networks = {}
"#,
		);

		let err = result.unwrap_err();
		assert!(err
			.to_string()
			.contains("At least one explorer network must be configured"));
	}

	#[test]
	fn test_invalid_base_url_rejected() {
		let result = Config::from_str(
			r#"
[explorer.networks.mainnet]
base_url = "ftp://api.etherscan.io/api"
"#,
		);

		let err = result.unwrap_err();
		assert!(err.to_string().contains("must start with http"));
	}

	#[test]
	fn test_min_confirmations_bounds() {
		let zero = BASE_CONFIG.replace("min_confirmations = 6", "min_confirmations = 0");
		let err = Config::from_str(&zero).unwrap_err();
		assert!(err.to_string().contains("at least 1"));

		let too_many = BASE_CONFIG.replace("min_confirmations = 6", "min_confirmations = 101");
		let err = Config::from_str(&too_many).unwrap_err();
		assert!(err.to_string().contains("cannot exceed 100"));
	}

	#[test]
	fn test_timeout_bounds() {
		let zero = BASE_CONFIG.replace("min_confirmations = 6", "timeout_seconds = 0");
		let err = Config::from_str(&zero).unwrap_err();
		assert!(err.to_string().contains("timeout_seconds must be greater than 0"));
	}
}
