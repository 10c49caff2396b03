//! Configuration loader for multi-file configurations.
//!
//! A configuration file may pull in other files through an `include` entry.
//! Included files are merged at the top level, and a section may only be
//! defined by one file.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Loads a configuration file together with the files it includes.
pub struct ConfigLoader {
	/// Directory relative includes are resolved against.
	base_path: PathBuf,
	/// Canonical paths already read, to stop include cycles.
	loaded_files: HashSet<PathBuf>,
	/// File that defined each top-level section, for error reporting.
	section_sources: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads and validates a configuration file and all of its includes.
	pub async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let config_path = self.resolve_path(config_path)?;
		let content = self.load_file(&config_path).await?;
		let mut root: toml::Value = toml::from_str(&content)?;

		let includes = extract_includes(&root)?;
		if includes.is_empty() {
			return content.parse();
		}

		if let Some(table) = root.as_table_mut() {
			table.remove("include");
		}
		self.record_sections(&root, &config_path)?;

		for include in includes {
			let include_path = self.resolve_path(&include)?;
			let include_content = self.load_file(&include_path).await?;
			let include_toml: toml::Value = toml::from_str(&include_content)?;
			self.record_sections(&include_toml, &include_path)?;

			if let (Some(root_table), Some(include_table)) =
				(root.as_table_mut(), include_toml.as_table())
			{
				for (key, value) in include_table {
					root_table.insert(key.clone(), value.clone());
				}
			}
			tracing::debug!("Merged configuration from {}", include_path.display());
		}

		let combined = toml::to_string(&root).map_err(|e| {
			ConfigError::Parse(format!("Failed to serialize combined config: {}", e))
		})?;
		combined.parse()
	}

	/// Reads a file once, resolving environment variables.
	async fn load_file(&mut self, path: &Path) -> Result<String, ConfigError> {
		let canonical_path = path.canonicalize().map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;

		if !self.loaded_files.insert(canonical_path.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include detected: {} was already loaded",
				canonical_path.display()
			)));
		}

		let content = tokio::fs::read_to_string(path).await?;
		resolve_env_vars(&content)
	}

	/// Registers the top-level sections of `toml`, rejecting duplicates.
	fn record_sections(&mut self, toml: &toml::Value, source: &Path) -> Result<(), ConfigError> {
		let Some(table) = toml.as_table() else {
			return Ok(());
		};

		for key in table.keys() {
			if let Some(existing) = self.section_sources.get(key) {
				return Err(ConfigError::Validation(format!(
					"Duplicate section '{}' found in {} and {}. \
					Each top-level section must be unique across all configuration files.",
					key,
					existing.display(),
					source.display()
				)));
			}
			self.section_sources.insert(key.clone(), source.to_path_buf());
		}

		Ok(())
	}

	fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		let path = path.as_ref();
		let resolved = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_path.join(path)
		};

		if !resolved.exists() {
			return Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", resolved.display()),
			)));
		}

		Ok(resolved)
	}
}

/// Reads the `include` entry, which may be a string or an array of strings.
fn extract_includes(toml: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	match toml.get("include") {
		None => Ok(Vec::new()),
		Some(toml::Value::String(path)) => Ok(vec![PathBuf::from(path)]),
		Some(toml::Value::Array(items)) => items
			.iter()
			.map(|item| {
				item.as_str().map(PathBuf::from).ok_or_else(|| {
					ConfigError::Validation("Include array must contain only strings".into())
				})
			})
			.collect(),
		Some(_) => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;
	use verifier_types::Network;

	#[tokio::test]
	async fn test_single_file_config() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("config.toml");

		fs::write(
			&config_path,
			r#"
[explorer]
min_confirmations = 12
timeout_seconds = 10

[explorer.networks.mainnet]
base_url = "https://api.etherscan.io/api?module=proxy"
"#,
		)
		.unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load_config(&config_path).await.unwrap();

		assert_eq!(config.explorer.min_confirmations, 12);
		assert_eq!(config.explorer.timeout_seconds, 10);
	}

	#[tokio::test]
	async fn test_config_with_include() {
		let temp_dir = TempDir::new().unwrap();

		fs::write(
			temp_dir.path().join("main.toml"),
			r#"
include = "explorer.toml"
"#,
		)
		.unwrap();
		fs::write(
			temp_dir.path().join("explorer.toml"),
			r#"
[explorer]
min_confirmations = 6

[explorer.networks.testnet]
base_url = "https://api-ropsten.etherscan.io/api?module=proxy"
"#,
		)
		.unwrap();

		let config = Config::from_file(temp_dir.path().join("main.toml"))
			.await
			.unwrap();

		assert_eq!(config.explorer.min_confirmations, 6);
		assert!(config.explorer.networks.contains_key(&Network::Testnet));
	}

	#[tokio::test]
	async fn test_duplicate_section_error() {
		let temp_dir = TempDir::new().unwrap();

		fs::write(
			temp_dir.path().join("main.toml"),
			r#"
include = ["duplicate.toml"]

[explorer.networks.mainnet]
base_url = "https://api.etherscan.io/api?module=proxy"
"#,
		)
		.unwrap();
		fs::write(
			temp_dir.path().join("duplicate.toml"),
			r#"
[explorer]
min_confirmations = 3
"#,
		)
		.unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load_config("main.toml").await;

		let error_msg = result.unwrap_err().to_string();
		assert!(error_msg.contains("Duplicate section 'explorer'"));
	}

	#[tokio::test]
	async fn test_self_include_detection() {
		let temp_dir = TempDir::new().unwrap();

		fs::write(
			temp_dir.path().join("self.toml"),
			r#"
include = ["self.toml"]

[explorer.networks.mainnet]
base_url = "https://api.etherscan.io/api?module=proxy"
"#,
		)
		.unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load_config("self.toml").await;

		let error_msg = result.unwrap_err().to_string();
		assert!(error_msg.contains("already loaded"));
	}

	#[tokio::test]
	async fn test_missing_file() {
		let temp_dir = TempDir::new().unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load_config("absent.toml").await;

		assert!(matches!(result, Err(ConfigError::Io(_))));
	}
}
