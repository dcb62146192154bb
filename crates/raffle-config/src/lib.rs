//! Configuration module for the raffle client.
//!
//! This module provides structures and utilities for managing client
//! configuration. It supports loading configuration from TOML files and
//! validates every value before any network connection is made.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["networks.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)
//!
//! ## Environment Variables
//!
//! `${VAR}` and `${VAR:-default}` are substituted before parsing, which keeps
//! the signer key out of the file itself:
//!
//! ```toml
//! [account]
//! private_key = "${RAFFLE_PRIVATE_KEY}"
//! ```

#[cfg(feature = "testing")]
pub mod builders;
mod loader;

use raffle_types::{
	networks::deserialize_chain_map, NetworkOverride, NetworkRegistry, SecretString,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

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
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the raffle client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Which chain the client talks to.
	pub client: ClientConfig,
	/// Signer configuration.
	pub account: AccountConfig,
	/// Transaction submission and confirmation settings.
	#[serde(default)]
	pub delivery: DeliveryConfig,
	/// Approval workflow tuning.
	#[serde(default)]
	pub approval: ApprovalConfig,
	/// Per-chain overrides of the built-in network registry.
	#[serde(default, deserialize_with = "deserialize_chain_map")]
	pub networks: HashMap<u64, NetworkOverride>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	/// Chain id of the network raffles are created on.
	pub chain_id: u64,
}

/// Configuration for the local signer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Hex-encoded secp256k1 private key, with or without `0x`.
	pub private_key: SecretString,
}

/// Configuration for transaction delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
	/// Blocks a transaction must be buried under before it counts as confirmed.
	/// Defaults to 1.
	#[serde(default = "default_confirmations")]
	pub min_confirmations: u64,
	/// How often to poll for a receipt while waiting for confirmation.
	#[serde(default = "default_poll_interval_seconds")]
	pub poll_interval_seconds: u64,
	/// Upper bound on a single confirmation wait.
	#[serde(default = "default_confirmation_timeout_seconds")]
	pub confirmation_timeout_seconds: u64,
}

impl Default for DeliveryConfig {
	fn default() -> Self {
		Self {
			min_confirmations: default_confirmations(),
			poll_interval_seconds: default_poll_interval_seconds(),
			confirmation_timeout_seconds: default_confirmation_timeout_seconds(),
		}
	}
}

impl DeliveryConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_seconds)
	}

	pub fn confirmation_timeout(&self) -> Duration {
		Duration::from_secs(self.confirmation_timeout_seconds)
	}
}

fn default_confirmations() -> u64 {
	1
}

fn default_poll_interval_seconds() -> u64 {
	3
}

fn default_confirmation_timeout_seconds() -> u64 {
	300
}

/// Configuration for the token approval workflow.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApprovalConfig {
	/// Decimals assumed for ERC-20 prize tokens.
	#[serde(default = "default_token_decimals")]
	pub token_decimals: u8,
	/// How many recent blocks to scan for `Approval` events when the
	/// allowance read returns zero.
	#[serde(default = "default_log_scan_blocks")]
	pub log_scan_blocks: u64,
	/// Upper bound on waiting for a fresh approval to become visible.
	#[serde(default = "default_settle_timeout_ms")]
	pub settle_timeout_ms: u64,
	/// First retry interval of the visibility poll; grows exponentially.
	#[serde(default = "default_settle_initial_interval_ms")]
	pub settle_initial_interval_ms: u64,
}

impl Default for ApprovalConfig {
	fn default() -> Self {
		Self {
			token_decimals: default_token_decimals(),
			log_scan_blocks: default_log_scan_blocks(),
			settle_timeout_ms: default_settle_timeout_ms(),
			settle_initial_interval_ms: default_settle_initial_interval_ms(),
		}
	}
}

impl ApprovalConfig {
	pub fn settle_timeout(&self) -> Duration {
		Duration::from_millis(self.settle_timeout_ms)
	}

	pub fn settle_initial_interval(&self) -> Duration {
		Duration::from_millis(self.settle_initial_interval_ms)
	}
}

fn default_token_decimals() -> u8 {
	18
}

fn default_log_scan_blocks() -> u64 {
	1000
}

fn default_settle_timeout_ms() -> u64 {
	10_000
}

fn default_settle_initial_interval_ms() -> u64 {
	500
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
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

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures| {
		let var_name = &caps[1];
		match (std::env::var(var_name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| var_name.to_string());
				String::new()
			},
		}
	});

	match missing {
		Some(var_name) => Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			var_name
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	///
	/// Each top-level section must be unique across all configuration files.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Builds the network registry: built-in networks with the configured
	/// overrides applied.
	pub fn registry(&self) -> Result<NetworkRegistry, ConfigError> {
		NetworkRegistry::builtin()
			.with_overrides(&self.networks)
			.map_err(|e| ConfigError::Validation(e.to_string()))
	}

	/// Validates the configuration.
	///
	/// Checks the signer key is present, delivery and approval settings are
	/// within range, and network overrides produce a usable registry.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.account.private_key.is_empty() {
			return Err(ConfigError::Validation(
				"Account private_key cannot be empty".into(),
			));
		}

		let delivery = &self.delivery;
		if delivery.min_confirmations == 0 || delivery.min_confirmations > 100 {
			return Err(ConfigError::Validation(format!(
				"Delivery min_confirmations must be between 1 and 100, got {}",
				delivery.min_confirmations
			)));
		}
		if delivery.poll_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"Delivery poll_interval_seconds must be greater than 0".into(),
			));
		}
		if delivery.confirmation_timeout_seconds < delivery.poll_interval_seconds {
			return Err(ConfigError::Validation(
				"Delivery confirmation_timeout_seconds must be at least poll_interval_seconds"
					.into(),
			));
		}

		let approval = &self.approval;
		// 10^77 is the largest power of ten that fits in a uint256
		if approval.token_decimals > 77 {
			return Err(ConfigError::Validation(format!(
				"Approval token_decimals cannot exceed 77, got {}",
				approval.token_decimals
			)));
		}
		if approval.log_scan_blocks == 0 {
			return Err(ConfigError::Validation(
				"Approval log_scan_blocks must be greater than 0".into(),
			));
		}
		if approval.settle_initial_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"Approval settle_initial_interval_ms must be greater than 0".into(),
			));
		}
		if approval.settle_initial_interval_ms > approval.settle_timeout_ms {
			return Err(ConfigError::Validation(
				"Approval settle_initial_interval_ms cannot exceed settle_timeout_ms".into(),
			));
		}

		for (chain_id, network) in &self.networks {
			if let Some(rpc_url) = &network.rpc_url {
				if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
					return Err(ConfigError::Validation(format!(
						"Network {} rpc_url must be an http(s) URL, got '{}'",
						chain_id, rpc_url
					)));
				}
			}
		}
		self.registry()?;

		Ok(())
	}
}

/// Parses a TOML string into a validated `Config`, resolving environment
/// variables first.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use raffle_types::ContractRole;

	const MINIMAL: &str = r#"
[client]
chain_id = 84532

[account]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("RAFFLE_TEST_HOST", "localhost");
		std::env::set_var("RAFFLE_TEST_PORT", "8545");

		let input = "rpc_url = \"http://${RAFFLE_TEST_HOST}:${RAFFLE_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "rpc_url = \"http://localhost:8545\"");

		std::env::remove_var("RAFFLE_TEST_HOST");
		std::env::remove_var("RAFFLE_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${RAFFLE_MISSING_VAR:-fallback}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${RAFFLE_MISSING_VAR}\"");
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("RAFFLE_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = MINIMAL.parse().unwrap();

		assert_eq!(config.client.chain_id, 84532);
		assert_eq!(config.delivery.min_confirmations, 1);
		assert_eq!(config.delivery.poll_interval(), Duration::from_secs(3));
		assert_eq!(config.delivery.confirmation_timeout(), Duration::from_secs(300));
		assert_eq!(config.approval.token_decimals, 18);
		assert_eq!(config.approval.log_scan_blocks, 1000);
		assert_eq!(config.approval.settle_timeout(), Duration::from_secs(10));
		assert_eq!(
			config.approval.settle_initial_interval(),
			Duration::from_millis(500)
		);
		assert!(config.networks.is_empty());
	}

	#[test]
	fn test_private_key_from_env() {
		std::env::set_var(
			"RAFFLE_TEST_PRIVATE_KEY",
			"0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
		);

		let config: Config = r#"
[client]
chain_id = 1

[account]
private_key = "${RAFFLE_TEST_PRIVATE_KEY}"
"#
		.parse()
		.unwrap();

		assert_eq!(
			config.account.private_key.expose_secret(),
			"0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
		);
		assert!(!format!("{:?}", config).contains("59c6995e"));

		std::env::remove_var("RAFFLE_TEST_PRIVATE_KEY");
	}

	#[test]
	fn test_network_overrides() {
		let config: Config = format!(
			r#"{}
[networks.84532]
rpc_url = "http://localhost:8545"

[networks.84532.contracts]
raffle_deployer = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
raffle_manager = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"

[networks.31337]
name = "Anvil"
rpc_url = "http://localhost:8546"
"#,
			MINIMAL
		)
		.parse()
		.unwrap();

		let registry = config.registry().unwrap();
		assert_eq!(
			registry.lookup(84532).unwrap().rpc_url,
			"http://localhost:8545"
		);
		assert!(registry
			.contract(84532, ContractRole::RaffleDeployer)
			.is_ok());
		assert_eq!(registry.lookup(31337).unwrap().name, "Anvil");
	}

	#[test]
	fn test_invalid_confirmations_rejected() {
		let result = format!("{}\n[delivery]\nmin_confirmations = 0\n", MINIMAL).parse::<Config>();
		assert!(matches!(result, Err(ConfigError::Validation(_))));

		let result =
			format!("{}\n[delivery]\nmin_confirmations = 101\n", MINIMAL).parse::<Config>();
		assert!(result.unwrap_err().to_string().contains("between 1 and 100"));
	}

	#[test]
	fn test_empty_private_key_rejected() {
		let result = r#"
[client]
chain_id = 1

[account]
private_key = ""
"#
		.parse::<Config>();

		assert!(result.unwrap_err().to_string().contains("private_key"));
	}

	#[test]
	fn test_incomplete_custom_network_rejected() {
		let result = format!("{}\n[networks.31337]\nname = \"Anvil\"\n", MINIMAL).parse::<Config>();
		assert!(result.unwrap_err().to_string().contains("rpc_url"));
	}

	#[test]
	fn test_non_http_rpc_rejected() {
		let result =
			format!("{}\n[networks.1]\nrpc_url = \"ws://localhost:8546\"\n", MINIMAL).parse::<Config>();
		assert!(result.unwrap_err().to_string().contains("http(s)"));
	}

	#[test]
	fn test_invalid_chain_key_rejected() {
		let result =
			format!("{}\n[networks.mainnet]\nrpc_url = \"http://x\"\n", MINIMAL).parse::<Config>();
		assert!(matches!(result, Err(ConfigError::Parse(_))));
	}
}
