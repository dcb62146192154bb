//! Configuration builder for tests and local development.

use crate::{AccountConfig, ApprovalConfig, ClientConfig, Config, DeliveryConfig};
use raffle_types::{ContractAddresses, NetworkOverride};
use std::collections::HashMap;

/// First development key of Anvil and Hardhat.
pub const DEV_PRIVATE_KEY: &str =
	"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Builds a `Config` against a local development chain.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	chain_id: u64,
	private_key: String,
	min_confirmations: u64,
	approval: ApprovalConfig,
	networks: HashMap<u64, NetworkOverride>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Starts from chain 31337 at `http://localhost:8545` with the Anvil key.
	pub fn new() -> Self {
		let mut networks = HashMap::new();
		networks.insert(
			31337,
			NetworkOverride {
				name: Some("Anvil".to_string()),
				rpc_url: Some("http://localhost:8545".to_string()),
				explorer: None,
				contracts: ContractAddresses::default(),
			},
		);

		Self {
			chain_id: 31337,
			private_key: DEV_PRIVATE_KEY.to_string(),
			min_confirmations: 1,
			approval: ApprovalConfig::default(),
			networks,
		}
	}

	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = chain_id;
		self
	}

	pub fn private_key(mut self, private_key: impl Into<String>) -> Self {
		self.private_key = private_key.into();
		self
	}

	pub fn min_confirmations(mut self, confirmations: u64) -> Self {
		self.min_confirmations = confirmations;
		self
	}

	pub fn approval(mut self, approval: ApprovalConfig) -> Self {
		self.approval = approval;
		self
	}

	/// Sets the deployed contracts of a network, adding it if unknown.
	pub fn contracts(mut self, chain_id: u64, contracts: ContractAddresses) -> Self {
		self.networks.entry(chain_id).or_default().contracts = contracts;
		self
	}

	pub fn build(self) -> Config {
		Config {
			client: ClientConfig {
				chain_id: self.chain_id,
			},
			account: AccountConfig {
				private_key: self.private_key.into(),
			},
			delivery: DeliveryConfig {
				min_confirmations: self.min_confirmations,
				..DeliveryConfig::default()
			},
			approval: self.approval,
			networks: self.networks,
		}
	}
}
