//! Network registry for multi-chain raffle operations.
//!
//! This module maps chain identifiers to their RPC endpoint, block explorer and
//! deployed raffle contract addresses. A built-in table covers every chain the
//! raffle contracts target; configuration may override any entry or add new
//! ones. Lookups never fall back to a default network: an unknown chain id is
//! reported as [`RegistryError::UnsupportedNetwork`].

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// Errors returned by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
	/// The chain id is not present in the registry.
	#[error("Unsupported network: chain {0}")]
	UnsupportedNetwork(u64),
	/// The chain is known but the contract role has no deployed address.
	#[error("{role} address not configured for chain {chain_id}")]
	MissingContract { chain_id: u64, role: ContractRole },
	/// A configured network that is not built in lacks a required field.
	#[error("Network {chain_id} is not built in and must set {field}")]
	IncompleteNetwork { chain_id: u64, field: &'static str },
}

/// Logical role of a deployed raffle contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRole {
	RaffleManager,
	RaffleDeployer,
	RevenueManager,
	NftFactory,
}

impl fmt::Display for ContractRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ContractRole::RaffleManager => "RaffleManager",
			ContractRole::RaffleDeployer => "RaffleDeployer",
			ContractRole::RevenueManager => "RevenueManager",
			ContractRole::NftFactory => "NFTFactory",
		};
		f.write_str(name)
	}
}

/// Deployed contract addresses of one network, keyed by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub raffle_manager: Option<Address>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub raffle_deployer: Option<Address>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub revenue_manager: Option<Address>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nft_factory: Option<Address>,
}

impl ContractAddresses {
	/// Returns the address deployed for `role`, if any.
	pub fn get(&self, role: ContractRole) -> Option<Address> {
		match role {
			ContractRole::RaffleManager => self.raffle_manager,
			ContractRole::RaffleDeployer => self.raffle_deployer,
			ContractRole::RevenueManager => self.revenue_manager,
			ContractRole::NftFactory => self.nft_factory,
		}
	}

	/// Overlays every address set in `other` on top of `self`.
	pub fn merge(&mut self, other: &ContractAddresses) {
		self.raffle_manager = other.raffle_manager.or(self.raffle_manager);
		self.raffle_deployer = other.raffle_deployer.or(self.raffle_deployer);
		self.revenue_manager = other.revenue_manager.or(self.revenue_manager);
		self.nft_factory = other.nft_factory.or(self.nft_factory);
	}

	/// Iterates over the configured roles and their addresses.
	pub fn iter(&self) -> impl Iterator<Item = (ContractRole, Address)> + '_ {
		[
			ContractRole::RaffleManager,
			ContractRole::RaffleDeployer,
			ContractRole::RevenueManager,
			ContractRole::NftFactory,
		]
		.into_iter()
		.filter_map(move |role| self.get(role).map(|address| (role, address)))
	}
}

/// Configuration for a single blockchain network.
///
/// # Fields
///
/// * `name` - Display name of the network
/// * `rpc_url` - The HTTP(S) RPC endpoint for blockchain interaction
/// * `explorer` - Base URL of the block explorer
/// * `contracts` - Deployed raffle contracts on this network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
	pub name: String,
	pub rpc_url: String,
	pub explorer: String,
	#[serde(default)]
	pub contracts: ContractAddresses,
}

impl NetworkConfig {
	/// Returns the explorer link for a transaction hash.
	pub fn tx_url(&self, tx_hash: &str) -> String {
		format!("{}/tx/{}", self.explorer.trim_end_matches('/'), tx_hash)
	}
}

/// Partial network entry as written in configuration files.
///
/// Fields left unset keep the built-in value. Networks that are not built in
/// must provide at least `name` and `rpc_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkOverride {
	pub name: Option<String>,
	pub rpc_url: Option<String>,
	pub explorer: Option<String>,
	#[serde(default)]
	pub contracts: ContractAddresses,
}

/// Built-in networks: (chain id, name, rpc url, explorer).
const BUILTIN_NETWORKS: &[(u64, &str, &str, &str)] = &[
	(1, "Ethereum Mainnet", "https://ethereum-rpc.publicnode.com", "https://etherscan.io"),
	(10, "OP Mainnet", "https://mainnet.optimism.io", "https://optimistic.etherscan.io"),
	(56, "BNB Smart Chain", "https://bsc.blockrazor.xyz", "https://bscscan.com"),
	(
		97,
		"BNB Smart Chain Testnet",
		"https://bsc-testnet-rpc.publicnode.com",
		"https://testnet.bscscan.com",
	),
	(
		43113,
		"Avalanche Fuji Testnet",
		"https://avalanche-fuji.drpc.org",
		"https://testnet.snowscan.xyz",
	),
	(43114, "Avalanche C-Chain", "https://avalanche.drpc.org", "https://snowscan.xyz"),
	(8453, "Base Mainnet", "https://base.drpc.org", "https://basescan.org"),
	(
		84532,
		"Base Sepolia",
		"https://base-sepolia-rpc.publicnode.com",
		"https://sepolia.basescan.org",
	),
	(11155111, "Ethereum Sepolia", "https://sepolia.infura.io", "https://sepolia.etherscan.io"),
	(
		11155420,
		"OP Sepolia Testnet",
		"https://sepolia.optimism.io",
		"https://sepolia-optimism.etherscan.io",
	),
	(2020, "Ronin Mainnet", "https://ronin.drpc.org", "https://app.roninchain.com"),
	(
		2021,
		"Ronin Saigon Testnet",
		"https://saigon-testnet.roninchain.com/rpc",
		"https://saigon-app.roninchain.com/explorer",
	),
	(42161, "Arbitrum One", "https://arbitrum.drpc.org", "https://arbiscan.io"),
	(
		421614,
		"Arbitrum Sepolia",
		"https://endpoints.omniatech.io/v1/arbitrum/sepolia/public",
		"https://sepolia.arbiscan.io",
	),
];

/// Immutable lookup table from chain id to [`NetworkConfig`].
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
	networks: BTreeMap<u64, NetworkConfig>,
}

impl NetworkRegistry {
	/// Returns the built-in registry.
	///
	/// Built-in entries carry no contract addresses; those come from
	/// configuration.
	pub fn builtin() -> Self {
		let networks = BUILTIN_NETWORKS
			.iter()
			.map(|(chain_id, name, rpc_url, explorer)| {
				(
					*chain_id,
					NetworkConfig {
						name: name.to_string(),
						rpc_url: rpc_url.to_string(),
						explorer: explorer.to_string(),
						contracts: ContractAddresses::default(),
					},
				)
			})
			.collect();

		Self { networks }
	}

	/// Applies configured overrides on top of this registry.
	///
	/// Set fields replace the existing values and contract addresses are
	/// merged per role.
	pub fn with_overrides(
		mut self,
		overrides: &HashMap<u64, NetworkOverride>,
	) -> Result<Self, RegistryError> {
		for (chain_id, entry) in overrides {
			match self.networks.get_mut(chain_id) {
				Some(existing) => {
					if let Some(name) = &entry.name {
						existing.name = name.clone();
					}
					if let Some(rpc_url) = &entry.rpc_url {
						existing.rpc_url = rpc_url.clone();
					}
					if let Some(explorer) = &entry.explorer {
						existing.explorer = explorer.clone();
					}
					existing.contracts.merge(&entry.contracts);
				},
				None => {
					let name = entry.name.clone().ok_or(RegistryError::IncompleteNetwork {
						chain_id: *chain_id,
						field: "name",
					})?;
					let rpc_url =
						entry
							.rpc_url
							.clone()
							.ok_or(RegistryError::IncompleteNetwork {
								chain_id: *chain_id,
								field: "rpc_url",
							})?;
					self.networks.insert(
						*chain_id,
						NetworkConfig {
							name,
							rpc_url,
							explorer: entry.explorer.clone().unwrap_or_default(),
							contracts: entry.contracts.clone(),
						},
					);
				},
			}
		}

		Ok(self)
	}

	/// Looks up the configuration of a chain.
	pub fn lookup(&self, chain_id: u64) -> Option<&NetworkConfig> {
		self.networks.get(&chain_id)
	}

	/// Resolves the address of a contract role on a chain.
	pub fn contract(&self, chain_id: u64, role: ContractRole) -> Result<Address, RegistryError> {
		let network = self
			.lookup(chain_id)
			.ok_or(RegistryError::UnsupportedNetwork(chain_id))?;

		network
			.contracts
			.get(role)
			.ok_or(RegistryError::MissingContract { chain_id, role })
	}

	/// Iterates over all networks ordered by chain id.
	pub fn iter(&self) -> impl Iterator<Item = (u64, &NetworkConfig)> {
		self.networks.iter().map(|(chain_id, network)| (*chain_id, network))
	}
}

/// Deserializes a table keyed by chain id.
///
/// TOML does not support numeric table keys, so chain ids arrive as strings
/// and are converted to `u64` here.
///
/// # Errors
///
/// Returns a deserialization error if a key cannot be parsed as a u64 or an
/// entry is malformed.
pub fn deserialize_chain_map<'de, D, T>(deserializer: D) -> Result<HashMap<u64, T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	let string_map: HashMap<String, T> = HashMap::deserialize(deserializer)?;
	let mut result = HashMap::with_capacity(string_map.len());

	for (key, value) in string_map {
		let chain_id = key
			.parse::<u64>()
			.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", key, e)))?;
		result.insert(chain_id, value);
	}

	Ok(result)
}
