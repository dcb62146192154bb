//! Wiring of the raffle services from configuration.

use crate::approval::ApprovalWorkflow;
use crate::browse::RaffleBrowser;
use crate::submission::RaffleSubmitter;
use alloy_primitives::Address;
use raffle_account::{create_account, AccountError, AccountService};
use raffle_config::{ApprovalConfig, Config, ConfigError};
use raffle_delivery::{create_http_delivery, DeliveryError, DeliveryService, DeliverySettings};
use raffle_types::{ContractRole, NetworkConfig, NetworkRegistry, RegistryError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building a [`RaffleClient`].
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),
	#[error("Account error: {0}")]
	Account(#[from] AccountError),
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
	#[error("Unsupported network: chain {0}")]
	UnsupportedNetwork(u64),
}

/// All raffle services for the configured chain and signer.
pub struct RaffleClient {
	chain_id: u64,
	registry: Arc<NetworkRegistry>,
	account: Arc<AccountService>,
	approvals: Arc<ApprovalWorkflow>,
	submitter: RaffleSubmitter,
	browser: RaffleBrowser,
}

impl RaffleClient {
	/// Builds the client for `config.client.chain_id` with an HTTP provider.
	pub fn from_config(config: &Config) -> Result<Self, ClientError> {
		let chain_id = config.client.chain_id;
		let registry = Arc::new(config.registry()?);
		let network = registry
			.lookup(chain_id)
			.ok_or(ClientError::UnsupportedNetwork(chain_id))?;

		let account = Arc::new(AccountService::new(create_account(
			&config.account.private_key,
		)?));

		let settings = DeliverySettings {
			poll_interval: config.delivery.poll_interval(),
			confirmation_timeout: config.delivery.confirmation_timeout(),
		};
		let provider = create_http_delivery(chain_id, network, &account.get_private_key(), settings)?;

		let mut providers = HashMap::new();
		providers.insert(chain_id, provider);
		let delivery = Arc::new(DeliveryService::new(
			providers,
			config.delivery.min_confirmations,
		));

		tracing::info!(chain_id, network = %network.name, "Raffle client ready");
		Ok(Self::from_parts(
			chain_id,
			registry,
			account,
			delivery,
			config.approval.clone(),
		))
	}

	/// Builds the client from already constructed services.
	pub fn from_parts(
		chain_id: u64,
		registry: Arc<NetworkRegistry>,
		account: Arc<AccountService>,
		delivery: Arc<DeliveryService>,
		approval: ApprovalConfig,
	) -> Self {
		let token_decimals = approval.token_decimals;
		let approvals = Arc::new(ApprovalWorkflow::new(
			chain_id,
			delivery.clone(),
			account.clone(),
			approval,
		));
		let submitter = RaffleSubmitter::new(
			chain_id,
			registry.clone(),
			delivery.clone(),
			account.clone(),
			approvals.clone(),
			token_decimals,
		);
		let browser = RaffleBrowser::new(chain_id, registry.clone(), delivery);

		Self {
			chain_id,
			registry,
			account,
			approvals,
			submitter,
			browser,
		}
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	pub fn registry(&self) -> &NetworkRegistry {
		&self.registry
	}

	/// The configured network; always present once the client is built
	/// through [`RaffleClient::from_config`].
	pub fn network(&self) -> Option<&NetworkConfig> {
		self.registry.lookup(self.chain_id)
	}

	/// Address of the `RaffleDeployer`, the spender of every prize approval.
	pub fn deployer(&self) -> Result<Address, RegistryError> {
		self.registry
			.contract(self.chain_id, ContractRole::RaffleDeployer)
	}

	/// Address of the signer; raffles and approvals are sent from it.
	pub async fn creator(&self) -> Result<Address, AccountError> {
		self.account.get_address().await
	}

	pub fn approvals(&self) -> &ApprovalWorkflow {
		&self.approvals
	}

	pub fn submitter(&self) -> &RaffleSubmitter {
		&self.submitter
	}

	pub fn browser(&self) -> &RaffleBrowser {
		&self.browser
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use raffle_config::builders::ConfigBuilder;
	use raffle_types::ContractAddresses;

	#[tokio::test]
	async fn test_from_config_for_local_chain() {
		let config = ConfigBuilder::new()
			.contracts(
				31337,
				ContractAddresses {
					raffle_deployer: Some(address!("5FbDB2315678afecb367f032d93F642f64180aa3")),
					..ContractAddresses::default()
				},
			)
			.build();

		let client = RaffleClient::from_config(&config).unwrap();

		assert_eq!(client.chain_id(), 31337);
		assert_eq!(client.network().unwrap().name, "Anvil");
		assert_eq!(
			client.deployer().unwrap(),
			address!("5FbDB2315678afecb367f032d93F642f64180aa3")
		);
		assert_eq!(
			client.creator().await.unwrap(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
	}

	#[tokio::test]
	async fn test_unknown_chain_rejected() {
		let config = ConfigBuilder::new().chain_id(424242).build();

		assert!(matches!(
			RaffleClient::from_config(&config),
			Err(ClientError::UnsupportedNetwork(424242))
		));
	}

	#[tokio::test]
	async fn test_bad_key_rejected() {
		let config = ConfigBuilder::new().private_key("0x1234").build();

		assert!(matches!(
			RaffleClient::from_config(&config),
			Err(ClientError::Account(AccountError::InvalidKey(_)))
		));
	}
}
