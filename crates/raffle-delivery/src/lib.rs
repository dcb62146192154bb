//! Transaction delivery module for the raffle client.
//!
//! This module handles contract reads, event log queries, and the submission
//! and confirmation of transactions. Each [`DeliveryInterface`] serves one
//! chain; [`DeliveryService`] routes requests to the right one by chain id.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use raffle_types::{EventLog, LogQuery, Transaction, TransactionHash, TransactionReceipt};
use std::collections::HashMap;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

pub use implementations::evm::alloy::{create_http_delivery, AlloyDelivery, DeliverySettings};

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Transport-level failure: connection refused, bad URL, malformed response.
	#[error("Network error: {0}")]
	Network(String),
	/// JSON-RPC error returned by the node, typically a revert during gas
	/// estimation or `eth_call`.
	#[error("{message}")]
	Rpc {
		message: String,
		/// Raw `data` member of the error object, if any.
		data: Option<String>,
	},
	/// A contract returned data that could not be decoded.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// Error that occurs when a transaction execution fails.
	#[error("Transaction failed: {0}")]
	TransactionFailed(String),
	/// The transaction did not reach the required depth in time.
	#[error("Timeout waiting for {confirmations} confirmations of {hash} after {seconds} seconds")]
	Timeout {
		hash: TransactionHash,
		confirmations: u64,
		seconds: u64,
	},
	/// No provider is configured for the chain.
	#[error("No provider available for chain {0}")]
	NoProviderAvailable(u64),
}

/// Trait defining the interface for transaction delivery providers.
///
/// An implementation is bound to a single chain and a single signer.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Signs and broadcasts a transaction, returning its hash.
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError>;

	/// Waits until the transaction is mined and buried under `confirmations`
	/// blocks (the inclusion block counts as one).
	///
	/// A reverted transaction is returned as soon as it is mined, with
	/// `success = false`.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError>;

	/// Executes a read-only call against the latest block.
	async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes, DeliveryError>;

	/// Reads the ERC-20 allowance of `spender` over `owner`'s tokens.
	async fn get_allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, DeliveryError>;

	/// Reads the address approved to move an ERC-721 token.
	async fn get_approved(&self, collection: Address, token_id: U256)
		-> Result<Address, DeliveryError>;

	/// Reads whether `operator` may move all of `owner`'s tokens in a
	/// collection.
	async fn is_approved_for_all(
		&self,
		collection: Address,
		owner: Address,
		operator: Address,
	) -> Result<bool, DeliveryError>;

	/// Returns the latest block number.
	async fn get_block_number(&self) -> Result<u64, DeliveryError>;

	/// Runs a raw log query.
	async fn get_logs(&self, query: &LogQuery) -> Result<Vec<EventLog>, DeliveryError>;
}

/// Service that manages transaction delivery across blockchain networks.
///
/// Routes every request to the provider registered for its chain id and
/// applies the configured confirmation depth.
pub struct DeliveryService {
	providers: HashMap<u64, Box<dyn DeliveryInterface>>,
	/// Default number of confirmations required for transactions.
	min_confirmations: u64,
}

impl DeliveryService {
	pub fn new(providers: HashMap<u64, Box<dyn DeliveryInterface>>, min_confirmations: u64) -> Self {
		Self {
			providers,
			min_confirmations,
		}
	}

	fn provider(&self, chain_id: u64) -> Result<&dyn DeliveryInterface, DeliveryError> {
		self.providers
			.get(&chain_id)
			.map(|provider| provider.as_ref())
			.ok_or(DeliveryError::NoProviderAvailable(chain_id))
	}

	/// Submits a transaction on the chain named by `tx.chain_id`.
	pub async fn deliver(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		self.provider(tx.chain_id)?.submit(tx).await
	}

	/// Waits for a transaction with an explicit confirmation depth.
	pub async fn confirm(
		&self,
		chain_id: u64,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		self.provider(chain_id)?
			.wait_for_confirmation(hash, confirmations)
			.await
	}

	/// Waits for a transaction with the configured confirmation depth.
	pub async fn confirm_with_default(
		&self,
		chain_id: u64,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, DeliveryError> {
		self.confirm(chain_id, hash, self.min_confirmations).await
	}

	/// Submits a transaction and waits for the configured confirmation depth.
	pub async fn deliver_and_confirm(
		&self,
		tx: Transaction,
	) -> Result<TransactionReceipt, DeliveryError> {
		let chain_id = tx.chain_id;
		let hash = self.deliver(tx).await?;
		tracing::debug!(chain_id, tx_hash = %hash, "Waiting for confirmation");
		self.confirm_with_default(chain_id, &hash).await
	}

	pub async fn call(
		&self,
		chain_id: u64,
		to: Address,
		data: Vec<u8>,
	) -> Result<Bytes, DeliveryError> {
		self.provider(chain_id)?.call(to, data).await
	}

	pub async fn get_allowance(
		&self,
		chain_id: u64,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, DeliveryError> {
		self.provider(chain_id)?
			.get_allowance(token, owner, spender)
			.await
	}

	pub async fn get_approved(
		&self,
		chain_id: u64,
		collection: Address,
		token_id: U256,
	) -> Result<Address, DeliveryError> {
		self.provider(chain_id)?
			.get_approved(collection, token_id)
			.await
	}

	pub async fn is_approved_for_all(
		&self,
		chain_id: u64,
		collection: Address,
		owner: Address,
		operator: Address,
	) -> Result<bool, DeliveryError> {
		self.provider(chain_id)?
			.is_approved_for_all(collection, owner, operator)
			.await
	}

	pub async fn get_block_number(&self, chain_id: u64) -> Result<u64, DeliveryError> {
		self.provider(chain_id)?.get_block_number().await
	}

	pub async fn get_logs(
		&self,
		chain_id: u64,
		query: &LogQuery,
	) -> Result<Vec<EventLog>, DeliveryError> {
		self.provider(chain_id)?.get_logs(query).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::B256;
	use mockall::predicate::eq;

	fn receipt(hash: TransactionHash) -> TransactionReceipt {
		TransactionReceipt {
			hash,
			block_number: 42,
			success: true,
		}
	}

	#[tokio::test]
	async fn test_routes_by_chain_id() {
		let mut base = MockDeliveryInterface::new();
		base.expect_get_block_number().returning(|| Ok(100));
		let mut optimism = MockDeliveryInterface::new();
		optimism.expect_get_block_number().returning(|| Ok(200));

		let mut providers: HashMap<u64, Box<dyn DeliveryInterface>> = HashMap::new();
		providers.insert(8453, Box::new(base));
		providers.insert(10, Box::new(optimism));
		let service = DeliveryService::new(providers, 1);

		assert_eq!(service.get_block_number(8453).await.unwrap(), 100);
		assert_eq!(service.get_block_number(10).await.unwrap(), 200);
		assert!(matches!(
			service.get_block_number(1).await,
			Err(DeliveryError::NoProviderAvailable(1))
		));
	}

	#[tokio::test]
	async fn test_deliver_and_confirm_uses_default_depth() {
		let hash = TransactionHash(B256::repeat_byte(0xab));

		let mut provider = MockDeliveryInterface::new();
		provider
			.expect_submit()
			.times(1)
			.returning(move |_| Ok(hash));
		provider
			.expect_wait_for_confirmation()
			.with(eq(hash), eq(3))
			.times(1)
			.returning(|hash, _| Ok(receipt(*hash)));

		let mut providers: HashMap<u64, Box<dyn DeliveryInterface>> = HashMap::new();
		providers.insert(84532, Box::new(provider));
		let service = DeliveryService::new(providers, 3);

		let tx = Transaction::call(84532, Address::repeat_byte(1), vec![0x01]);
		let result = service.deliver_and_confirm(tx).await.unwrap();

		assert_eq!(result.hash, hash);
		assert!(result.success);
	}

	#[test]
	fn test_rpc_error_displays_node_message() {
		let err = DeliveryError::Rpc {
			message: "execution reverted: Raffle is not in pending state".into(),
			data: None,
		};

		assert_eq!(
			err.to_string(),
			"execution reverted: Raffle is not in pending state"
		);
	}
}
