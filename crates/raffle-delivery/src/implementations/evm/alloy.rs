//! Transaction delivery over JSON-RPC using the Alloy library.
//!
//! [`AlloyDelivery`] wraps one HTTP provider with a local wallet. The wallet
//! signs everything sent through [`DeliveryInterface::submit`]; nonce, gas and
//! fee fields are filled by the provider's recommended fillers.

use crate::{DeliveryError, DeliveryInterface};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::{Filter, TransactionRequest};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use alloy_transport::TransportError;
use alloy_transport_http::Http;
use async_trait::async_trait;
use raffle_types::{
	contracts::{IERC1155, IERC20, IERC721},
	truncate_id, EventLog, LogQuery, NetworkConfig, SecretString, Transaction, TransactionHash,
	TransactionReceipt,
};
use std::sync::Arc;
use std::time::Duration;

/// Polling and timeout settings for confirmation waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliverySettings {
	pub poll_interval: Duration,
	pub confirmation_timeout: Duration,
}

impl Default for DeliverySettings {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_secs(3),
			confirmation_timeout: Duration::from_secs(300),
		}
	}
}

/// Alloy-based EVM delivery implementation for a single chain.
pub struct AlloyDelivery {
	chain_id: u64,
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	settings: DeliverySettings,
}

impl AlloyDelivery {
	/// Builds a provider for `rpc_url` that signs with `signer`.
	pub fn new(
		chain_id: u64,
		rpc_url: &str,
		signer: PrivateKeySigner,
		settings: DeliverySettings,
	) -> Result<Self, DeliveryError> {
		let url = rpc_url.parse().map_err(|e| {
			DeliveryError::Network(format!("Invalid RPC URL for network {}: {}", chain_id, e))
		})?;

		let wallet = EthereumWallet::from(signer.with_chain_id(Some(chain_id)));
		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);
		provider.client().set_poll_interval(settings.poll_interval);

		Ok(Self {
			chain_id,
			provider: Arc::new(provider),
			settings,
		})
	}

	/// ABI-encodes `call`, runs it against `to` and decodes the return data.
	async fn call_contract<C: SolCall + Send>(
		&self,
		to: Address,
		call: C,
	) -> Result<C::Return, DeliveryError> {
		let output = self.call(to, call.abi_encode()).await?;
		C::abi_decode_returns(&output, true).map_err(|e| {
			DeliveryError::InvalidResponse(format!("{} from {}: {}", C::SIGNATURE, to, e))
		})
	}
}

/// Converts a transport error, keeping the node's error object when present.
fn rpc_error(context: &str, err: TransportError) -> DeliveryError {
	match err.as_error_resp() {
		Some(payload) => DeliveryError::Rpc {
			message: payload.message.to_string(),
			data: payload
				.data
				.as_ref()
				.map(|raw| raw.get().trim_matches('"').to_string()),
		},
		None => DeliveryError::Network(format!("{}: {}", context, err)),
	}
}

fn to_request(tx: Transaction) -> TransactionRequest {
	let mut request = TransactionRequest::default()
		.input(tx.data.into())
		.value(tx.value);
	if let Some(to) = tx.to {
		request = request.to(to);
	}
	if let Some(gas_limit) = tx.gas_limit {
		request = request.gas_limit(gas_limit);
	}
	request
}

/// Depth of a transaction mined at `tx_block`, counting its own block.
fn confirmations_at(current_block: u64, tx_block: u64) -> u64 {
	current_block.saturating_sub(tx_block).saturating_add(1)
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		if tx.chain_id != self.chain_id {
			return Err(DeliveryError::NoProviderAvailable(tx.chain_id));
		}

		let pending_tx = self
			.provider
			.send_transaction(to_request(tx))
			.await
			.map_err(|e| rpc_error("Failed to send transaction", e))?;

		let hash = TransactionHash(*pending_tx.tx_hash());
		tracing::info!(
			tx_hash = %truncate_id(&hash.to_string()),
			chain_id = self.chain_id,
			"Submitted transaction"
		);

		Ok(hash)
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		let timeout = self.settings.confirmation_timeout;
		let start_time = tokio::time::Instant::now();

		tracing::info!(
			tx_hash = %truncate_id(&hash.to_string()),
			"Waiting for {} confirmations (timeout: {}s)",
			confirmations,
			timeout.as_secs()
		);

		loop {
			if start_time.elapsed() > timeout {
				return Err(DeliveryError::Timeout {
					hash: *hash,
					confirmations,
					seconds: timeout.as_secs(),
				});
			}

			let receipt = match self.provider.get_transaction_receipt(hash.0).await {
				Ok(Some(receipt)) => receipt,
				Ok(None) => {
					tokio::time::sleep(self.settings.poll_interval).await;
					continue;
				},
				Err(e) => return Err(rpc_error("Failed to get receipt", e)),
			};

			let tx_block = receipt.block_number.unwrap_or(0);
			let result = TransactionReceipt {
				hash: *hash,
				block_number: tx_block,
				success: receipt.status(),
			};
			if !result.success {
				return Ok(result);
			}

			let current_block = self.get_block_number().await?;
			let depth = confirmations_at(current_block, tx_block);
			if depth >= confirmations {
				return Ok(result);
			}

			tracing::debug!(
				"Waiting for {} more confirmations...",
				confirmations.saturating_sub(depth)
			);
			tokio::time::sleep(self.settings.poll_interval).await;
		}
	}

	async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes, DeliveryError> {
		let request = TransactionRequest::default().to(to).input(data.into());

		self.provider
			.call(&request)
			.await
			.map_err(|e| rpc_error("Failed to call contract", e))
	}

	async fn get_allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, DeliveryError> {
		let result = self
			.call_contract(token, IERC20::allowanceCall { owner, spender })
			.await?;
		Ok(result.remaining)
	}

	async fn get_approved(
		&self,
		collection: Address,
		token_id: U256,
	) -> Result<Address, DeliveryError> {
		let result = self
			.call_contract(collection, IERC721::getApprovedCall { tokenId: token_id })
			.await?;
		Ok(result.operator)
	}

	async fn is_approved_for_all(
		&self,
		collection: Address,
		owner: Address,
		operator: Address,
	) -> Result<bool, DeliveryError> {
		let result = self
			.call_contract(
				collection,
				IERC1155::isApprovedForAllCall {
					account: owner,
					operator,
				},
			)
			.await?;
		Ok(result.approved)
	}

	async fn get_block_number(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| rpc_error("Failed to get block number", e))
	}

	async fn get_logs(&self, query: &LogQuery) -> Result<Vec<EventLog>, DeliveryError> {
		let mut filter = Filter::new()
			.address(query.address)
			.event_signature(query.event_signature)
			.from_block(query.from_block)
			.to_block(query.to_block);
		if let Some(topic) = query.topic1 {
			filter = filter.topic1(topic);
		}
		if let Some(topic) = query.topic2 {
			filter = filter.topic2(topic);
		}

		let logs = self
			.provider
			.get_logs(&filter)
			.await
			.map_err(|e| rpc_error("Failed to get logs", e))?;

		Ok(logs
			.into_iter()
			.map(|log| EventLog {
				address: log.address(),
				topics: log.topics().to_vec(),
				data: log.data().data.clone(),
				block_number: log.block_number,
			})
			.collect())
	}
}

/// Creates the HTTP delivery provider for one network.
///
/// # Parameters
/// - `chain_id`: chain the provider serves
/// - `network`: registry entry supplying the RPC URL
/// - `private_key`: signer key for submitted transactions
/// - `settings`: confirmation polling settings
pub fn create_http_delivery(
	chain_id: u64,
	network: &NetworkConfig,
	private_key: &SecretString,
	settings: DeliverySettings,
) -> Result<Box<dyn DeliveryInterface>, DeliveryError> {
	let signer: PrivateKeySigner = private_key.with_exposed(|key| {
		key.parse()
			.map_err(|_| DeliveryError::Network("Invalid private key format".to_string()))
	})?;

	tracing::debug!(
		chain_id,
		network = %network.name,
		rpc_url = %network.rpc_url,
		"Creating delivery provider"
	);
	let delivery = AlloyDelivery::new(chain_id, &network.rpc_url, signer, settings)?;

	Ok(Box::new(delivery))
}
