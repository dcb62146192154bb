//! Raffle creation.
//!
//! [`RaffleSubmitter`] takes a user's [`RaffleForm`] through validation,
//! contract resolution, prize approval and finally the `createRaffle`
//! transaction. Every failure comes back as one [`SubmissionError`] whose
//! `Display` is the message to show the user.

pub mod form;
pub mod request;

pub use form::{parse_start_time, FieldError, RaffleForm, RaffleKind, ValidationErrors};
pub use request::{RaffleRequest, RaffleVariant};

use crate::approval::ApprovalWorkflow;
use crate::errors::{classify, RawError};
use alloy_primitives::Address;
use alloy_sol_types::SolCall;
use raffle_account::AccountService;
use raffle_delivery::DeliveryService;
use raffle_types::contracts::{IRaffleDeployer, IRaffleManager};
use raffle_types::{
	ApprovalResult, ContractRole, NetworkRegistry, RegistryError, Transaction, TransactionHash,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Reasons a raffle could not be created.
#[derive(Debug, Error)]
pub enum SubmissionError {
	/// The form has invalid fields; nothing was sent.
	#[error("{0}")]
	Validation(ValidationErrors),
	#[error("Unsupported network: chain {0}")]
	UnsupportedNetwork(u64),
	#[error("{role} address not configured for chain {chain_id}")]
	MissingContract { chain_id: u64, role: ContractRole },
	#[error("Existing collections are not enabled on the raffle manager")]
	ExistingCollectionNotAllowed,
	/// The prize could not be approved; creation was not attempted.
	#[error("Token approval failed: {0}")]
	Approval(String),
	/// The creation transaction failed or reverted.
	#[error("{0}")]
	Creation(String),
}

impl From<ValidationErrors> for SubmissionError {
	fn from(errors: ValidationErrors) -> Self {
		SubmissionError::Validation(errors)
	}
}

impl From<RegistryError> for SubmissionError {
	fn from(err: RegistryError) -> Self {
		match err {
			RegistryError::UnsupportedNetwork(chain_id)
			| RegistryError::IncompleteNetwork { chain_id, .. } => {
				SubmissionError::UnsupportedNetwork(chain_id)
			},
			RegistryError::MissingContract { chain_id, role } => {
				SubmissionError::MissingContract { chain_id, role }
			},
		}
	}
}

fn creation_error(err: impl Into<RawError>) -> SubmissionError {
	SubmissionError::Creation(classify(&err.into()))
}

/// Outcome of a successful creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleCreated {
	pub transaction_hash: TransactionHash,
	pub block_number: u64,
	/// Explorer link for the creation transaction.
	pub explorer_url: Option<String>,
	/// Present for escrowed prizes.
	pub approval: Option<ApprovalResult>,
}

/// Creates raffles through the `RaffleDeployer` of one chain.
pub struct RaffleSubmitter {
	chain_id: u64,
	registry: Arc<NetworkRegistry>,
	delivery: Arc<DeliveryService>,
	account: Arc<AccountService>,
	approvals: Arc<ApprovalWorkflow>,
	token_decimals: u8,
}

impl RaffleSubmitter {
	pub fn new(
		chain_id: u64,
		registry: Arc<NetworkRegistry>,
		delivery: Arc<DeliveryService>,
		account: Arc<AccountService>,
		approvals: Arc<ApprovalWorkflow>,
		token_decimals: u8,
	) -> Self {
		Self {
			chain_id,
			registry,
			delivery,
			account,
			approvals,
			token_decimals,
		}
	}

	/// Validates a form and creates the raffle it describes.
	pub async fn create_raffle(&self, form: &RaffleForm) -> Result<RaffleCreated, SubmissionError> {
		let request = form.validate(self.token_decimals)?;
		self.submit(&request).await
	}

	/// Creates a raffle from an already validated request.
	///
	/// Approval (when the prize is escrowed) always completes before the
	/// creation transaction is sent.
	#[instrument(skip_all, fields(chain_id = self.chain_id, raffle = %request.name))]
	pub async fn submit(&self, request: &RaffleRequest) -> Result<RaffleCreated, SubmissionError> {
		if self.registry.lookup(self.chain_id).is_none() {
			return Err(SubmissionError::UnsupportedNetwork(self.chain_id));
		}
		let deployer = self
			.registry
			.contract(self.chain_id, ContractRole::RaffleDeployer)?;

		if let RaffleVariant::ExistingErc721Drop { .. } = request.variant {
			self.check_existing_collections_allowed().await?;
		}

		let creator = self.account.get_address().await.map_err(creation_error)?;

		let approval = match request.variant.escrowed_prize(self.token_decimals) {
			Some(prize) => {
				let result = self.approvals.ensure_approved(&prize, deployer).await;
				if !result.success {
					let message = result.error_message.unwrap_or_default();
					return Err(SubmissionError::Approval(message));
				}
				if !result.already_approved && !self.approvals.await_visible(&prize, deployer).await {
					tracing::warn!("Proceeding before the approval became visible");
				}
				Some(result)
			},
			None => None,
		};

		let params = request.to_params(creator);
		let tx = Transaction::call(
			self.chain_id,
			deployer,
			IRaffleDeployer::createRaffleCall { params }.abi_encode(),
		);

		tracing::info!(deployer = %deployer, kind = %request.variant.standard(), "Submitting raffle");
		let receipt = self
			.delivery
			.deliver_and_confirm(tx)
			.await
			.map_err(creation_error)?;

		if !receipt.success {
			tracing::warn!(tx_hash = %receipt.hash, "Raffle creation reverted");
			return Err(SubmissionError::Creation(classify(&RawError::new(
				"execution reverted",
			))));
		}

		tracing::info!(tx_hash = %receipt.hash, block = receipt.block_number, "Raffle created");
		let explorer_url = self
			.registry
			.lookup(self.chain_id)
			.map(|network| network.tx_url(&receipt.hash.to_string()));

		Ok(RaffleCreated {
			transaction_hash: receipt.hash,
			block_number: receipt.block_number,
			explorer_url,
			approval,
		})
	}

	/// Minting from existing collections must be enabled on the manager.
	///
	/// Chains without a configured manager skip the check.
	async fn check_existing_collections_allowed(&self) -> Result<(), SubmissionError> {
		let manager = match self
			.registry
			.contract(self.chain_id, ContractRole::RaffleManager)
		{
			Ok(manager) => manager,
			Err(RegistryError::MissingContract { .. }) => return Ok(()),
			Err(err) => return Err(err.into()),
		};

		if self.read_allow_existing(manager).await? {
			Ok(())
		} else {
			Err(SubmissionError::ExistingCollectionNotAllowed)
		}
	}

	async fn read_allow_existing(&self, manager: Address) -> Result<bool, SubmissionError> {
		let data = IRaffleManager::toggleAllowExistingCollectionCall {}.abi_encode();
		let output = self
			.delivery
			.call(self.chain_id, manager, data)
			.await
			.map_err(creation_error)?;

		IRaffleManager::toggleAllowExistingCollectionCall::abi_decode_returns(&output, true)
			.map(|decoded| decoded.allowed)
			.map_err(|err| creation_error(format!("Invalid manager response: {}", err)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, B256, U256};
	use alloy_sol_types::SolValue;
	use raffle_account::MockAccountInterface;
	use raffle_config::ApprovalConfig;
	use raffle_delivery::{DeliveryError, DeliveryInterface, MockDeliveryInterface};
	use mockall::Sequence;
	use raffle_types::contracts::{IERC20, IERC721};
	use raffle_types::{ContractAddresses, NetworkOverride, TransactionReceipt};
	use std::collections::HashMap;

	const CHAIN: u64 = 84532;
	const CREATOR: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
	const DEPLOYER: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
	const MANAGER: Address = address!("9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0");
	const TOKEN: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");

	fn registry(contracts: ContractAddresses) -> Arc<NetworkRegistry> {
		let mut overrides = HashMap::new();
		overrides.insert(
			CHAIN,
			NetworkOverride {
				contracts,
				..NetworkOverride::default()
			},
		);
		Arc::new(NetworkRegistry::builtin().with_overrides(&overrides).unwrap())
	}

	fn deployed() -> ContractAddresses {
		ContractAddresses {
			raffle_deployer: Some(DEPLOYER),
			raffle_manager: Some(MANAGER),
			..ContractAddresses::default()
		}
	}

	fn submitter_on(
		chain_id: u64,
		registry: Arc<NetworkRegistry>,
		delivery: MockDeliveryInterface,
	) -> RaffleSubmitter {
		let mut providers: HashMap<u64, Box<dyn DeliveryInterface>> = HashMap::new();
		providers.insert(chain_id, Box::new(delivery));
		let delivery = Arc::new(DeliveryService::new(providers, 1));

		let mut account = MockAccountInterface::new();
		account.expect_address().returning(|| Ok(CREATOR));
		let account = Arc::new(AccountService::new(Box::new(account)));

		let config = ApprovalConfig {
			settle_timeout_ms: 200,
			settle_initial_interval_ms: 10,
			..ApprovalConfig::default()
		};
		let approvals = Arc::new(ApprovalWorkflow::new(
			chain_id,
			delivery.clone(),
			account.clone(),
			config,
		));

		RaffleSubmitter::new(chain_id, registry, delivery, account, approvals, 18)
	}

	fn submitter(delivery: MockDeliveryInterface) -> RaffleSubmitter {
		submitter_on(CHAIN, registry(deployed()), delivery)
	}

	fn form(kind: RaffleKind) -> RaffleForm {
		RaffleForm {
			kind,
			name: Some("Genesis".into()),
			start_time: Some("2025-01-01T00:00:00Z".into()),
			duration_minutes: Some("60".into()),
			ticket_limit: Some("100".into()),
			winners_count: Some("3".into()),
			max_tickets_per_participant: Some("5".into()),
			ticket_price: None,
			collection: None,
			token_id: None,
			units_per_winner: None,
			token: None,
			amount: None,
			collection_name: None,
			collection_symbol: None,
			base_uri: None,
			max_supply: None,
			royalty_percent: None,
		}
	}

	fn erc20_form() -> RaffleForm {
		let mut raw = form(RaffleKind::Erc20Giveaway);
		raw.token = Some(TOKEN.to_string());
		raw.amount = Some("10".into());
		raw
	}

	fn hash() -> TransactionHash {
		TransactionHash(B256::repeat_byte(0x42))
	}

	fn confirmed(success: bool) -> TransactionReceipt {
		TransactionReceipt {
			hash: hash(),
			block_number: 77,
			success,
		}
	}

	#[tokio::test]
	async fn test_whitelist_raffle_created() {
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_submit()
			.times(1)
			.withf(|tx| {
				let call = IRaffleDeployer::createRaffleCall::abi_decode(&tx.data, true).unwrap();
				tx.to == Some(DEPLOYER)
					&& tx.value.is_zero()
					&& !call.params.isPrized
					&& call.params.creator == CREATOR
					&& call.params.startTime == U256::from(1735689600u64)
					&& call.params.duration == U256::from(3600u64)
			})
			.returning(|_| Ok(hash()));
		delivery
			.expect_wait_for_confirmation()
			.returning(|_, _| Ok(confirmed(true)));

		let created = submitter(delivery)
			.create_raffle(&form(RaffleKind::Whitelist))
			.await
			.unwrap();

		assert_eq!(created.transaction_hash, hash());
		assert_eq!(created.block_number, 77);
		assert!(created.approval.is_none());
		assert_eq!(
			created.explorer_url,
			Some(format!("https://sepolia.basescan.org/tx/{}", hash()))
		);
	}

	#[tokio::test]
	async fn test_validation_happens_before_network() {
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_submit().never();

		let mut raw = erc20_form();
		raw.token = Some("not-an-address".into());
		let err = submitter(delivery).create_raffle(&raw).await.unwrap_err();

		match err {
			SubmissionError::Validation(errors) => {
				assert_eq!(errors.get("token"), Some("Invalid token address"));
			},
			other => panic!("unexpected error {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_unknown_chain_is_not_attempted() {
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_submit().never();

		let err = submitter_on(999_999, registry(deployed()), delivery)
			.create_raffle(&form(RaffleKind::Whitelist))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::UnsupportedNetwork(999_999)));
	}

	#[tokio::test]
	async fn test_missing_deployer() {
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_submit().never();

		let err = submitter_on(CHAIN, registry(ContractAddresses::default()), delivery)
			.create_raffle(&form(RaffleKind::Whitelist))
			.await
			.unwrap_err();

		assert_eq!(
			err.to_string(),
			"RaffleDeployer address not configured for chain 84532"
		);
	}

	#[tokio::test]
	async fn test_erc20_approval_failure_aborts_creation() {
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_get_allowance()
			.returning(|_, _, _| Ok(U256::from(1u64)));
		delivery.expect_submit().times(1).returning(|tx| {
			assert_eq!(tx.to, Some(TOKEN));
			Ok(hash())
		});
		delivery
			.expect_wait_for_confirmation()
			.returning(|_, _| Ok(confirmed(false)));

		let err = submitter(delivery).create_raffle(&erc20_form()).await.unwrap_err();

		assert_eq!(
			err.to_string(),
			"Token approval failed: Approval transaction failed"
		);
	}

	#[tokio::test]
	async fn test_erc20_already_approved_goes_straight_to_creation() {
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_get_allowance()
			.with(
				mockall::predicate::eq(TOKEN),
				mockall::predicate::eq(CREATOR),
				mockall::predicate::eq(DEPLOYER),
			)
			.times(1)
			.returning(|_, _, _| Ok(U256::MAX));
		delivery
			.expect_submit()
			.times(1)
			.withf(|tx| {
				let call = IRaffleDeployer::createRaffleCall::abi_decode(&tx.data, true).unwrap();
				tx.to == Some(DEPLOYER)
					&& call.params.standard == 2
					&& call.params.erc20PrizeToken == TOKEN
					&& call.params.erc20PrizeAmount == U256::from(10u64) * U256::from(10u64).pow(U256::from(18))
			})
			.returning(|_| Ok(hash()));
		delivery
			.expect_wait_for_confirmation()
			.returning(|_, _| Ok(confirmed(true)));

		let created = submitter(delivery).create_raffle(&erc20_form()).await.unwrap();

		let approval = created.approval.unwrap();
		assert!(approval.already_approved);
	}

	#[tokio::test]
	async fn test_fresh_erc20_approval_precedes_creation() {
		let mut seq = Sequence::new();
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_get_allowance()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _, _| Ok(U256::from(1u64)));
		delivery
			.expect_submit()
			.times(1)
			.in_sequence(&mut seq)
			.withf(|tx| {
				tx.to == Some(TOKEN)
					&& IERC20::approveCall::abi_decode(&tx.data, true)
						.map(|call| call.spender == DEPLOYER)
						.unwrap_or(false)
			})
			.returning(|_| Ok(TransactionHash(B256::repeat_byte(0x01))));
		delivery
			.expect_wait_for_confirmation()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|hash, _| {
				Ok(TransactionReceipt {
					hash: *hash,
					block_number: 76,
					success: true,
				})
			});
		delivery
			.expect_get_allowance()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _, _| Ok(U256::MAX));
		delivery
			.expect_submit()
			.times(1)
			.in_sequence(&mut seq)
			.withf(|tx| {
				tx.to == Some(DEPLOYER)
					&& tx.data[..4] == IRaffleDeployer::createRaffleCall::SELECTOR
			})
			.returning(|_| Ok(hash()));
		delivery
			.expect_wait_for_confirmation()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Ok(confirmed(true)));

		let created = submitter(delivery).create_raffle(&erc20_form()).await.unwrap();

		assert_eq!(created.transaction_hash, hash());
		let approval = created.approval.unwrap();
		assert!(approval.success);
		assert!(!approval.already_approved);
		assert_eq!(
			approval.transaction_receipt.map(|receipt| receipt.hash),
			Some(TransactionHash(B256::repeat_byte(0x01)))
		);
	}

	#[tokio::test]
	async fn test_lucky_sale_erc721_created_after_approval() {
		let mut seq = Sequence::new();
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_get_approved()
			.with(
				mockall::predicate::eq(TOKEN),
				mockall::predicate::eq(U256::from(42u64)),
			)
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Ok(Address::ZERO));
		delivery
			.expect_submit()
			.times(1)
			.in_sequence(&mut seq)
			.withf(|tx| {
				tx.to == Some(TOKEN)
					&& IERC721::approveCall::abi_decode(&tx.data, true)
						.map(|call| call.to == DEPLOYER && call.tokenId == U256::from(42u64))
						.unwrap_or(false)
			})
			.returning(|_| Ok(TransactionHash(B256::repeat_byte(0x02))));
		delivery
			.expect_wait_for_confirmation()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|hash, _| {
				Ok(TransactionReceipt {
					hash: *hash,
					block_number: 76,
					success: true,
				})
			});
		delivery
			.expect_get_approved()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Ok(DEPLOYER));
		delivery
			.expect_submit()
			.times(1)
			.in_sequence(&mut seq)
			.withf(|tx| {
				let Ok(call) = IRaffleDeployer::createRaffleCall::abi_decode(&tx.data, true) else {
					return false;
				};
				tx.to == Some(DEPLOYER)
					&& call.params.isPrized
					&& call.params.standard == 0
					&& call.params.prizeCollection == TOKEN
					&& call.params.prizeTokenId == U256::from(42u64)
					&& call.params.amountPerWinner == U256::from(1u64)
					&& call.params.customTicketPrice == U256::from(10_000_000_000_000_000u64)
			})
			.returning(|_| Ok(hash()));
		delivery
			.expect_wait_for_confirmation()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Ok(confirmed(true)));

		let mut raw = form(RaffleKind::LuckySaleErc721);
		raw.collection = Some(TOKEN.to_string());
		raw.token_id = Some("42".into());
		raw.ticket_price = Some("0.01".into());
		let created = submitter(delivery).create_raffle(&raw).await.unwrap();

		let approval = created.approval.unwrap();
		assert!(!approval.already_approved);
		assert_eq!(created.block_number, 77);
	}

	#[tokio::test]
	async fn test_creation_revert_is_classified() {
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_submit().returning(|_| {
			Err(DeliveryError::Rpc {
				message: "execution reverted: Start time must be in the future".into(),
				data: None,
			})
		});

		let err = submitter(delivery)
			.create_raffle(&form(RaffleKind::Whitelist))
			.await
			.unwrap_err();

		assert_eq!(err.to_string(), "Start time must be in the future.");
	}

	#[tokio::test]
	async fn test_reverted_receipt() {
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_submit().returning(|_| Ok(hash()));
		delivery
			.expect_wait_for_confirmation()
			.returning(|_, _| Ok(confirmed(false)));

		let err = submitter(delivery)
			.create_raffle(&form(RaffleKind::Whitelist))
			.await
			.unwrap_err();

		assert_eq!(err.to_string(), "Transaction failed - contract reverted.");
	}

	#[tokio::test]
	async fn test_existing_collection_gate() {
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_call()
			.withf(|to, data| {
				*to == MANAGER
					&& data[..4] == IRaffleManager::toggleAllowExistingCollectionCall::SELECTOR
			})
			.returning(|_, _| Ok(false.abi_encode().into()));
		delivery.expect_submit().never();

		let mut raw = form(RaffleKind::ExistingErc721Drop);
		raw.collection = Some(TOKEN.to_string());
		let err = submitter(delivery).create_raffle(&raw).await.unwrap_err();

		assert!(matches!(err, SubmissionError::ExistingCollectionNotAllowed));
	}
}
