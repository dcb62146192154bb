//! Token approval workflow.
//!
//! Before the raffle deployer can pull an escrowed prize out of the
//! creator's wallet it needs an allowance: `approve` for ERC-20 amounts and
//! single ERC-721 tokens, `setApprovalForAll` for ERC-1155 collections.
//! [`ApprovalWorkflow`] checks whether that allowance already exists and
//! submits the approval transaction only when it does not.
//!
//! The workflow never returns an error; every failure ends up in the
//! [`ApprovalResult`] as a classified, user-facing message.

use crate::errors::{classify, RawError};
use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, SolEvent};
use backoff::ExponentialBackoffBuilder;
use raffle_account::{AccountError, AccountService};
use raffle_config::ApprovalConfig;
use raffle_delivery::{DeliveryError, DeliveryService};
use raffle_types::contracts::{IERC1155, IERC20, IERC721};
use raffle_types::{parse_token_amount, ApprovalResult, LogQuery, PrizeSpec, Transaction};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

const INVALID_AMOUNT: &str = "Enter a valid amount";
const INVALID_TOKEN_ID: &str = "Enter a valid token ID";
const APPROVAL_REVERTED: &str = "Approval transaction failed";

#[derive(Debug, Error)]
enum ApprovalError {
	#[error(transparent)]
	Delivery(#[from] DeliveryError),
	#[error(transparent)]
	Account(#[from] AccountError),
	#[error("approval not visible yet")]
	NotVisible,
}

impl From<&ApprovalError> for RawError {
	fn from(err: &ApprovalError) -> Self {
		match err {
			ApprovalError::Delivery(err) => RawError::from(err),
			ApprovalError::Account(err) => RawError::from(err),
			ApprovalError::NotVisible => RawError::new(err.to_string()),
		}
	}
}

/// A prize whose user-entered fields have been parsed.
enum Target {
	Erc20 { token: Address, amount: U256 },
	Erc721 { collection: Address, token_id: U256 },
	Erc1155 { collection: Address },
}

/// Parses a non-negative decimal integer token id.
pub(crate) fn parse_token_id(token_id: &str) -> Option<U256> {
	let token_id = token_id.trim();
	if token_id.is_empty() || !token_id.chars().all(|c| c.is_ascii_digit()) {
		return None;
	}
	U256::from_str_radix(token_id, 10).ok()
}

/// Grants the raffle deployer access to escrowed prizes.
pub struct ApprovalWorkflow {
	chain_id: u64,
	delivery: Arc<DeliveryService>,
	account: Arc<AccountService>,
	config: ApprovalConfig,
}

impl ApprovalWorkflow {
	pub fn new(
		chain_id: u64,
		delivery: Arc<DeliveryService>,
		account: Arc<AccountService>,
		config: ApprovalConfig,
	) -> Self {
		Self {
			chain_id,
			delivery,
			account,
			config,
		}
	}

	/// Makes sure `spender` may move the prize, approving it if necessary.
	#[instrument(skip_all, fields(chain_id = self.chain_id, standard = %prize.standard(), spender = %spender))]
	pub async fn ensure_approved(&self, prize: &PrizeSpec, spender: Address) -> ApprovalResult {
		match self.try_ensure_approved(prize, spender).await {
			Ok(result) => result,
			Err(err) => {
				tracing::warn!(error = %err, "Approval workflow failed");
				ApprovalResult::failed(classify(&RawError::from(&err)))
			},
		}
	}

	async fn try_ensure_approved(
		&self,
		prize: &PrizeSpec,
		spender: Address,
	) -> Result<ApprovalResult, ApprovalError> {
		if !prize.requires_approval() {
			return Ok(ApprovalResult::already_approved());
		}

		let owner = self.account.get_address().await?;
		if self.is_approved(prize, owner, spender).await? {
			tracing::info!("Token already approved");
			return Ok(ApprovalResult::already_approved());
		}

		let target = match self.parse_target(prize) {
			Ok(target) => target,
			Err(message) => return Ok(ApprovalResult::failed(message)),
		};

		let tx = self.approval_transaction(&target, spender);
		tracing::info!("Submitting approval transaction");
		let receipt = self.delivery.deliver_and_confirm(tx).await?;

		if !receipt.success {
			tracing::warn!(tx_hash = %receipt.hash, "Approval transaction reverted");
			return Ok(ApprovalResult::failed(APPROVAL_REVERTED));
		}

		tracing::info!(tx_hash = %receipt.hash, block = receipt.block_number, "Approval confirmed");
		Ok(ApprovalResult::approved(receipt))
	}

	/// Waits until a fresh approval shows up in reads.
	///
	/// Polls the already-approved check with exponential backoff until it
	/// passes or the settle timeout elapses. Returns whether it became visible.
	#[instrument(skip_all, fields(chain_id = self.chain_id, standard = %prize.standard()))]
	pub async fn await_visible(&self, prize: &PrizeSpec, spender: Address) -> bool {
		if !prize.requires_approval() {
			return true;
		}

		let owner = match self.account.get_address().await {
			Ok(owner) => owner,
			Err(err) => {
				tracing::warn!(error = %err, "Cannot resolve owner address");
				return false;
			},
		};

		let policy = ExponentialBackoffBuilder::new()
			.with_initial_interval(self.config.settle_initial_interval())
			.with_max_elapsed_time(Some(self.config.settle_timeout()))
			.build();

		let result = backoff::future::retry(policy, move || async move {
			match self.is_approved(prize, owner, spender).await {
				Ok(true) => Ok(()),
				Ok(false) => Err(backoff::Error::transient(ApprovalError::NotVisible)),
				Err(err) => Err(backoff::Error::transient(err)),
			}
		})
		.await;

		match result {
			Ok(()) => true,
			Err(err) => {
				tracing::warn!(
					error = %err,
					timeout_ms = self.config.settle_timeout_ms,
					"Approval not visible before timeout"
				);
				false
			},
		}
	}

	/// Whether `spender` may already move the prize on `owner`'s behalf.
	///
	/// Prize fields that do not parse count as "not approved"; validation
	/// reports them later.
	async fn is_approved(
		&self,
		prize: &PrizeSpec,
		owner: Address,
		spender: Address,
	) -> Result<bool, ApprovalError> {
		match prize {
			PrizeSpec::Erc20 { token, amount } => {
				let required = match parse_token_amount(amount, self.config.token_decimals) {
					Ok(required) if !required.is_zero() => required,
					_ => return Ok(false),
				};

				let allowance = self
					.delivery
					.get_allowance(self.chain_id, *token, owner, spender)
					.await?;
				if allowance >= required {
					return Ok(true);
				}
				if !allowance.is_zero() {
					return Ok(false);
				}

				// A zero allowance may just be a stale read right after an
				// approval; recent Approval events tell the truth.
				match self.recent_approval(*token, owner, spender, required).await {
					Ok(found) => Ok(found),
					Err(err) => {
						tracing::warn!(error = %err, "Approval log scan failed");
						Ok(false)
					},
				}
			},
			PrizeSpec::Erc721 {
				collection,
				token_id,
			} => {
				let Some(token_id) = parse_token_id(token_id) else {
					return Ok(false);
				};
				let approved = self
					.delivery
					.get_approved(self.chain_id, *collection, token_id)
					.await?;
				Ok(approved == spender)
			},
			PrizeSpec::Erc1155 { collection, .. } => Ok(self
				.delivery
				.is_approved_for_all(self.chain_id, *collection, owner, spender)
				.await?),
			PrizeSpec::Eth { .. } | PrizeSpec::None => Ok(true),
		}
	}

	/// Scans recent blocks for an `Approval(owner, spender, value)` covering
	/// `required`.
	async fn recent_approval(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
		required: U256,
	) -> Result<bool, DeliveryError> {
		let latest = self.delivery.get_block_number(self.chain_id).await?;
		let query = LogQuery {
			address: token,
			event_signature: IERC20::Approval::SIGNATURE_HASH,
			topic1: Some(owner.into_word()),
			topic2: Some(spender.into_word()),
			from_block: latest.saturating_sub(self.config.log_scan_blocks),
			to_block: latest,
		};

		let logs = self.delivery.get_logs(self.chain_id, &query).await?;
		tracing::debug!(count = logs.len(), from = query.from_block, to = latest, "Scanned approval logs");

		Ok(logs
			.iter()
			.filter_map(|log| log.first_word())
			.any(|value| value >= required))
	}

	fn parse_target(&self, prize: &PrizeSpec) -> Result<Target, &'static str> {
		match prize {
			PrizeSpec::Erc20 { token, amount } => {
				match parse_token_amount(amount, self.config.token_decimals) {
					Ok(amount) if !amount.is_zero() => Ok(Target::Erc20 {
						token: *token,
						amount,
					}),
					_ => Err(INVALID_AMOUNT),
				}
			},
			PrizeSpec::Erc721 {
				collection,
				token_id,
			} => parse_token_id(token_id)
				.map(|token_id| Target::Erc721 {
					collection: *collection,
					token_id,
				})
				.ok_or(INVALID_TOKEN_ID),
			PrizeSpec::Erc1155 { collection, .. } => Ok(Target::Erc1155 {
				collection: *collection,
			}),
			// Filtered out by `requires_approval`.
			PrizeSpec::Eth { .. } | PrizeSpec::None => Err(INVALID_AMOUNT),
		}
	}

	fn approval_transaction(&self, target: &Target, spender: Address) -> Transaction {
		match target {
			Target::Erc20 { token, amount } => Transaction::call(
				self.chain_id,
				*token,
				IERC20::approveCall {
					spender,
					amount: *amount,
				}
				.abi_encode(),
			),
			Target::Erc721 {
				collection,
				token_id,
			} => Transaction::call(
				self.chain_id,
				*collection,
				IERC721::approveCall {
					to: spender,
					tokenId: *token_id,
				}
				.abi_encode(),
			),
			Target::Erc1155 { collection } => Transaction::call(
				self.chain_id,
				*collection,
				IERC1155::setApprovalForAllCall {
					operator: spender,
					approved: true,
				}
				.abi_encode(),
			),
		}
	}
}
