//! Read-only listing of deployed raffles.

use crate::errors::{classify, RawError};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use futures::future::join_all;
use raffle_delivery::{DeliveryError, DeliveryService};
use raffle_types::contracts::{IRaffle, IRaffleManager};
use raffle_types::{ContractRole, NetworkRegistry, RaffleState, RaffleSummary, RegistryError};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum BrowseError {
	#[error("Unsupported network: chain {0}")]
	UnsupportedNetwork(u64),
	#[error("{role} address not configured for chain {chain_id}")]
	MissingContract { chain_id: u64, role: ContractRole },
	#[error("No raffles found")]
	NoRaffles,
	/// The raffle registry itself could not be read.
	#[error("{0}")]
	Read(String),
}

impl From<RegistryError> for BrowseError {
	fn from(err: RegistryError) -> Self {
		match err {
			RegistryError::UnsupportedNetwork(chain_id)
			| RegistryError::IncompleteNetwork { chain_id, .. } => BrowseError::UnsupportedNetwork(chain_id),
			RegistryError::MissingContract { chain_id, role } => {
				BrowseError::MissingContract { chain_id, role }
			},
		}
	}
}

/// Lists raffles registered with the `RaffleManager` of one chain.
pub struct RaffleBrowser {
	chain_id: u64,
	registry: Arc<NetworkRegistry>,
	delivery: Arc<DeliveryService>,
}

impl RaffleBrowser {
	pub fn new(chain_id: u64, registry: Arc<NetworkRegistry>, delivery: Arc<DeliveryService>) -> Self {
		Self {
			chain_id,
			registry,
			delivery,
		}
	}

	/// Raffles currently in `state`, newest first.
	pub async fn list_by_state(&self, state: RaffleState) -> Result<Vec<RaffleSummary>, BrowseError> {
		let mut raffles = self.list_all().await?;
		raffles.retain(|raffle| raffle.state == state);
		Ok(raffles)
	}

	/// Every readable raffle, newest first.
	///
	/// Raffles are read concurrently. One whose getters fail is skipped.
	#[instrument(skip_all, fields(chain_id = self.chain_id))]
	pub async fn list_all(&self) -> Result<Vec<RaffleSummary>, BrowseError> {
		if self.registry.lookup(self.chain_id).is_none() {
			return Err(BrowseError::UnsupportedNetwork(self.chain_id));
		}
		let manager = self
			.registry
			.contract(self.chain_id, ContractRole::RaffleManager)?;

		let addresses = self
			.read(manager, IRaffleManager::getAllRafflesCall {})
			.await
			.map_err(|err| BrowseError::Read(classify(&RawError::from(err))))?
			.raffles;
		if addresses.is_empty() {
			return Err(BrowseError::NoRaffles);
		}
		tracing::debug!(count = addresses.len(), "Loaded raffle registry");

		let results = join_all(addresses.iter().map(|address| self.read_raffle(*address))).await;

		// The registry appends, so reversing puts the newest first.
		let mut summaries: Vec<RaffleSummary> = addresses
			.iter()
			.zip(results)
			.filter_map(|(address, result)| match result {
				Ok(summary) => Some(summary),
				Err(err) => {
					tracing::warn!(raffle = %address, error = %err, "Skipping unreadable raffle");
					None
				},
			})
			.collect();
		summaries.reverse();
		Ok(summaries)
	}

	async fn read<C: SolCall + Send>(&self, to: Address, call: C) -> Result<C::Return, DeliveryError> {
		let output = self.delivery.call(self.chain_id, to, call.abi_encode()).await?;
		C::abi_decode_returns(&output, true)
			.map_err(|err| DeliveryError::InvalidResponse(err.to_string()))
	}

	async fn read_raffle(&self, address: Address) -> Result<RaffleSummary, DeliveryError> {
		let (
			name,
			creator,
			start_time,
			duration,
			ticket_price,
			ticket_limit,
			winners_count,
			max_tickets,
			is_prized,
			state,
		) = futures::try_join!(
			self.read(address, IRaffle::nameCall {}),
			self.read(address, IRaffle::creatorCall {}),
			self.read(address, IRaffle::startTimeCall {}),
			self.read(address, IRaffle::durationCall {}),
			self.read(address, IRaffle::ticketPriceCall {}),
			self.read(address, IRaffle::ticketLimitCall {}),
			self.read(address, IRaffle::winnersCountCall {}),
			self.read(address, IRaffle::maxTicketsPerParticipantCall {}),
			self.read(address, IRaffle::isPrizedCall {}),
			self.read(address, IRaffle::stateCall {}),
		)?;

		let prize_collection = if is_prized.value {
			Some(self.read(address, IRaffle::prizeCollectionCall {}).await?.value)
		} else {
			None
		};

		let ticket_limit = ticket_limit.value.saturating_to::<u64>();
		let tickets_sold = self.count_participants(address, ticket_limit).await;

		Ok(RaffleSummary {
			address,
			name: name.value,
			creator: creator.value,
			start_time: start_time.value.saturating_to(),
			duration: duration.value.saturating_to(),
			ticket_price: ticket_price.value,
			ticket_limit,
			tickets_sold,
			winners_count: winners_count.value.saturating_to(),
			max_tickets_per_participant: max_tickets.value.saturating_to(),
			is_prized: is_prized.value,
			prize_collection,
			state: RaffleState::from_code(state.value),
		})
	}

	/// Counts sold tickets by probing `participants(i)` until it reverts.
	async fn count_participants(&self, address: Address, ticket_limit: u64) -> u64 {
		let mut sold = 0;
		while sold < ticket_limit {
			let probe = IRaffle::participantsCall {
				index: U256::from(sold),
			};
			if let Err(err) = self.read(address, probe).await {
				tracing::debug!(raffle = %address, sold, error = %err, "Participant probe stopped");
				break;
			}
			sold += 1;
		}
		sold
	}
}
