//! Validated raffle requests and their on-chain encoding.

use alloy_primitives::{Address, U256};
use raffle_types::contracts::RaffleParams;
use raffle_types::{format_token_amount, PrizeSpec, TokenStandard, ETH_DECIMALS};
use serde::Serialize;

/// A raffle whose fields passed validation and were converted to chain
/// units: seconds for times and the smallest token unit for amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaffleRequest {
	pub name: String,
	/// Unix timestamp in seconds.
	pub start_time: u64,
	/// Seconds.
	pub duration: u64,
	pub ticket_limit: u64,
	pub winners_count: u64,
	pub max_tickets_per_participant: u64,
	pub variant: RaffleVariant,
}

/// The kind of raffle and the fields only that kind carries.
///
/// Ticket prices and ETH amounts are in wei; ERC-20 amounts are in the
/// token's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RaffleVariant {
	/// Unprized raffle with free tickets.
	Whitelist,
	/// The deployer mints a brand new collection for the winners.
	NewErc721Drop {
		collection_name: String,
		collection_symbol: String,
		base_uri: String,
		max_supply: u64,
		/// Royalty in basis points.
		royalty_bps: u64,
		ticket_price: U256,
	},
	/// Winners mint from an existing collection that allows it.
	ExistingErc721Drop {
		collection: Address,
		ticket_price: U256,
	},
	/// A single escrowed NFT.
	LuckySaleErc721 {
		collection: Address,
		token_id: U256,
		ticket_price: U256,
	},
	/// Escrowed ERC-1155 units, `units_per_winner` to each winner.
	LuckySaleErc1155 {
		collection: Address,
		token_id: U256,
		units_per_winner: u64,
		ticket_price: U256,
	},
	EthGiveaway {
		amount: U256,
	},
	Erc20Giveaway {
		token: Address,
		amount: U256,
	},
}

impl RaffleVariant {
	pub fn standard(&self) -> TokenStandard {
		match self {
			RaffleVariant::Whitelist => TokenStandard::None,
			RaffleVariant::NewErc721Drop { .. }
			| RaffleVariant::ExistingErc721Drop { .. }
			| RaffleVariant::LuckySaleErc721 { .. } => TokenStandard::Erc721,
			RaffleVariant::LuckySaleErc1155 { .. } => TokenStandard::Erc1155,
			RaffleVariant::EthGiveaway { .. } => TokenStandard::Eth,
			RaffleVariant::Erc20Giveaway { .. } => TokenStandard::Erc20,
		}
	}

	/// The prize as seen by the approval workflow.
	///
	/// Amounts are rendered back into whole-token decimals so the workflow
	/// converts them with the same token decimals used here.
	pub fn prize_spec(&self, token_decimals: u8) -> PrizeSpec {
		match self {
			RaffleVariant::LuckySaleErc721 {
				collection,
				token_id,
				..
			} => PrizeSpec::Erc721 {
				collection: *collection,
				token_id: token_id.to_string(),
			},
			RaffleVariant::LuckySaleErc1155 {
				collection,
				token_id,
				..
			} => PrizeSpec::Erc1155 {
				collection: *collection,
				token_id: token_id.to_string(),
			},
			RaffleVariant::Erc20Giveaway { token, amount } => PrizeSpec::Erc20 {
				token: *token,
				amount: format_token_amount(&amount.to_string(), token_decimals),
			},
			RaffleVariant::EthGiveaway { amount } => PrizeSpec::Eth {
				amount: format_token_amount(&amount.to_string(), ETH_DECIMALS),
			},
			RaffleVariant::Whitelist
			| RaffleVariant::NewErc721Drop { .. }
			| RaffleVariant::ExistingErc721Drop { .. } => PrizeSpec::None,
		}
	}

	/// The prize the deployer pulls from the creator's wallet, if any.
	pub fn escrowed_prize(&self, token_decimals: u8) -> Option<PrizeSpec> {
		Some(self.prize_spec(token_decimals)).filter(PrizeSpec::requires_approval)
	}
}

impl RaffleRequest {
	/// Builds the `createRaffle` argument.
	///
	/// Fields the variant does not use are zero, the zero address or empty.
	pub fn to_params(&self, creator: Address) -> RaffleParams {
		let mut params = RaffleParams {
			name: self.name.clone(),
			startTime: U256::from(self.start_time),
			duration: U256::from(self.duration),
			ticketLimit: U256::from(self.ticket_limit),
			winnersCount: U256::from(self.winners_count),
			maxTicketsPerParticipant: U256::from(self.max_tickets_per_participant),
			isPrized: true,
			customTicketPrice: U256::ZERO,
			erc721Drop: false,
			prizeCollection: Address::ZERO,
			standard: self.variant.standard().discriminant(),
			prizeTokenId: U256::ZERO,
			amountPerWinner: U256::ZERO,
			collectionName: String::new(),
			collectionSymbol: String::new(),
			collectionBaseURI: String::new(),
			creator,
			royaltyPercentage: U256::ZERO,
			royaltyRecipient: Address::ZERO,
			maxSupply: U256::ZERO,
			erc20PrizeToken: Address::ZERO,
			erc20PrizeAmount: U256::ZERO,
			ethPrizeAmount: U256::ZERO,
		};

		match &self.variant {
			RaffleVariant::Whitelist => {
				params.isPrized = false;
			},
			RaffleVariant::NewErc721Drop {
				collection_name,
				collection_symbol,
				base_uri,
				max_supply,
				royalty_bps,
				ticket_price,
			} => {
				params.customTicketPrice = *ticket_price;
				params.amountPerWinner = U256::from(1);
				params.collectionName = collection_name.clone();
				params.collectionSymbol = collection_symbol.clone();
				params.collectionBaseURI = base_uri.clone();
				params.royaltyPercentage = U256::from(*royalty_bps);
				params.royaltyRecipient = creator;
				params.maxSupply = U256::from(*max_supply);
			},
			RaffleVariant::ExistingErc721Drop {
				collection,
				ticket_price,
			} => {
				params.customTicketPrice = *ticket_price;
				params.erc721Drop = true;
				params.prizeCollection = *collection;
				params.amountPerWinner = U256::from(1);
			},
			RaffleVariant::LuckySaleErc721 {
				collection,
				token_id,
				ticket_price,
			} => {
				params.customTicketPrice = *ticket_price;
				params.prizeCollection = *collection;
				params.prizeTokenId = *token_id;
				params.amountPerWinner = U256::from(1);
			},
			RaffleVariant::LuckySaleErc1155 {
				collection,
				token_id,
				units_per_winner,
				ticket_price,
			} => {
				params.customTicketPrice = *ticket_price;
				params.prizeCollection = *collection;
				params.prizeTokenId = *token_id;
				params.amountPerWinner = U256::from(*units_per_winner);
			},
			RaffleVariant::EthGiveaway { amount } => {
				params.ethPrizeAmount = *amount;
			},
			RaffleVariant::Erc20Giveaway { token, amount } => {
				params.erc20PrizeToken = *token;
				params.erc20PrizeAmount = *amount;
			},
		}

		params
	}
}
