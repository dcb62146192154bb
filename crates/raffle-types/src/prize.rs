//! Prize descriptions.
//!
//! A [`PrizeSpec`] names the asset a raffle creator escrows with the raffle
//! deployer. Only the fields meaningful for the asset's standard exist; the
//! zero/empty sentinels the contract expects for everything else are produced
//! when the on-chain parameter struct is built.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token standard of a raffle prize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStandard {
	Erc721,
	Erc1155,
	Erc20,
	Eth,
	None,
}

impl TokenStandard {
	/// Value of the `standard` field in the deployer's parameter struct.
	///
	/// `None` shares discriminant 0 with ERC-721; unprized raffles are told
	/// apart by `isPrized = false`.
	pub fn discriminant(self) -> u8 {
		match self {
			TokenStandard::Erc721 => 0,
			TokenStandard::Erc1155 => 1,
			TokenStandard::Erc20 => 2,
			TokenStandard::Eth => 3,
			TokenStandard::None => 0,
		}
	}
}

impl fmt::Display for TokenStandard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			TokenStandard::Erc721 => "ERC721",
			TokenStandard::Erc1155 => "ERC1155",
			TokenStandard::Erc20 => "ERC20",
			TokenStandard::Eth => "ETH",
			TokenStandard::None => "NONE",
		};
		f.write_str(name)
	}
}

impl FromStr for TokenStandard {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"erc721" => Ok(TokenStandard::Erc721),
			"erc1155" => Ok(TokenStandard::Erc1155),
			"erc20" => Ok(TokenStandard::Erc20),
			"eth" => Ok(TokenStandard::Eth),
			"none" => Ok(TokenStandard::None),
			other => Err(format!("Unknown token standard: {}", other)),
		}
	}
}

/// The asset being escrowed or approved.
///
/// Amounts and token ids are kept as the user typed them. The approval
/// workflow validates them only when a transaction is actually required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "standard", rename_all = "lowercase")]
pub enum PrizeSpec {
	/// Fungible tokens; `amount` is a decimal quantity in whole tokens.
	Erc20 { token: Address, amount: String },
	/// A single non-fungible token.
	Erc721 {
		collection: Address,
		token_id: String,
	},
	/// Units of a multi-token id; approval is granted for the whole collection.
	Erc1155 {
		collection: Address,
		token_id: String,
	},
	/// Native currency; never needs an approval.
	Eth { amount: String },
	/// No prize.
	None,
}

impl PrizeSpec {
	/// Returns the token standard of this prize.
	pub fn standard(&self) -> TokenStandard {
		match self {
			PrizeSpec::Erc20 { .. } => TokenStandard::Erc20,
			PrizeSpec::Erc721 { .. } => TokenStandard::Erc721,
			PrizeSpec::Erc1155 { .. } => TokenStandard::Erc1155,
			PrizeSpec::Eth { .. } => TokenStandard::Eth,
			PrizeSpec::None => TokenStandard::None,
		}
	}

	/// Returns the token contract, absent for ETH and unprized raffles.
	pub fn token_address(&self) -> Option<Address> {
		match self {
			PrizeSpec::Erc20 { token, .. } => Some(*token),
			PrizeSpec::Erc721 { collection, .. } | PrizeSpec::Erc1155 { collection, .. } => {
				Some(*collection)
			},
			PrizeSpec::Eth { .. } | PrizeSpec::None => None,
		}
	}

	/// Whether moving this prize requires a token approval.
	pub fn requires_approval(&self) -> bool {
		self.token_address().is_some()
	}
}
