//! Common types module for the raffle client.
//!
//! This module defines the core data types shared by every raffle client
//! crate: the network registry, prize and approval types, transactions and
//! receipts, raffle states and the contract ABIs the client talks to.

/// Approval workflow outcome types.
pub mod approval;
/// Solidity ABIs of the token and raffle contracts.
pub mod contracts;
/// Transaction delivery types for blockchain interactions.
pub mod delivery;
/// Network registry: chain ids, RPC endpoints and contract addresses.
pub mod networks;
/// Prize descriptions and token standards.
pub mod prize;
/// On-chain raffle states and summaries.
pub mod raffle;
/// Zeroizing wrapper for private keys.
pub mod secret_string;
/// Utility functions for addresses, units and formatting.
pub mod utils;

pub use approval::ApprovalResult;
pub use delivery::*;
pub use networks::{
	ContractAddresses, ContractRole, NetworkConfig, NetworkOverride, NetworkRegistry,
	RegistryError,
};
pub use prize::{PrizeSpec, TokenStandard};
pub use raffle::{RaffleState, RaffleSummary};
pub use secret_string::SecretString;
pub use utils::{
	format_token_amount, parse_address, parse_token_amount, truncate_id, with_0x_prefix,
	AddressError, UnitsError, ETH_DECIMALS,
};
