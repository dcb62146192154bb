//! Transaction delivery types for the raffle client.
//!
//! This module defines types related to blockchain transaction submission
//! and monitoring, including transaction hashes, receipts and event log
//! queries.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Blockchain transaction hash representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub B256);

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Transaction receipt containing execution details.
///
/// Provides information about a transaction after it has been included in a block,
/// including its success status and block number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

/// A contract call or transfer ready for signing and submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	/// Chain the transaction targets.
	pub chain_id: u64,
	/// Recipient contract; `None` for contract creation.
	pub to: Option<Address>,
	/// ABI encoded call data.
	pub data: Vec<u8>,
	/// Native value attached to the call, in wei.
	pub value: U256,
	/// Explicit gas limit; estimated by the provider when `None`.
	pub gas_limit: Option<u64>,
}

impl Transaction {
	/// Builds a zero-value call to `to` with the given calldata.
	pub fn call(chain_id: u64, to: Address, data: Vec<u8>) -> Self {
		Self {
			chain_id,
			to: Some(to),
			data,
			value: U256::ZERO,
			gas_limit: None,
		}
	}
}

/// Raw log query over an explicit block range.
///
/// `topic1` and `topic2` hold the first two indexed event arguments, left
/// padded to 32 bytes. `None` matches any value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
	pub address: Address,
	pub event_signature: B256,
	pub topic1: Option<B256>,
	pub topic2: Option<B256>,
	pub from_block: u64,
	pub to_block: u64,
}

/// An event log returned by a [`LogQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
	pub address: Address,
	pub topics: Vec<B256>,
	pub data: Bytes,
	pub block_number: Option<u64>,
}

impl EventLog {
	/// Interprets the first data word as an unsigned integer.
	///
	/// This is the `value` of an ERC-20 `Approval` or `Transfer` event.
	pub fn first_word(&self) -> Option<U256> {
		if self.data.len() < 32 {
			return None;
		}
		Some(U256::from_be_slice(&self.data[..32]))
	}
}
