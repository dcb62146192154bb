//! Account management module for the raffle client.
//!
//! This module provides the signer abstraction the client uses to learn the
//! raffle creator's address and to hand a signing key to the delivery layer.

use alloy_primitives::Address;
use async_trait::async_trait;
use raffle_types::SecretString;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use implementations::local::{create_account, LocalWallet};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Error that occurs when interacting with the account implementation.
	#[error("Implementation error: {0}")]
	Implementation(String),
}

/// Trait defining the interface for account implementations.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Retrieves the address associated with this account.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Returns the private key as a SecretString with 0x prefix.
	///
	/// Delivery implementations build their transaction signer from it.
	fn get_private_key(&self) -> SecretString;
}

/// Service that manages account operations.
///
/// Wraps a single account implementation; the raffle creator is always the
/// account configured here.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// Retrieves the address of the managed account.
	pub async fn get_address(&self) -> Result<Address, AccountError> {
		self.implementation.address().await
	}

	/// Returns the private key as a SecretString.
	pub fn get_private_key(&self) -> SecretString {
		self.implementation.get_private_key()
	}
}
