//! Local private-key account.

use crate::{AccountError, AccountInterface};
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use raffle_types::{with_0x_prefix, SecretString};

/// Account backed by a private key held in memory.
pub struct LocalWallet {
	signer: PrivateKeySigner,
	private_key: SecretString,
}

impl LocalWallet {
	/// Parses a hex private key, with or without `0x`.
	pub fn new(private_key: &SecretString) -> Result<Self, AccountError> {
		let normalized = private_key.with_exposed(|key| SecretString::new(with_0x_prefix(key.trim())));
		let signer = normalized
			.with_exposed(|key| key.parse::<PrivateKeySigner>())
			.map_err(|_| AccountError::InvalidKey("Invalid private key format".into()))?;

		Ok(Self {
			signer,
			private_key: normalized,
		})
	}
}

#[async_trait]
impl AccountInterface for LocalWallet {
	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address())
	}

	fn get_private_key(&self) -> SecretString {
		self.private_key.clone()
	}
}

/// Creates the account implementation for a configured private key.
pub fn create_account(private_key: &SecretString) -> Result<Box<dyn AccountInterface>, AccountError> {
	Ok(Box::new(LocalWallet::new(private_key)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	#[tokio::test]
	async fn test_address_derivation() {
		let wallet = LocalWallet::new(&SecretString::from(ANVIL_KEY)).unwrap();

		assert_eq!(
			wallet.address().await.unwrap(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
	}

	#[tokio::test]
	async fn test_key_without_prefix() {
		let wallet = LocalWallet::new(&SecretString::from(&ANVIL_KEY[2..])).unwrap();

		assert_eq!(wallet.get_private_key().expose_secret(), ANVIL_KEY);
		assert_eq!(
			wallet.address().await.unwrap(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
	}

	#[test]
	fn test_invalid_key() {
		let result = create_account(&SecretString::from("0x1234"));

		assert!(matches!(result, Err(AccountError::InvalidKey(_))));
	}
}
