//! Address parsing for user input.

use alloy_primitives::Address;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid address '{0}': expected 0x followed by 40 hex characters")]
pub struct AddressError(pub String);

/// Parses a `0x`-prefixed, 40-hex-character address.
///
/// Mixed case is accepted without checksum verification, so addresses
/// compare case-insensitively once parsed.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
	let trimmed = input.trim();
	let hex = trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
		.ok_or_else(|| AddressError(input.to_string()))?;

	if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
		return Err(AddressError(input.to_string()));
	}

	hex.parse::<Address>()
		.map_err(|_| AddressError(input.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn test_parse_address_case_insensitive() {
		let expected = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

		assert_eq!(
			parse_address("0x5fbdb2315678afecb367f032d93f642f64180aa3"),
			Ok(expected)
		);
		assert_eq!(
			parse_address("0x5FBDB2315678AFECB367F032D93F642F64180AA3"),
			Ok(expected)
		);
		assert_eq!(
			parse_address(" 0x5FbDB2315678afecb367f032d93F642f64180aa3 "),
			Ok(expected)
		);
	}

	#[test]
	fn test_parse_address_rejects_malformed() {
		assert!(parse_address("not-an-address").is_err());
		assert!(parse_address("5fbdb2315678afecb367f032d93f642f64180aa3").is_err());
		assert!(parse_address("0x5fbdb2315678afecb367f032d93f642f64180aa").is_err());
		assert!(parse_address("0x5fbdb2315678afecb367f032d93f642f64180aag").is_err());
		assert!(parse_address("").is_err());
	}
}
