//! Decimal-to-base-unit conversion.
//!
//! User input arrives as decimal strings ("0.5", "100"). Contracts take
//! integers in the token's smallest unit. Conversion is exact: input with
//! more fractional digits than the token supports is rejected rather than
//! rounded.

use alloy_primitives::U256;
use thiserror::Error;

/// Decimals of the native currency.
pub const ETH_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
	#[error("Amount is empty")]
	Empty,
	#[error("Invalid amount '{0}'")]
	Invalid(String),
	#[error("Amount '{amount}' has more than {decimals} decimal places")]
	TooPrecise { amount: String, decimals: u8 },
	#[error("Amount '{0}' is too large")]
	Overflow(String),
}

/// Parses a non-negative decimal string into base units.
///
/// `parse_token_amount("1.5", 18)` is `1_500_000_000_000_000_000`.
pub fn parse_token_amount(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
	let amount = amount.trim();
	if amount.is_empty() {
		return Err(UnitsError::Empty);
	}

	let (whole, fraction) = match amount.split_once('.') {
		Some((whole, fraction)) => (whole, fraction),
		None => (amount, ""),
	};

	let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
	if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
		return Err(UnitsError::Invalid(amount.to_string()));
	}

	let fraction = fraction.trim_end_matches('0');
	if fraction.len() > decimals as usize {
		return Err(UnitsError::TooPrecise {
			amount: amount.to_string(),
			decimals,
		});
	}

	let digits = format!(
		"{}{:0<width$}",
		if whole.is_empty() { "0" } else { whole },
		fraction,
		width = decimals as usize
	);

	U256::from_str_radix(&digits, 10).map_err(|_| UnitsError::Overflow(amount.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_ether_amounts() {
		assert_eq!(
			parse_token_amount("1", ETH_DECIMALS),
			Ok(U256::from(1_000_000_000_000_000_000u128))
		);
		assert_eq!(
			parse_token_amount("0.5", ETH_DECIMALS),
			Ok(U256::from(500_000_000_000_000_000u128))
		);
		assert_eq!(
			parse_token_amount("0.00000001", ETH_DECIMALS),
			Ok(U256::from(10_000_000_000u64))
		);
		assert_eq!(
			parse_token_amount(".25", ETH_DECIMALS),
			Ok(U256::from(250_000_000_000_000_000u128))
		);
		assert_eq!(parse_token_amount("0", ETH_DECIMALS), Ok(U256::ZERO));
	}

	#[test]
	fn test_parse_other_decimals() {
		assert_eq!(parse_token_amount("2.5", 6), Ok(U256::from(2_500_000u64)));
		assert_eq!(parse_token_amount("7", 0), Ok(U256::from(7u64)));
		assert_eq!(parse_token_amount("7.000", 0), Ok(U256::from(7u64)));
	}

	#[test]
	fn test_parse_rejects_bad_input() {
		assert_eq!(parse_token_amount("", 18), Err(UnitsError::Empty));
		assert!(matches!(
			parse_token_amount("abc", 18),
			Err(UnitsError::Invalid(_))
		));
		assert!(matches!(
			parse_token_amount("-1", 18),
			Err(UnitsError::Invalid(_))
		));
		assert!(matches!(
			parse_token_amount("1.2.3", 18),
			Err(UnitsError::Invalid(_))
		));
		assert!(matches!(parse_token_amount(".", 18), Err(UnitsError::Invalid(_))));
		assert!(matches!(
			parse_token_amount("0.1234567", 6),
			Err(UnitsError::TooPrecise { .. })
		));
	}
}
