//! Display formatting for hashes, addresses and token amounts.

/// Shortens a hash or address for log lines and tables.
///
/// Keeps the first 10 characters (`0x` plus four bytes) and appends `..`.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 10 {
		id.to_string()
	} else {
		format!("{}..", &id[..10])
	}
}

/// Adds a `0x` prefix unless one (of either case) is already present.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Renders a base-unit integer string as a decimal token quantity.
///
/// `format_token_amount("1500000000000000000", 18)` is `"1.5"`. Trailing
/// fractional zeros are dropped, so whole amounts print without a point.
pub fn format_token_amount(amount: &str, decimals: u8) -> String {
	let places = decimals as usize;
	if places == 0 {
		return amount.to_string();
	}

	let padded = format!("{:0>width$}", amount, width = places + 1);
	let (whole, fraction) = padded.split_at(padded.len() - places);
	let fraction = fraction.trim_end_matches('0');

	if fraction.is_empty() {
		whole.to_string()
	} else {
		format!("{}.{}", whole, fraction)
	}
}
