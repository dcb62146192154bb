//! Maps raw errors to short user-facing sentences.
//!
//! Classification runs an ordered rule list over the error message, then
//! falls back to the structured members of [`RawError`], then to a handful of
//! substring checks. The result is always a non-empty sentence starting with
//! an uppercase letter and ending in terminal punctuation.

use super::RawError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Message returned when nothing more specific can be said.
pub const GENERIC_FAILURE: &str = "Transaction failed";

const CONTRACT_REVERTED: &str = "Transaction failed - contract reverted";
const NETWORK_ERROR: &str = "Network connection error";

/// What a matching rule produces.
#[derive(Debug, Clone, Copy)]
enum Outcome {
	/// The first capture group, trimmed. An empty capture falls through to
	/// the next rule.
	Capture,
	/// A fixed replacement message.
	Fixed(&'static str),
}

struct Rule {
	pattern: Regex,
	outcome: Outcome,
}

impl Rule {
	fn apply(&self, message: &str) -> Option<String> {
		let captures = self.pattern.captures(message)?;
		match self.outcome {
			Outcome::Fixed(text) => Some(text.to_string()),
			Outcome::Capture => captures
				.get(1)
				.map(|m| m.as_str().trim())
				.filter(|text| !text.is_empty())
				.map(str::to_string),
		}
	}
}

/// First match wins; order matters.
const RULE_TABLE: &[(&str, Outcome)] = &[
	(r"(?i)execution reverted: (.+)", Outcome::Capture),
	(r"(?i)execution reverted", Outcome::Fixed(CONTRACT_REVERTED)),
	(
		r"(?i)User rejected the transaction",
		Outcome::Fixed("Transaction was cancelled by user"),
	),
	(
		r"(?i)gas required exceeds allowance",
		Outcome::Fixed("Insufficient gas for transaction"),
	),
	(r"(?i)network error", Outcome::Fixed(NETWORK_ERROR)),
	(r"(?i)rpc error", Outcome::Fixed(NETWORK_ERROR)),
	(r#""([^"]+)""#, Outcome::Capture),
	(r"(?i)reverted[:\s]+(.+)", Outcome::Capture),
	(r"\(([^)]+)\)", Outcome::Capture),
	(r"(?i)reverted with reason string '([^']+)'", Outcome::Capture),
	(r"(?i)reverted with custom error", Outcome::Fixed(CONTRACT_REVERTED)),
	(r"\[([^\]]+)\]", Outcome::Capture),
	(r"(?i)Transaction reverted: (.+)", Outcome::Capture),
	(
		r"(?i)VM Exception while processing transaction: reverted with reason string '([^']+)'",
		Outcome::Capture,
	),
	(
		r"(?i)VM Exception while processing transaction: reverted",
		Outcome::Fixed(CONTRACT_REVERTED),
	),
];

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
	RULE_TABLE
		.iter()
		.filter_map(|(pattern, outcome)| {
			Regex::new(pattern).ok().map(|pattern| Rule {
				pattern,
				outcome: *outcome,
			})
		})
		.collect()
});

/// Substring checks applied to the raw message after the structured members.
const SUBSTRING_CHECKS: &[(&str, &str)] = &[
	("insufficient funds", "Insufficient balance for transaction"),
	(
		"nonce",
		"Transaction nonce error - please refresh and try again",
	),
	("already known", "Transaction already submitted"),
	("replacement transaction", "Transaction replacement error"),
	("user rejected", "Transaction was cancelled"),
];

/// Returns the best available reason for an error, unformatted.
pub fn extract_reason(error: &RawError) -> String {
	extract(error, true)
}

fn extract(error: &RawError, follow_nested: bool) -> String {
	let message = error.message.as_str();

	if let Some(reason) = RULES.iter().find_map(|rule| rule.apply(message)) {
		return reason;
	}

	if let Some(reason) = non_empty(error.reason.as_deref()) {
		return reason.to_string();
	}

	// Nested causes are followed one level only.
	if follow_nested {
		if let Some(inner) = &error.error {
			let reason = extract(inner, false);
			if reason != GENERIC_FAILURE {
				return reason;
			}
		}
	}

	if let Some(data) = non_empty(error.data.as_deref()).filter(|data| !is_hex_blob(data)) {
		return data.to_string();
	}

	SUBSTRING_CHECKS
		.iter()
		.find(|(needle, _)| message.contains(needle))
		.map(|(_, text)| text.to_string())
		.unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

/// Converts an error into the sentence shown to the user.
pub fn classify(error: &RawError) -> String {
	format_for_display(&extract_reason(error))
}

/// Capitalizes the first character and ensures terminal punctuation.
pub fn format_for_display(reason: &str) -> String {
	let reason = reason.trim();
	let reason = if reason.is_empty() {
		GENERIC_FAILURE
	} else {
		reason
	};

	let mut chars = reason.chars();
	let mut formatted = match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
		None => String::new(),
	};

	if !formatted.ends_with(['.', '!', '?']) {
		formatted.push('.');
	}
	formatted
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}

fn is_hex_blob(value: &str) -> bool {
	value
		.strip_prefix("0x")
		.is_some_and(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()))
}
