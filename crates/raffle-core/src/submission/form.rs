//! Raw raffle input and its validation.
//!
//! A [`RaffleForm`] holds exactly what the user wrote, typically in a TOML or
//! JSON file. [`RaffleForm::validate`] checks every field, collects all
//! problems at once, and converts the form into a [`RaffleRequest`] with
//! times in seconds and amounts in base units. Nothing here touches the
//! network.

use super::request::{RaffleRequest, RaffleVariant};
use crate::approval::parse_token_id;
use alloy_primitives::{Address, U256};
use chrono::{DateTime, NaiveDateTime};
use raffle_types::{parse_address, parse_token_amount, ETH_DECIMALS};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Smallest accepted ticket price: 0.00000001 ETH.
const MIN_TICKET_PRICE_WEI: u64 = 10_000_000_000;

/// Kinds of raffle the deployer can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaffleKind {
	#[serde(alias = "non_prized")]
	Whitelist,
	NewErc721Drop,
	ExistingErc721Drop,
	LuckySaleErc721,
	#[serde(alias = "erc1155_drop")]
	LuckySaleErc1155,
	EthGiveaway,
	Erc20Giveaway,
}

impl RaffleKind {
	fn accepts_ticket_price(self) -> bool {
		!matches!(
			self,
			RaffleKind::Whitelist | RaffleKind::EthGiveaway | RaffleKind::Erc20Giveaway
		)
	}
}

/// User input for a new raffle.
///
/// Numeric fields may be written as numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleForm {
	pub kind: RaffleKind,
	#[serde(default, deserialize_with = "lenient_string")]
	pub name: Option<String>,
	/// RFC 3339, or `YYYY-MM-DDTHH:MM[:SS]` read as UTC, or Unix seconds.
	#[serde(default, deserialize_with = "lenient_string")]
	pub start_time: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	pub duration_minutes: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	pub ticket_limit: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	pub winners_count: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	pub max_tickets_per_participant: Option<String>,
	/// In ETH.
	#[serde(default, deserialize_with = "lenient_string")]
	pub ticket_price: Option<String>,

	/// Prize or drop collection.
	#[serde(default, deserialize_with = "lenient_string")]
	pub collection: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	pub token_id: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	pub units_per_winner: Option<String>,

	/// ERC-20 prize token.
	#[serde(default, deserialize_with = "lenient_string")]
	pub token: Option<String>,
	/// Giveaway amount in whole tokens or ETH.
	#[serde(default, deserialize_with = "lenient_string")]
	pub amount: Option<String>,

	#[serde(default, deserialize_with = "lenient_string")]
	pub collection_name: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	pub collection_symbol: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	pub base_uri: Option<String>,
	#[serde(default, deserialize_with = "lenient_string")]
	pub max_supply: Option<String>,
	/// Whole percent, 0 to 100.
	#[serde(default, deserialize_with = "lenient_string")]
	pub royalty_percent: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Integer(i64),
		Float(f64),
	}

	Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
		Raw::Text(text) => text,
		Raw::Integer(value) => value.to_string(),
		Raw::Float(value) => value.to_string(),
	}))
}

/// One invalid field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
	pub field: &'static str,
	pub message: String,
}

/// Every problem found in a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
	pub errors: Vec<FieldError>,
}

impl ValidationErrors {
	fn push(&mut self, field: &'static str, message: impl Into<String>) {
		self.errors.push(FieldError {
			field,
			message: message.into(),
		});
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	/// Message recorded for a field, if any.
	pub fn get(&self, field: &str) -> Option<&str> {
		self.errors
			.iter()
			.find(|error| error.field == field)
			.map(|error| error.message.as_str())
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
		write!(f, "{}", messages.join("; "))
	}
}

impl std::error::Error for ValidationErrors {}

fn present(value: &Option<String>) -> Option<&str> {
	value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

/// Parses a start time into Unix seconds.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (UTC), or plain Unix seconds.
pub fn parse_start_time(input: &str) -> Option<u64> {
	let input = input.trim();
	if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
		return input.parse().ok();
	}

	let naive_utc = |format: &str| {
		NaiveDateTime::parse_from_str(input, format).map(|time| time.and_utc().timestamp())
	};
	let timestamp = DateTime::parse_from_rfc3339(input)
		.map(|time| time.timestamp())
		.or_else(|_| naive_utc("%Y-%m-%dT%H:%M:%S"))
		.or_else(|_| naive_utc("%Y-%m-%dT%H:%M"))
		.ok()?;

	u64::try_from(timestamp).ok()
}

struct Checker<'a> {
	form: &'a RaffleForm,
	errors: ValidationErrors,
}

impl Checker<'_> {
	fn required(
		&mut self,
		field: &'static str,
		value: &Option<String>,
		message: &str,
	) -> Option<String> {
		match present(value) {
			Some(value) => Some(value.to_string()),
			None => {
				self.errors.push(field, message);
				None
			},
		}
	}

	fn positive(&mut self, field: &'static str, value: &Option<String>, label: &str) -> Option<u64> {
		let Some(text) = present(value) else {
			self.errors.push(field, format!("{} is required", label));
			return None;
		};
		match text.parse::<u64>() {
			Ok(number) if number >= 1 => Some(number),
			_ => {
				self.errors.push(field, format!("{} must be a positive whole number", label));
				None
			},
		}
	}

	fn optional_positive(
		&mut self,
		field: &'static str,
		value: &Option<String>,
		label: &str,
	) -> Option<Option<u64>> {
		if present(value).is_none() {
			return Some(None);
		}
		self.positive(field, value, label).map(Some)
	}

	fn address(
		&mut self,
		field: &'static str,
		value: &Option<String>,
		label: &str,
	) -> Option<Address> {
		let Some(text) = present(value) else {
			self.errors.push(field, format!("{} address is required", label));
			return None;
		};
		match parse_address(text) {
			Ok(address) => Some(address),
			Err(_) => {
				self.errors.push(field, format!("Invalid {} address", label.to_lowercase()));
				None
			},
		}
	}

	fn token_id(&mut self) -> Option<U256> {
		let Some(text) = present(&self.form.token_id) else {
			self.errors.push("token_id", "Token ID is required");
			return None;
		};
		let token_id = parse_token_id(text);
		if token_id.is_none() {
			self.errors.push("token_id", "Enter a valid token ID");
		}
		token_id
	}

	fn amount(&mut self, decimals: u8) -> Option<U256> {
		let Some(text) = present(&self.form.amount) else {
			self.errors.push("amount", "Prize amount is required");
			return None;
		};
		match parse_token_amount(text, decimals) {
			Ok(amount) if !amount.is_zero() => Some(amount),
			_ => {
				self.errors.push("amount", "Enter a valid amount");
				None
			},
		}
	}

	fn ticket_price(&mut self) -> Option<U256> {
		let Some(text) = present(&self.form.ticket_price) else {
			return Some(U256::ZERO);
		};
		if !self.form.kind.accepts_ticket_price() {
			self.errors.push("ticket_price", "Ticket price is not supported for this raffle type");
			return None;
		}
		match parse_token_amount(text, ETH_DECIMALS) {
			Ok(price) if price >= U256::from(MIN_TICKET_PRICE_WEI) => Some(price),
			Ok(_) => {
				self.errors.push("ticket_price", "Ticket price must be at least 0.00000001 ETH");
				None
			},
			Err(_) => {
				self.errors.push("ticket_price", "Invalid ticket price");
				None
			},
		}
	}

	fn royalty_bps(&mut self) -> Option<u64> {
		let Some(text) = present(&self.form.royalty_percent) else {
			return Some(0);
		};
		match text.parse::<u64>() {
			Ok(percent) if percent <= 100 => Some(percent * 100),
			_ => {
				self.errors.push(
					"royalty_percent",
					"Royalty must be a whole percentage between 0 and 100",
				);
				None
			},
		}
	}
}

impl RaffleForm {
	/// Validates the form and converts it to chain units.
	///
	/// ERC-20 giveaway amounts use `token_decimals`; ticket prices and ETH
	/// amounts always use 18.
	pub fn validate(&self, token_decimals: u8) -> Result<RaffleRequest, ValidationErrors> {
		let mut checker = Checker {
			form: self,
			errors: ValidationErrors::default(),
		};

		let name = checker.required("name", &self.name, "Raffle name is required");

		let start_time = match present(&self.start_time) {
			None => {
				checker.errors.push("start_time", "Start time is required");
				None
			},
			Some(text) => {
				let parsed = parse_start_time(text);
				if parsed.is_none() {
					checker.errors.push("start_time", "Invalid start time");
				}
				parsed
			},
		};

		let duration_minutes = checker.positive("duration_minutes", &self.duration_minutes, "Duration");
		let ticket_limit = checker.positive("ticket_limit", &self.ticket_limit, "Ticket limit");
		let winners_count = checker.positive("winners_count", &self.winners_count, "Winners count");
		let max_tickets = checker.positive(
			"max_tickets_per_participant",
			&self.max_tickets_per_participant,
			"Max tickets per participant",
		);
		let ticket_price = checker.ticket_price();

		let variant = self.validate_variant(&mut checker, token_decimals, winners_count, ticket_price);

		let errors = checker.errors;
		match (name, start_time, duration_minutes, ticket_limit, winners_count, max_tickets, variant) {
			(
				Some(name),
				Some(start_time),
				Some(duration_minutes),
				Some(ticket_limit),
				Some(winners_count),
				Some(max_tickets_per_participant),
				Some(variant),
			) if errors.is_empty() => Ok(RaffleRequest {
				name,
				start_time,
				duration: duration_minutes.saturating_mul(60),
				ticket_limit,
				winners_count,
				max_tickets_per_participant,
				variant,
			}),
			_ => Err(errors),
		}
	}

	fn validate_variant(
		&self,
		checker: &mut Checker<'_>,
		token_decimals: u8,
		winners_count: Option<u64>,
		ticket_price: Option<U256>,
	) -> Option<RaffleVariant> {
		match self.kind {
			RaffleKind::Whitelist => Some(RaffleVariant::Whitelist),
			RaffleKind::NewErc721Drop => {
				let collection_name = checker.required(
					"collection_name",
					&self.collection_name,
					"Collection name is required",
				);
				let collection_symbol = checker.required(
					"collection_symbol",
					&self.collection_symbol,
					"Collection symbol is required",
				);
				let max_supply = checker.optional_positive("max_supply", &self.max_supply, "Max supply");
				let royalty_bps = checker.royalty_bps();

				Some(RaffleVariant::NewErc721Drop {
					collection_name: collection_name?,
					collection_symbol: collection_symbol?,
					base_uri: present(&self.base_uri).unwrap_or_default().to_string(),
					max_supply: max_supply?.or(winners_count)?,
					royalty_bps: royalty_bps?,
					ticket_price: ticket_price?,
				})
			},
			RaffleKind::ExistingErc721Drop => {
				let collection = checker.address("collection", &self.collection, "Collection");
				Some(RaffleVariant::ExistingErc721Drop {
					collection: collection?,
					ticket_price: ticket_price?,
				})
			},
			RaffleKind::LuckySaleErc721 => {
				let collection = checker.address("collection", &self.collection, "Collection");
				let token_id = checker.token_id();
				Some(RaffleVariant::LuckySaleErc721 {
					collection: collection?,
					token_id: token_id?,
					ticket_price: ticket_price?,
				})
			},
			RaffleKind::LuckySaleErc1155 => {
				let collection = checker.address("collection", &self.collection, "Collection");
				let token_id = checker.token_id();
				let units = checker.optional_positive(
					"units_per_winner",
					&self.units_per_winner,
					"Units per winner",
				);
				Some(RaffleVariant::LuckySaleErc1155 {
					collection: collection?,
					token_id: token_id?,
					units_per_winner: units?.unwrap_or(1),
					ticket_price: ticket_price?,
				})
			},
			RaffleKind::EthGiveaway => {
				let amount = checker.amount(ETH_DECIMALS);
				Some(RaffleVariant::EthGiveaway { amount: amount? })
			},
			RaffleKind::Erc20Giveaway => {
				let token = checker.address("token", &self.token, "Token");
				let amount = checker.amount(token_decimals);
				Some(RaffleVariant::Erc20Giveaway {
					token: token?,
					amount: amount?,
				})
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn form(kind: RaffleKind) -> RaffleForm {
		RaffleForm {
			kind,
			name: Some("Genesis".into()),
			start_time: Some("2025-01-01T00:00:00Z".into()),
			duration_minutes: Some("60".into()),
			ticket_limit: Some("100".into()),
			winners_count: Some("3".into()),
			max_tickets_per_participant: Some("5".into()),
			ticket_price: None,
			collection: None,
			token_id: None,
			units_per_winner: None,
			token: None,
			amount: None,
			collection_name: None,
			collection_symbol: None,
			base_uri: None,
			max_supply: None,
			royalty_percent: None,
		}
	}

	#[test]
	fn test_schedule_is_converted_to_seconds() {
		let request = form(RaffleKind::Whitelist).validate(18).unwrap();

		assert_eq!(request.start_time, 1735689600);
		assert_eq!(request.duration, 3600);
		assert_eq!(request.variant, RaffleVariant::Whitelist);
	}

	#[test]
	fn test_start_time_formats() {
		assert_eq!(parse_start_time("2025-01-01T00:00:00Z"), Some(1735689600));
		assert_eq!(parse_start_time("2025-01-01T02:00:00+02:00"), Some(1735689600));
		assert_eq!(parse_start_time("2025-01-01T00:00"), Some(1735689600));
		assert_eq!(parse_start_time("2025-01-01T00:00:30"), Some(1735689630));
		assert_eq!(parse_start_time("1735689600"), Some(1735689600));
		assert_eq!(parse_start_time("next tuesday"), None);
		assert_eq!(parse_start_time("1960-01-01T00:00:00Z"), None);
	}

	#[test]
	fn test_missing_fields_are_all_reported() {
		let mut raw = form(RaffleKind::Whitelist);
		raw.name = Some("  ".into());
		raw.start_time = None;
		raw.duration_minutes = Some("0".into());
		raw.winners_count = Some("-2".into());

		let errors = raw.validate(18).unwrap_err();

		assert_eq!(errors.get("name"), Some("Raffle name is required"));
		assert_eq!(errors.get("start_time"), Some("Start time is required"));
		assert_eq!(errors.get("duration_minutes"), Some("Duration must be a positive whole number"));
		assert_eq!(
			errors.get("winners_count"),
			Some("Winners count must be a positive whole number")
		);
		assert_eq!(errors.errors.len(), 4);
	}

	#[test]
	fn test_invalid_address_rejected() {
		let mut raw = form(RaffleKind::Erc20Giveaway);
		raw.token = Some("not-an-address".into());
		raw.amount = Some("10".into());

		let errors = raw.validate(18).unwrap_err();

		assert_eq!(errors.get("token"), Some("Invalid token address"));
	}

	#[test]
	fn test_ticket_price_bounds() {
		let mut raw = form(RaffleKind::ExistingErc721Drop);
		raw.collection = Some("0x5FbDB2315678afecb367f032d93F642f64180aa3".into());

		raw.ticket_price = Some("0.000000001".into());
		assert_eq!(
			raw.validate(18).unwrap_err().get("ticket_price"),
			Some("Ticket price must be at least 0.00000001 ETH")
		);

		raw.ticket_price = Some("0.00000001".into());
		let request = raw.validate(18).unwrap();
		assert_eq!(
			request.variant,
			RaffleVariant::ExistingErc721Drop {
				collection: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
				ticket_price: U256::from(MIN_TICKET_PRICE_WEI),
			}
		);
	}

	#[test]
	fn test_ticket_price_not_allowed_on_giveaways() {
		let mut raw = form(RaffleKind::EthGiveaway);
		raw.amount = Some("1".into());
		raw.ticket_price = Some("0.01".into());

		let errors = raw.validate(18).unwrap_err();

		assert!(errors.get("ticket_price").is_some());
	}

	#[test]
	fn test_erc20_amount_uses_token_decimals() {
		let mut raw = form(RaffleKind::Erc20Giveaway);
		raw.token = Some("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".into());
		raw.amount = Some("2.5".into());

		let request = raw.validate(6).unwrap();

		assert_eq!(
			request.variant,
			RaffleVariant::Erc20Giveaway {
				token: address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
				amount: U256::from(2_500_000u64),
			}
		);
	}

	#[test]
	fn test_zero_giveaway_amount_rejected() {
		let mut raw = form(RaffleKind::EthGiveaway);
		raw.amount = Some("0".into());

		assert_eq!(raw.validate(18).unwrap_err().get("amount"), Some("Enter a valid amount"));
	}

	#[test]
	fn test_new_drop_defaults() {
		let mut raw = form(RaffleKind::NewErc721Drop);
		raw.collection_name = Some("Genesis Pass".into());
		raw.collection_symbol = Some("GEN".into());
		raw.royalty_percent = Some("5".into());

		let request = raw.validate(18).unwrap();

		match request.variant {
			RaffleVariant::NewErc721Drop {
				max_supply,
				royalty_bps,
				ref base_uri,
				..
			} => {
				assert_eq!(max_supply, 3);
				assert_eq!(royalty_bps, 500);
				assert!(base_uri.is_empty());
			},
			other => panic!("unexpected variant {:?}", other),
		}
	}

	#[test]
	fn test_new_drop_requires_metadata() {
		let mut raw = form(RaffleKind::NewErc721Drop);
		raw.royalty_percent = Some("101".into());

		let errors = raw.validate(18).unwrap_err();

		assert!(errors.get("collection_name").is_some());
		assert!(errors.get("collection_symbol").is_some());
		assert!(errors.get("royalty_percent").is_some());
	}

	#[test]
	fn test_erc1155_units_default_to_one() {
		let mut raw = form(RaffleKind::LuckySaleErc1155);
		raw.collection = Some("0x5FbDB2315678afecb367f032d93F642f64180aa3".into());
		raw.token_id = Some("4".into());

		let request = raw.validate(18).unwrap();

		assert!(matches!(
			request.variant,
			RaffleVariant::LuckySaleErc1155 {
				units_per_winner: 1,
				..
			}
		));
	}

	#[test]
	fn test_toml_form_with_numbers_and_aliases() {
		let raw: RaffleForm = toml::from_str(
			r#"
kind = "erc1155_drop"
name = "Multi"
start_time = "2025-01-01T00:00:00Z"
duration_minutes = 60
ticket_limit = 100
winners_count = 2
max_tickets_per_participant = 1
ticket_price = 0.01
collection = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
token_id = 0
units_per_winner = 3
"#,
		)
		.unwrap();

		let request = raw.validate(18).unwrap();

		assert_eq!(request.duration, 3600);
		assert_eq!(
			request.variant,
			RaffleVariant::LuckySaleErc1155 {
				collection: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
				token_id: U256::ZERO,
				units_per_winner: 3,
				ticket_price: U256::from(10_000_000_000_000_000u64),
			}
		);
	}

	#[test]
	fn test_json_form() {
		let raw: RaffleForm = serde_json::from_str(
			r#"{"kind":"non_prized","name":"Allowlist","start_time":"1735689600","duration_minutes":"30","ticket_limit":"50","winners_count":"10","max_tickets_per_participant":"1"}"#,
		)
		.unwrap();

		let request = raw.validate(18).unwrap();

		assert_eq!(request.variant, RaffleVariant::Whitelist);
		assert_eq!(request.duration, 1800);
	}
}
