//! On-chain raffle lifecycle states and read-side summaries.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state reported by a raffle contract's `state()` getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaffleState {
	Pending,
	Active,
	Drawing,
	Completed,
	Ended,
}

impl RaffleState {
	/// Maps the contract's numeric state to a lifecycle state.
	///
	/// Codes 3 and 4 are both reported as completed. Any code the client
	/// does not know about is treated as ended.
	pub fn from_code(code: u8) -> Self {
		match code {
			0 => RaffleState::Pending,
			1 => RaffleState::Active,
			2 => RaffleState::Drawing,
			3 | 4 => RaffleState::Completed,
			_ => RaffleState::Ended,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			RaffleState::Pending => "pending",
			RaffleState::Active => "active",
			RaffleState::Drawing => "drawing",
			RaffleState::Completed => "completed",
			RaffleState::Ended => "ended",
		}
	}
}

impl fmt::Display for RaffleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RaffleState {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"pending" => Ok(RaffleState::Pending),
			"active" => Ok(RaffleState::Active),
			"drawing" => Ok(RaffleState::Drawing),
			"completed" => Ok(RaffleState::Completed),
			"ended" => Ok(RaffleState::Ended),
			other => Err(format!(
				"Unknown raffle state '{}'. Expected one of: pending, active, drawing, completed, ended",
				other
			)),
		}
	}
}

/// Snapshot of a single raffle as listed by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaffleSummary {
	pub address: Address,
	pub name: String,
	pub creator: Address,
	/// Unix timestamp in seconds.
	pub start_time: u64,
	/// Seconds.
	pub duration: u64,
	/// Wei.
	pub ticket_price: U256,
	pub ticket_limit: u64,
	pub tickets_sold: u64,
	pub winners_count: u64,
	pub max_tickets_per_participant: u64,
	pub is_prized: bool,
	/// Set only for prized raffles.
	pub prize_collection: Option<Address>,
	pub state: RaffleState,
}

impl RaffleSummary {
	/// Unix timestamp at which ticket sales close.
	pub fn end_time(&self) -> u64 {
		self.start_time.saturating_add(self.duration)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_state_codes() {
		assert_eq!(RaffleState::from_code(0), RaffleState::Pending);
		assert_eq!(RaffleState::from_code(1), RaffleState::Active);
		assert_eq!(RaffleState::from_code(2), RaffleState::Drawing);
		assert_eq!(RaffleState::from_code(3), RaffleState::Completed);
		assert_eq!(RaffleState::from_code(4), RaffleState::Completed);
		assert_eq!(RaffleState::from_code(5), RaffleState::Ended);
		assert_eq!(RaffleState::from_code(42), RaffleState::Ended);
	}

	#[test]
	fn test_state_parse_and_display() {
		for state in [
			RaffleState::Pending,
			RaffleState::Active,
			RaffleState::Drawing,
			RaffleState::Completed,
			RaffleState::Ended,
		] {
			assert_eq!(state.to_string().parse::<RaffleState>(), Ok(state));
		}
		assert_eq!("ACTIVE".parse::<RaffleState>(), Ok(RaffleState::Active));
		assert!("open".parse::<RaffleState>().is_err());
	}
}
