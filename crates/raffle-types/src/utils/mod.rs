//! Utility functions for addresses, token units and display formatting.

pub mod conversion;
pub mod formatting;
pub mod units;

pub use conversion::{parse_address, AddressError};
pub use formatting::{format_token_amount, truncate_id, with_0x_prefix};
pub use units::{parse_token_amount, UnitsError, ETH_DECIMALS};
