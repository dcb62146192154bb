//! Error normalization for user-facing messages.
//!
//! Failures reach the client from several layers: JSON-RPC error objects
//! returned by the node, transport failures, signer errors and plain strings.
//! [`RawError`] gives them one shape so the [`classifier`] can turn any of
//! them into a single readable sentence.

pub mod classifier;

pub use classifier::{classify, extract_reason, format_for_display, GENERIC_FAILURE};

use alloy_primitives::hex;
use alloy_sol_types::{Panic, Revert, SolError};
use raffle_account::AccountError;
use raffle_delivery::DeliveryError;

/// Error shape understood by the classifier.
///
/// Mirrors the members commonly found on wallet and provider errors:
/// a message, a decoded revert reason, the raw `data` member and an
/// optional wrapped cause. `RawError::default()` stands for "no error
/// information at all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawError {
	pub message: String,
	pub reason: Option<String>,
	pub data: Option<String>,
	pub error: Option<Box<RawError>>,
}

impl RawError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			..Self::default()
		}
	}

	pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
		self.reason = Some(reason.into());
		self
	}

	pub fn with_data(mut self, data: impl Into<String>) -> Self {
		self.data = Some(data.into());
		self
	}

	/// Wraps an inner cause.
	pub fn caused_by(mut self, inner: RawError) -> Self {
		self.error = Some(Box::new(inner));
		self
	}
}

impl From<&str> for RawError {
	fn from(message: &str) -> Self {
		RawError::new(message)
	}
}

impl From<String> for RawError {
	fn from(message: String) -> Self {
		RawError::new(message)
	}
}

impl From<&DeliveryError> for RawError {
	fn from(err: &DeliveryError) -> Self {
		match err {
			DeliveryError::Rpc { message, data } => {
				let mut raw = RawError::new(message.clone());
				if let Some(data) = data {
					raw.reason = decode_revert_data(data);
					raw.data = Some(data.clone());
				}
				// Some nodes report a bare "execution reverted" and leave the
				// reason in the revert data.
				if let Some(reason) = &raw.reason {
					if message.trim().eq_ignore_ascii_case("execution reverted") {
						raw.message = format!("execution reverted: {}", reason);
					}
				}
				raw
			},
			DeliveryError::Network(_) => RawError::new(err.to_string()),
			DeliveryError::InvalidResponse(_)
			| DeliveryError::TransactionFailed(_)
			| DeliveryError::Timeout { .. }
			| DeliveryError::NoProviderAvailable(_) => {
				RawError::new(err.to_string()).with_reason(err.to_string())
			},
		}
	}
}

impl From<DeliveryError> for RawError {
	fn from(err: DeliveryError) -> Self {
		RawError::from(&err)
	}
}

impl From<&AccountError> for RawError {
	fn from(err: &AccountError) -> Self {
		RawError::new(err.to_string()).with_reason(err.to_string())
	}
}

impl From<AccountError> for RawError {
	fn from(err: AccountError) -> Self {
		RawError::from(&err)
	}
}

/// Decodes ABI revert data (`Error(string)`, `Panic(uint256)`) into text.
fn decode_revert_data(data: &str) -> Option<String> {
	let bytes = hex::decode(data.trim()).ok()?;
	if bytes.is_empty() {
		return None;
	}
	let reason = if let Ok(revert) = Revert::abi_decode(&bytes, true) {
		revert.reason
	} else if let Ok(panic) = Panic::abi_decode(&bytes, true) {
		match panic.kind() {
			Some(kind) => kind.to_string(),
			None => format!("panic code {}", panic.code),
		}
	} else {
		return None;
	};
	let reason = reason.trim();
	(!reason.is_empty()).then(|| reason.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;

	#[test]
	fn test_rpc_error_decodes_revert_data() {
		let payload = Revert {
			reason: "Insufficient allowance".to_string(),
		}
		.abi_encode();
		let err = DeliveryError::Rpc {
			message: "execution reverted".into(),
			data: Some(hex::encode_prefixed(payload)),
		};

		let raw = RawError::from(&err);

		assert_eq!(raw.message, "execution reverted: Insufficient allowance");
		assert_eq!(raw.reason.as_deref(), Some("Insufficient allowance"));
		assert_eq!(classify(&raw), "Insufficient allowance.");
		assert!(raw.data.as_deref().unwrap().starts_with("0x08c379a0"));
	}

	#[test]
	fn test_rpc_error_decodes_panic_data() {
		let payload = Panic {
			code: U256::from(0x11),
		}
		.abi_encode();
		let err = DeliveryError::Rpc {
			message: "execution reverted".into(),
			data: Some(hex::encode_prefixed(payload)),
		};

		let raw = RawError::from(&err);
		let reason = raw.reason.clone().unwrap();

		assert!(reason.contains("overflow"));
		assert!(!reason.starts_with("panic:"));
		assert_eq!(raw.message, format!("execution reverted: {}", reason));
	}

	#[test]
	fn test_rpc_error_with_unknown_selector() {
		let err = DeliveryError::Rpc {
			message: "execution reverted".into(),
			data: Some("0xdeadbeef".into()),
		};

		let raw = RawError::from(&err);

		assert_eq!(raw.reason, None);
		assert_eq!(raw.message, "execution reverted");
	}

	#[test]
	fn test_rpc_error_with_empty_data() {
		let err = DeliveryError::Rpc {
			message: "execution reverted".into(),
			data: Some("0x".into()),
		};

		let raw = RawError::from(&err);

		assert_eq!(raw.reason, None);
		assert_eq!(raw.data.as_deref(), Some("0x"));
	}

	#[test]
	fn test_timeout_carries_reason() {
		let err = DeliveryError::NoProviderAvailable(5);
		let raw = RawError::from(err);

		assert_eq!(raw.reason.as_deref(), Some("No provider available for chain 5"));
	}
}
