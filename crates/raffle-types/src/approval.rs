//! Approval workflow outcome.

use crate::TransactionReceipt;
use serde::{Deserialize, Serialize};

/// Outcome of one approval workflow invocation.
///
/// `error_message` is present exactly when `success` is false; the
/// constructors are the only way the workflow builds a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResult {
	pub success: bool,
	/// True when no approval transaction was needed.
	pub already_approved: bool,
	pub transaction_receipt: Option<TransactionReceipt>,
	pub error_message: Option<String>,
}

impl ApprovalResult {
	/// The spender could already move the prize.
	pub fn already_approved() -> Self {
		Self {
			success: true,
			already_approved: true,
			transaction_receipt: None,
			error_message: None,
		}
	}

	/// A new approval transaction was confirmed.
	pub fn approved(receipt: TransactionReceipt) -> Self {
		Self {
			success: true,
			already_approved: false,
			transaction_receipt: Some(receipt),
			error_message: None,
		}
	}

	pub fn failed(message: impl Into<String>) -> Self {
		Self {
			success: false,
			already_approved: false,
			transaction_receipt: None,
			error_message: Some(message.into()),
		}
	}
}
