//! Core workflows of the raffle client.
//!
//! This crate turns user input into raffle contracts on chain. It contains
//! the error classifier that produces every user-facing failure message,
//! the token approval workflow, raffle creation and the raffle browser, plus
//! [`RaffleClient`], which wires them together from a configuration.

pub mod approval;
pub mod browse;
pub mod client;
pub mod errors;
pub mod submission;

pub use approval::ApprovalWorkflow;
pub use browse::{BrowseError, RaffleBrowser};
pub use client::{ClientError, RaffleClient};
pub use errors::{classify, extract_reason, RawError};
pub use submission::{
	RaffleCreated, RaffleForm, RaffleKind, RaffleRequest, RaffleSubmitter, RaffleVariant,
	SubmissionError, ValidationErrors,
};
