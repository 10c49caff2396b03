//! Common types module for the transaction verifier.
//!
//! This module defines the data types shared by the configuration layer,
//! the explorer pipeline and the command-line service, so that every crate
//! agrees on how networks, results and failures are represented.

/// Error vocabulary shared by every verification stage.
pub mod error;
/// Network selector and its string forms.
pub mod network;
/// Normalized verification result.
pub mod transaction;
/// Utility functions for hex and quantity handling.
pub mod utils;

pub use error::{BoxError, Status, VerifierError};
pub use network::{Network, NetworkParseError};
pub use transaction::TransactionData;
pub use utils::{
	cleanup_remote_hash, parse_hex_quantity, parse_quantity, truncate_id, QuantityError,
};
