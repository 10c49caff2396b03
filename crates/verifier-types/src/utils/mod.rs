//! Utility functions for hex strings and explorer quantities.

pub mod conversion;
pub mod formatting;

pub use conversion::{parse_hex_quantity, parse_quantity, QuantityError};
pub use formatting::{cleanup_remote_hash, truncate_id};
