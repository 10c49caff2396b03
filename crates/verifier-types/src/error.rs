//! Verification error types.
//!
//! Every failure a verification can hit (transport, decoding, timeouts or an
//! insufficient confirmation depth) surfaces to callers as one
//! [`VerifierError`]. Callers branch on [`VerifierError::status`], never on the
//! message text. The underlying cause, when known, is kept as the error source.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Boxed error used to chain the cause of a verification failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Verification step a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum Status {
	/// Looking up the anchored hash through the block explorer.
	FetchingRemoteHash,
}

impl Status {
	/// Returns the status code as used in reports.
	pub fn as_str(&self) -> &'static str {
		match self {
			Status::FetchingRemoteHash => "fetchingRemoteHash",
		}
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The single error kind returned by a verification.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct VerifierError {
	status: Status,
	message: String,
	#[source]
	source: Option<BoxError>,
}

impl VerifierError {
	/// Creates an error without an underlying cause.
	pub fn new(status: Status, message: impl Into<String>) -> Self {
		Self {
			status,
			message: message.into(),
			source: None,
		}
	}

	/// Creates an error that keeps `source` as its cause.
	pub fn with_source(
		status: Status,
		message: impl Into<String>,
		source: impl Into<BoxError>,
	) -> Self {
		Self {
			status,
			message: message.into(),
			source: Some(source.into()),
		}
	}

	pub fn status(&self) -> Status {
		self.status
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}
