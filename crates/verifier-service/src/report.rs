//! JSON reports printed for each verified transaction.

use serde::Serialize;
use std::error::Error;
use verifier_types::{Network, Status, TransactionData, VerifierError};

/// Outcome of verifying one transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
	pub transaction_id: String,
	pub network: Network,
	#[serde(flatten)]
	pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum Outcome {
	Verified {
		data: TransactionData,
	},
	Failed {
		status: Status,
		message: String,
		/// Messages of the underlying causes, outermost first.
		causes: Vec<String>,
	},
}

impl VerificationReport {
	pub fn new(
		transaction_id: &str,
		network: Network,
		result: Result<TransactionData, VerifierError>,
	) -> Self {
		let outcome = match result {
			Ok(data) => Outcome::Verified { data },
			Err(err) => Outcome::Failed {
				status: err.status(),
				message: err.message().to_string(),
				causes: error_causes(&err),
			},
		};

		Self {
			transaction_id: transaction_id.to_string(),
			network,
			outcome,
		}
	}

	pub fn is_verified(&self) -> bool {
		matches!(self.outcome, Outcome::Verified { .. })
	}
}

fn error_causes(err: &VerifierError) -> Vec<String> {
	let mut causes = Vec::new();
	let mut current = err.source();
	while let Some(cause) = current {
		causes.push(cause.to_string());
		current = cause.source();
	}
	causes
}
