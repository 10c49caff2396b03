//! Scripted transport for tests.
//!
//! Replies are keyed by the `action` query parameter of the request, so a test
//! can describe one explorer response per pipeline stage. Every request is
//! recorded to let tests assert on ordering and on requests never sent.

use super::{ExplorerTransport, TransportError};
use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Reply returned for one explorer action.
#[derive(Debug, Clone)]
pub enum MockReply {
	/// Respond with this raw body.
	Body(String),
	/// Fail the request with a network error.
	Fail(String),
	/// Never respond.
	Hang,
}

/// Transport returning scripted replies.
#[derive(Debug, Default)]
pub struct MockTransport {
	replies: HashMap<String, MockReply>,
	requests: Mutex<Vec<Url>>,
}

impl MockTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the reply for requests carrying `action`.
	pub fn with_reply(mut self, action: &str, reply: MockReply) -> Self {
		self.replies.insert(action.to_string(), reply);
		self
	}

	/// Replies to `action` with a JSON-RPC style envelope around `result`.
	pub fn with_result(self, action: &str, result: serde_json::Value) -> Self {
		let body = serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": result });
		self.with_reply(action, MockReply::Body(body.to_string()))
	}

	/// Returns every URL requested so far, in order.
	pub fn requests(&self) -> Vec<Url> {
		self.requests
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Returns the `action` of every request so far, in order.
	pub fn actions(&self) -> Vec<String> {
		self.requests().iter().map(action_of).collect()
	}
}

fn action_of(url: &Url) -> String {
	url.query_pairs()
		.find(|(key, _)| key == "action")
		.map(|(_, value)| value.into_owned())
		.unwrap_or_default()
}

#[async_trait]
impl ExplorerTransport for MockTransport {
	async fn get(&self, url: &Url) -> Result<String, TransportError> {
		self.requests
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(url.clone());

		let action = action_of(url);
		match self.replies.get(&action).cloned() {
			Some(MockReply::Body(body)) => Ok(body),
			Some(MockReply::Fail(message)) => Err(TransportError::Network(message)),
			Some(MockReply::Hang) => std::future::pending::<Result<String, TransportError>>().await,
			None => Err(TransportError::Network(format!(
				"No mock reply for action '{}'",
				action
			))),
		}
	}
}
