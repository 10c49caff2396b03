//! Transport used to reach the explorer service.
//!
//! The explorer only needs plain GET requests returning a text body, so the
//! transport is a single-method trait. This keeps the pipeline independent of
//! the HTTP client and lets tests script explorer responses.

use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;

pub mod http;
#[cfg(any(test, feature = "testing"))]
pub mod mock;

/// Errors that can occur while talking to the explorer service.
#[derive(Debug, Error)]
pub enum TransportError {
	/// Error raised by the HTTP client, including non-success status codes.
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
}

/// Trait defining how explorer requests are sent.
#[async_trait]
pub trait ExplorerTransport: Send + Sync {
	/// Performs a GET request and returns the response body.
	async fn get(&self, url: &Url) -> Result<String, TransportError>;
}
