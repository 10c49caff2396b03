//! HTTP transport backed by `reqwest`.

use super::{ExplorerTransport, TransportError};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

/// Transport sending explorer requests over HTTP(S).
///
/// The client is created once and reused so connections are pooled across
/// lookups.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
}

impl HttpTransport {
	/// Creates a transport whose requests are bounded by `timeout`.
	pub fn new(timeout: Duration) -> Result<Self, TransportError> {
		let client = reqwest::Client::builder()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(10)
			.timeout(timeout)
			.build()?;

		Ok(Self { client })
	}
}

#[async_trait]
impl ExplorerTransport for HttpTransport {
	async fn get(&self, url: &Url) -> Result<String, TransportError> {
		let response = self
			.client
			.get(url.clone())
			.send()
			.await?
			.error_for_status()?;

		Ok(response.text().await?)
	}
}
