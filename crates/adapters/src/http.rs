//! Shared HTTP client construction and fetch helpers for source adapters.

use reqwest::Client;
use std::time::Duration;
use techdigest_domain::CrawlError;

/// Every outbound fetch carries this timeout; there are no retries and no
/// cross-request state.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("techdigest/", env!("CARGO_PKG_VERSION"));

/// Build the per-adapter HTTP client.
pub fn build_client() -> Client {
    Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to build HTTP client")
}

/// GET a URL and return its body, mapping transport and status failures onto
/// the crawl error taxonomy.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, CrawlError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CrawlError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status(status.as_u16()));
    }

    response
        .text()
        .await
        .map_err(|e| CrawlError::Network(e.to_string()))
}
