//! Shared HTTP client construction for provider requests.

use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::SearchError;

/// Build a [`reqwest::Client`] for geocoding requests.
///
/// The client has:
/// - Timeout from config (applies to the whole request)
/// - The configured identifying User-Agent
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Send a prepared request and return the body of a 2xx response.
///
/// `label` names the provider in error messages. Request URLs are kept out
/// of the messages because they may carry an access token.
pub(crate) async fn fetch_text(
    request: reqwest::RequestBuilder,
    label: &str,
) -> Result<String, SearchError> {
    let response = request
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("{label} request failed: {}", e.without_url())))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Http(format!("{label} returned HTTP {status}")));
    }

    response.text().await.map_err(|e| {
        SearchError::Http(format!("{label} response read failed: {}", e.without_url()))
    })
}
