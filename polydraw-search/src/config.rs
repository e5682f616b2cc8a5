//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls provider endpoints, result limits, timeouts,
//! caching and the circuit breaker. Base URLs are configurable so tests can
//! point both providers at a local mock server.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::error::SearchError;

/// Default Mapbox API origin.
pub const MAPBOX_BASE_URL: &str = "https://api.mapbox.com";

/// Default public Nominatim instance.
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Configuration for the place search aggregator.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Mapbox access token. Without it the Mapbox provider fails every
    /// lookup and only Nominatim results are shown.
    pub mapbox_access_token: Option<String>,
    pub mapbox_base_url: String,
    pub nominatim_base_url: String,
    /// Results requested from each provider.
    pub per_provider_limit: usize,
    /// Cap on the merged result list.
    pub max_results: usize,
    /// Queries shorter than this (in characters, after trimming) are not sent.
    pub min_query_chars: usize,
    /// Per-provider HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Preferred result language (e.g. `"nl"`), passed to both providers.
    pub language: Option<String>,
    /// User-Agent header. Nominatim's usage policy requires an identifying one.
    pub user_agent: String,
    /// How long successful provider answers are cached. 0 disables caching.
    pub cache_ttl_seconds: u64,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mapbox_access_token: None,
            mapbox_base_url: MAPBOX_BASE_URL.to_owned(),
            nominatim_base_url: NOMINATIM_BASE_URL.to_owned(),
            per_provider_limit: 5,
            max_results: 10,
            min_query_chars: 2,
            timeout_seconds: 8,
            language: None,
            user_agent: concat!("polydraw-search/", env!("CARGO_PKG_VERSION")).to_owned(),
            cache_ttl_seconds: 300,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

// Hand-written so the access token never ends up in logs.
impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field(
                "mapbox_access_token",
                &self.mapbox_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("mapbox_base_url", &self.mapbox_base_url)
            .field("nominatim_base_url", &self.nominatim_base_url)
            .field("per_provider_limit", &self.per_provider_limit)
            .field("max_results", &self.max_results)
            .field("min_query_chars", &self.min_query_chars)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("language", &self.language)
            .field("user_agent", &self.user_agent)
            .field("cache_ttl_seconds", &self.cache_ttl_seconds)
            .field("circuit_breaker", &self.circuit_breaker)
            .finish()
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results`, `per_provider_limit`, `min_query_chars` and
    ///   `timeout_seconds` must be greater than 0
    /// - both base URLs must parse as absolute URLs
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.per_provider_limit == 0 {
            return Err(SearchError::Config(
                "per_provider_limit must be greater than 0".into(),
            ));
        }
        if self.min_query_chars == 0 {
            return Err(SearchError::Config(
                "min_query_chars must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        for (name, raw) in [
            ("mapbox_base_url", &self.mapbox_base_url),
            ("nominatim_base_url", &self.nominatim_base_url),
        ] {
            url::Url::parse(raw)
                .map_err(|e| SearchError::Config(format!("{name} is not a valid URL: {e}")))?;
        }
        Ok(())
    }

    /// The configured token, ignoring blank values.
    pub fn access_token(&self) -> Option<&str> {
        self.mapbox_access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
