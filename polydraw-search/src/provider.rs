//! Trait definition for pluggable geocoding backends.
//!
//! Mapbox and Nominatim implement [`GeocodingProvider`]; tests substitute
//! scripted implementations to control timing and failures.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::{Provider, SearchQuery, SearchResult};

/// A geocoding backend returning normalised place candidates.
///
/// Each provider handles its own:
///
/// - URL construction with query encoding
/// - HTTP request with appropriate parameters
/// - Decoding the provider's JSON shape into [`SearchResult`]
///
/// All implementations must be `Send + Sync` so both lookups can run
/// concurrently.
pub trait GeocodingProvider: Send + Sync {
    /// Look up `query`, returning at most `config.per_provider_limit`
    /// results in the provider's own ranking order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, the status is not 2xx,
    /// or the body cannot be decoded.
    fn lookup(
        &self,
        query: &SearchQuery,
        config: &SearchConfig,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// Which [`Provider`] this implementation represents.
    fn provider(&self) -> Provider;
}

/// First comma-separated segment of a long label, trimmed.
pub(crate) fn leading_segment(label: &str) -> &str {
    label.split(',').next().unwrap_or(label).trim()
}
