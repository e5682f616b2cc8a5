//! # polydraw-search
//!
//! Dual-source place search for Polygon Drawer.
//!
//! A query is sent to the Mapbox geocoder and to OpenStreetMap Nominatim
//! at the same time. The two ranked lists are normalised into
//! [`SearchResult`], interleaved one-for-one with Mapbox first, and
//! deduplicated on a ~100 m coordinate grid. Only the most recent search
//! may publish; answers to superseded queries are dropped silently.
//!
//! ## Design
//!
//! - [`PlaceSearcher`] owns its request sequencer, circuit breaker and
//!   cache; there is no process-global state
//! - A failing provider contributes zero results and never fails the search
//! - [`ProviderOutcome`] keeps "no matches" and "provider errored" apart for
//!   diagnostics, although both look the same to the user
//!
//! ## Security
//!
//! - Queries are logged only at trace level
//! - The Mapbox access token is redacted from `Debug` output and error messages

pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod types;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use orchestrator::search::PlaceSearcher;
pub use orchestrator::sequencer::RequestSequencer;
pub use provider::GeocodingProvider;
pub use types::{
    Coordinate, DedupKey, Provider, ProviderOutcome, RequestToken, SearchOutcome, SearchQuery,
    SearchReport, SearchResult,
};

/// Search both providers once with a throwaway aggregator.
///
/// Convenient for one-shot lookups; interactive callers should keep a
/// [`PlaceSearcher`] so the staleness guard, cache and circuit breaker
/// span successive queries.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Provider
/// failures are reported inside the returned [`SearchOutcome`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> polydraw_search::Result<()> {
/// let config = polydraw_search::SearchConfig::default();
/// let outcome = polydraw_search::search("Amsterdam", &config).await?;
/// for result in outcome.results().unwrap_or_default() {
///     println!("{} ({}, {})", result.name, result.latitude, result.longitude);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<SearchOutcome> {
    let searcher = PlaceSearcher::new(config.clone())?;
    Ok(searcher.search(&SearchQuery::new(query)).await)
}
