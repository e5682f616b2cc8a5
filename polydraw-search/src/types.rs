//! Core types for place search queries, results, and outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SearchError;

/// A longitude/latitude pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Geocoding providers queried by the aggregator.
///
/// Declaration order is merge priority: results from `Mapbox` win over
/// `Nominatim` when both land in the same dedup cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// Mapbox Geocoding v5 (commercial, supports proximity bias).
    Mapbox,
    /// OpenStreetMap Nominatim (open data, no bias support).
    Nominatim,
}

impl Provider {
    /// Returns the human-readable name of this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mapbox => "Mapbox",
            Self::Nominatim => "Nominatim",
        }
    }

    /// Whether the provider accepts a proximity bias coordinate.
    pub fn supports_bias(&self) -> bool {
        matches!(self, Self::Mapbox)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A place-name lookup: trimmed text plus an optional bias (map center).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<Coordinate>,
}

impl SearchQuery {
    /// Build a query from raw input. Surrounding whitespace is dropped.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.trim().to_owned(),
            bias: None,
        }
    }

    /// Attach a proximity bias coordinate.
    #[must_use]
    pub fn with_bias(mut self, center: Coordinate) -> Self {
        self.bias = Some(center);
        self
    }

    /// Whether the text is long enough to be sent to the providers.
    ///
    /// Length is counted in UTF-16 code units, the unit browser input fields
    /// report, so a single emoji already counts as two characters.
    pub fn is_searchable(&self, min_chars: usize) -> bool {
        self.text.encode_utf16().count() >= min_chars
    }
}

/// A normalised place candidate returned by one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Short display name (e.g. "Paris").
    pub name: String,
    /// Full descriptive label (e.g. "Paris, Île-de-France, France").
    pub detail: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Which provider returned this result.
    pub source: Provider,
}

impl SearchResult {
    /// The ~100 m grid cell this result falls into.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.latitude, self.longitude)
    }
}

/// Coordinate fingerprint: latitude and longitude rounded to 3 decimals.
///
/// Stored as integer thousandths so that values either side of zero that
/// round to zero share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    lat_milli: i64,
    lng_milli: i64,
}

impl DedupKey {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            lat_milli: round_milli(latitude),
            lng_milli: round_milli(longitude),
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}",
            format_milli(self.lat_milli),
            format_milli(self.lng_milli)
        )
    }
}

fn round_milli(value: f64) -> i64 {
    (value * 1000.0).round() as i64
}

fn format_milli(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    format!("{sign}{}.{:03}", abs / 1000, abs % 1000)
}

/// Sequence number identifying one dispatched search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a single provider contributed to a search.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    /// The provider answered; the list may be empty.
    Returned(Vec<SearchResult>),
    /// The provider failed; it contributes no results.
    Failed(SearchError),
    /// The provider was not called because its circuit is open.
    Skipped,
}

impl ProviderOutcome {
    /// The results to merge from this provider (empty unless `Returned`).
    pub fn results(&self) -> &[SearchResult] {
        match self {
            Self::Returned(results) => results,
            Self::Failed(_) | Self::Skipped => &[],
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Returned(_))
    }
}

/// A completed, non-stale search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub token: RequestToken,
    /// Merged, deduplicated, capped results in display order.
    pub results: Vec<SearchResult>,
    pub mapbox: ProviderOutcome,
    pub nominatim: ProviderOutcome,
}

impl SearchReport {
    /// Both providers failed or were skipped.
    ///
    /// The external behaviour is identical to a genuine empty match; this
    /// accessor only exists for diagnostics.
    pub fn all_providers_failed(&self) -> bool {
        self.mapbox.is_failure() && self.nominatim.is_failure()
    }
}

/// Result of one call to [`crate::PlaceSearcher::search`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The query was too short; nothing was sent and any shown list should
    /// be cleared.
    Cleared,
    /// A newer search started before this one finished. Say nothing.
    Stale { token: RequestToken },
    /// The search completed but produced nothing to show.
    NoResults(SearchReport),
    /// The search completed with at least one result.
    Found(SearchReport),
}

impl SearchOutcome {
    /// Results to render, if this outcome should update the list.
    pub fn results(&self) -> Option<&[SearchResult]> {
        match self {
            Self::Found(report) => Some(&report.results),
            Self::NoResults(_) | Self::Cleared => Some(&[]),
            Self::Stale { .. } => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    pub fn token(&self) -> Option<RequestToken> {
        match self {
            Self::Cleared => None,
            Self::Stale { token } => Some(*token),
            Self::NoResults(report) | Self::Found(report) => Some(report.token),
        }
    }
}
