//! OpenStreetMap Nominatim: open-data geocoder, Provider B.
//!
//! No bias support. Coordinates arrive as decimal strings.

use serde::Deserialize;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::{leading_segment, GeocodingProvider};
use crate::types::{Provider, SearchQuery, SearchResult};

/// Nominatim `/search` endpoint client.
pub struct NominatimProvider {
    client: reqwest::Client,
}

impl NominatimProvider {
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl GeocodingProvider for NominatimProvider {
    async fn lookup(
        &self,
        query: &SearchQuery,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query = %query.text, "Nominatim lookup");

        let mut url = Url::parse(&config.nominatim_base_url)
            .map_err(|e| SearchError::Config(format!("invalid Nominatim base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| SearchError::Config("Nominatim base URL cannot be a base".into()))?
            .pop_if_empty()
            .push("search");

        let mut params = vec![
            ("format", "json".to_owned()),
            ("q", query.text.clone()),
            ("limit", config.per_provider_limit.to_string()),
        ];
        if let Some(ref language) = config.language {
            params.push(("accept-language", language.clone()));
        }

        let body = http::fetch_text(self.client.get(url).query(&params), "Nominatim").await?;
        tracing::trace!(bytes = body.len(), "Nominatim response received");

        parse_nominatim_json(&body, config.per_provider_limit)
    }

    fn provider(&self) -> Provider {
        Provider::Nominatim
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    lon: Option<String>,
    #[serde(default)]
    lat: Option<String>,
}

fn parse_degrees(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Decode a Nominatim `format=json` response into search results.
///
/// Entries whose `lon`/`lat` do not parse, or that have no usable name,
/// are skipped.
pub(crate) fn parse_nominatim_json(
    body: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let places: Vec<Place> = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("Nominatim response: {e}")))?;

    let results = places
        .into_iter()
        .filter_map(|place| {
            let longitude = parse_degrees(place.lon.as_deref())?;
            let latitude = parse_degrees(place.lat.as_deref())?;
            let detail = place.display_name.unwrap_or_default();
            let name = match place.name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => name.to_owned(),
                _ => leading_segment(&detail).to_owned(),
            };
            if name.is_empty() {
                return None;
            }
            Some(SearchResult {
                name,
                detail,
                longitude,
                latitude,
                source: Provider::Nominatim,
            })
        })
        .take(max_results)
        .collect();

    Ok(results)
}
