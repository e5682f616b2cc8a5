//! Mapbox Geocoding v5: commercial geocoder, Provider A.
//!
//! Supports a proximity bias so results near the current map center rank
//! first. Requires an access token.

use serde::Deserialize;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::{leading_segment, GeocodingProvider};
use crate::types::{Provider, SearchQuery, SearchResult};

/// Feature types requested from Mapbox, broadest to most specific.
const PLACE_TYPES: &str = "country,region,postcode,district,place,locality,neighborhood,address,poi";

/// Mapbox `mapbox.places` forward geocoder.
pub struct MapboxProvider {
    client: reqwest::Client,
}

impl MapboxProvider {
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl GeocodingProvider for MapboxProvider {
    async fn lookup(
        &self,
        query: &SearchQuery,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let token = config
            .access_token()
            .ok_or_else(|| SearchError::Config("Mapbox access token is not configured".into()))?;

        tracing::trace!(query = %query.text, "Mapbox lookup");

        let url = endpoint(&config.mapbox_base_url, &query.text)?;
        let params = query_params(token, query, config);

        let body = http::fetch_text(self.client.get(url).query(&params), "Mapbox").await?;
        tracing::trace!(bytes = body.len(), "Mapbox response received");

        parse_mapbox_json(&body, config.per_provider_limit)
    }

    fn provider(&self) -> Provider {
        Provider::Mapbox
    }
}

/// `{base}/geocoding/v5/mapbox.places/{query}.json`, with the query
/// percent-encoded as a single path segment.
fn endpoint(base: &str, text: &str) -> Result<Url, SearchError> {
    let mut url = Url::parse(base)
        .map_err(|e| SearchError::Config(format!("invalid Mapbox base URL: {e}")))?;
    let file = format!("{text}.json");
    url.path_segments_mut()
        .map_err(|()| SearchError::Config("Mapbox base URL cannot be a base".into()))?
        .pop_if_empty()
        .extend(["geocoding", "v5", "mapbox.places", file.as_str()]);
    Ok(url)
}

fn query_params(
    token: &str,
    query: &SearchQuery,
    config: &SearchConfig,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("access_token", token.to_owned()),
        ("autocomplete", "true".to_owned()),
        ("fuzzyMatch", "true".to_owned()),
        ("limit", config.per_provider_limit.to_string()),
        ("types", PLACE_TYPES.to_owned()),
    ];
    if let Some(center) = query.bias {
        params.push((
            "proximity",
            format!("{},{}", center.longitude, center.latitude),
        ));
    }
    if let Some(ref language) = config.language {
        params.push(("language", language.clone()));
    }
    params
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    place_name: Option<String>,
    #[serde(default)]
    center: Vec<f64>,
}

/// Decode a Mapbox geocoding response into search results.
///
/// Features without a `[lng, lat]` center or without any usable name are
/// skipped.
pub(crate) fn parse_mapbox_json(
    body: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let collection: FeatureCollection = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("Mapbox response: {e}")))?;

    let results = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let (longitude, latitude) = match feature.center.as_slice() {
                [lng, lat, ..] if lng.is_finite() && lat.is_finite() => (*lng, *lat),
                _ => return None,
            };
            let detail = feature.place_name.unwrap_or_default();
            let name = match feature.text.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => text.to_owned(),
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
                source: Provider::Mapbox,
            })
        })
        .take(max_results)
        .collect();

    Ok(results)
}
