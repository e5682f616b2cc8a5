//! Production host handler: place search, fly-to and drawing storage.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use polydraw_search::providers::{MapboxProvider, NominatimProvider};
use polydraw_search::{
    Coordinate, GeocodingProvider, PlaceSearcher, RequestSequencer, SearchOutcome, SearchQuery,
};
use serde_json::json;
use tokio::sync::broadcast;

use crate::area;
use crate::config::{MapConfig, PolydrawConfig};
use crate::drawing::{self, DrawingStore};
use crate::error::{PolydrawError, Result};
use crate::host::channel::{HostHandler, LocateReport, PlaceSelection, SearchRequest, StyleChoice};
use crate::host::contract::{EventEnvelope, events};
use crate::messages::{Locale, Message};

/// `GeolocationPositionError.PERMISSION_DENIED`.
const LOCATION_PERMISSION_DENIED: u16 = 1;

/// Host backend over a [`PlaceSearcher`] and a [`DrawingStore`].
///
/// Each `search.query` takes its request token immediately and runs the
/// lookups on a spawned task; the outcome is published as an event unless a
/// newer query (or a clear) superseded it meanwhile.
pub struct PolydrawHost<A = MapboxProvider, B = NominatimProvider> {
    searcher: Arc<PlaceSearcher<A, B>>,
    store: DrawingStore,
    map: MapConfig,
    style: Mutex<String>,
    locale: Locale,
    return_countdown_secs: u64,
    /// Where `map.style` persists the choice; in-memory only when `None`.
    config_path: Option<PathBuf>,
    runtime: tokio::runtime::Handle,
    event_tx: broadcast::Sender<EventEnvelope>,
}

impl PolydrawHost {
    /// Build a host with the real geocoders.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the HTTP client cannot be built.
    pub fn from_config(
        config: &PolydrawConfig,
        runtime: tokio::runtime::Handle,
        event_tx: broadcast::Sender<EventEnvelope>,
    ) -> Result<Self> {
        config.validate()?;
        let searcher = PlaceSearcher::new(config.effective_search_config())?;
        Ok(Self::with_searcher(searcher, config, runtime, event_tx))
    }
}

impl<A, B> PolydrawHost<A, B>
where
    A: GeocodingProvider + 'static,
    B: GeocodingProvider + 'static,
{
    pub fn with_searcher(
        searcher: PlaceSearcher<A, B>,
        config: &PolydrawConfig,
        runtime: tokio::runtime::Handle,
        event_tx: broadcast::Sender<EventEnvelope>,
    ) -> Self {
        Self {
            searcher: Arc::new(searcher),
            store: DrawingStore::new(config.storage.drawing_path.clone()),
            map: config.map.clone(),
            style: Mutex::new(config.map.style.clone()),
            locale: config.ui.locale,
            return_countdown_secs: config.ui.return_countdown_secs,
            config_path: None,
            runtime,
            event_tx,
        }
    }

    /// Persist `map.style` choices to the config file at `path`.
    #[must_use]
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn store(&self) -> &DrawingStore {
        &self.store
    }

    fn emit_event(&self, event: &str, payload: serde_json::Value) {
        emit(&self.event_tx, event, payload);
    }

    fn current_style(&self) -> String {
        self.style
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write `style` into the config file, keeping everything else in it.
    fn persist_style(&self, style: &str) -> Result<bool> {
        let Some(path) = self.config_path.as_deref() else {
            return Ok(false);
        };
        let mut config = PolydrawConfig::load_or_default(path)?;
        config.map.style = style.to_owned();
        config.save_to_file(path)?;
        tracing::debug!(path = %path.display(), style, "map style saved");
        Ok(true)
    }

    fn fly_to(&self, center: [f64; 2], zoom: f64) -> serde_json::Value {
        json!({
            "center": center,
            "zoom": zoom,
            "duration_ms": self.map.fly_duration_ms,
        })
    }
}

/// Silently drops the event if there are no active receivers.
fn emit(event_tx: &broadcast::Sender<EventEnvelope>, event: &str, payload: serde_json::Value) {
    let _ = event_tx.send(EventEnvelope::emit(event, payload));
}

/// Emit the event for a finished search.
///
/// The token is checked again right before sending so a clear that landed
/// after the searcher's own check still wins. Every search event carries its
/// token, and `search.cleared` carries the clearing token, so the UI can also
/// drop anything older than the last clear.
fn publish_outcome(
    event_tx: &broadcast::Sender<EventEnvelope>,
    sequencer: &RequestSequencer,
    outcome: SearchOutcome,
    locale: Locale,
) {
    let report = match outcome {
        SearchOutcome::Cleared => {
            emit(
                event_tx,
                events::SEARCH_CLEARED,
                json!({"token": sequencer.current()}),
            );
            return;
        }
        SearchOutcome::Stale { token } => {
            tracing::debug!(%token, "search superseded; not publishing");
            return;
        }
        SearchOutcome::NoResults(report) | SearchOutcome::Found(report) => report,
    };

    if !sequencer.is_current(report.token) {
        tracing::debug!(token = %report.token, "search superseded before publishing");
        return;
    }
    if report.results.is_empty() {
        emit(
            event_tx,
            events::SEARCH_NO_RESULTS,
            json!({
                "token": report.token,
                "message": locale.text(Message::NoLocationsFound),
            }),
        );
    } else {
        emit(
            event_tx,
            events::SEARCH_RESULTS,
            json!({"token": report.token, "results": report.results}),
        );
    }
}

fn bias_from(center: Option<[f64; 2]>) -> Option<Coordinate> {
    let [lng, lat] = center?;
    if lng.is_finite() && lat.is_finite() {
        Some(Coordinate::new(lng, lat))
    } else {
        tracing::debug!("ignoring non-finite map center");
        None
    }
}

fn check_lng_lat(command: &str, longitude: f64, latitude: f64) -> Result<()> {
    if (-180.0..=180.0).contains(&longitude) && (-90.0..=90.0).contains(&latitude) {
        Ok(())
    } else {
        Err(PolydrawError::Contract(format!(
            "{command} coordinates out of range: [{longitude}, {latitude}]"
        )))
    }
}

impl<A, B> HostHandler for PolydrawHost<A, B>
where
    A: GeocodingProvider + 'static,
    B: GeocodingProvider + 'static,
{
    fn search_query(&self, request: SearchRequest) -> Result<serde_json::Value> {
        let mut query = SearchQuery::new(&request.query);
        if let Some(center) = bias_from(request.center) {
            query = query.with_bias(center);
        }

        let Some(token) = self.searcher.begin(&query) else {
            let token = self.searcher.sequencer().current();
            self.emit_event(events::SEARCH_CLEARED, json!({"token": token}));
            return Ok(json!({"accepted": true, "cleared": true, "token": token}));
        };

        let searcher = Arc::clone(&self.searcher);
        let event_tx = self.event_tx.clone();
        let locale = self.locale;
        self.runtime.spawn(async move {
            let outcome = searcher.complete(&query, token).await;
            publish_outcome(&event_tx, &searcher.sequencer(), outcome, locale);
        });

        Ok(json!({"accepted": true, "token": token}))
    }

    fn search_select(&self, selection: PlaceSelection) -> Result<serde_json::Value> {
        let PlaceSelection {
            name,
            longitude,
            latitude,
        } = selection;
        check_lng_lat("search.select", longitude, latitude)?;
        Ok(json!({
            "input": name,
            "fly_to": self.fly_to([longitude, latitude], self.map.select_zoom),
        }))
    }

    fn search_clear(&self) -> Result<serde_json::Value> {
        let token = self.searcher.sequencer().next();
        tracing::trace!(%token, "search cleared by host");
        self.emit_event(events::SEARCH_CLEARED, json!({"token": token}));
        Ok(json!({"cleared": true, "token": token}))
    }

    fn drawing_save(&self, collection: &serde_json::Value) -> Result<serde_json::Value> {
        let saved = self.store.save(collection)?;
        Ok(json!({
            "saved": true,
            "features": saved.features.len(),
        }))
    }

    fn drawing_load(&self) -> Result<serde_json::Value> {
        Ok(json!({"collection": self.store.load()}))
    }

    fn drawing_clear(&self) -> Result<serde_json::Value> {
        if self.store.load_features().features.is_empty() {
            return Ok(json!({
                "cleared": false,
                "message": self.locale.text(Message::NothingToClear),
            }));
        }
        self.store.clear()?;
        Ok(json!({
            "cleared": true,
            "message": self.locale.text(Message::Cleared),
        }))
    }

    fn drawing_export(&self) -> Result<serde_json::Value> {
        let collection = self.store.load_features();
        match drawing::export_text(&collection, Utc::now())? {
            Some(geojson) => Ok(json!({
                "exported": true,
                "polygons": area::summarize(&collection, self.locale).polygons,
                "geojson": geojson,
                "return_to_form": {
                    "countdown_secs": self.return_countdown_secs,
                    "fallback_message": self.locale.text(Message::CloseTabManually),
                    "close_label": self.locale.text(Message::CloseTab),
                },
            })),
            None => Ok(json!({
                "exported": false,
                "message": self.locale.text(Message::NoPolygonsToCopy),
            })),
        }
    }

    fn drawing_area(&self, collection: Option<&serde_json::Value>) -> Result<serde_json::Value> {
        let collection = match collection {
            Some(collection) => drawing::parse_collection(collection)?,
            None => self.store.load_features(),
        };
        let summary = area::summarize(&collection, self.locale);
        serde_json::to_value(summary).map_err(|e| PolydrawError::Storage(e.to_string()))
    }

    fn map_defaults(&self) -> Result<serde_json::Value> {
        Ok(json!({
            "center": self.map.center,
            "zoom": self.map.zoom,
            "style": self.current_style(),
            "locale": self.locale,
        }))
    }

    fn map_locate(&self, report: LocateReport) -> Result<serde_json::Value> {
        let message = match report {
            LocateReport::Position {
                longitude,
                latitude,
            } => {
                check_lng_lat("map.locate", longitude, latitude)?;
                return Ok(json!({
                    "found": true,
                    "marker": [longitude, latitude],
                    "fly_to": self.fly_to([longitude, latitude], self.map.locate_zoom),
                    "message": self.locale.text(Message::LocationFound),
                }));
            }
            LocateReport::Failed {
                error_code: LOCATION_PERMISSION_DENIED,
            } => {
                return Ok(json!({"found": false, "permission_help": true}));
            }
            LocateReport::Failed { error_code: 2 } => Message::LocationUnavailable,
            LocateReport::Failed { error_code: 3 } => Message::LocationTimeout,
            LocateReport::Failed { error_code } => {
                tracing::debug!(error_code, "unrecognised geolocation error");
                Message::LocationError
            }
            LocateReport::Unsupported { supported: false } => Message::LocationNotSupported,
            LocateReport::Unsupported { supported: true } => {
                return Err(PolydrawError::Contract(
                    "map.locate needs a position or an error_code".to_owned(),
                ));
            }
        };
        Ok(json!({
            "found": false,
            "permission_help": false,
            "message": self.locale.text(message),
        }))
    }

    fn map_style(&self, choice: StyleChoice) -> Result<serde_json::Value> {
        let style = MapConfig::resolve_style(&choice.style)?;
        let persisted = self.persist_style(&style)?;
        *self.style.lock().unwrap_or_else(PoisonError::into_inner) = style.clone();
        Ok(json!({"style": style, "persisted": persisted}))
    }

    fn runtime_stop(&self) -> Result<()> {
        tracing::info!("runtime stop requested");
        Ok(())
    }
}
