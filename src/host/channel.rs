//! Host command channel and router.

use crate::error::{PolydrawError, Result};
use crate::host::contract::{CommandEnvelope, CommandName, EventEnvelope, ResponseEnvelope};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Payload of `search.query`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Current map center as `[longitude, latitude]`, used as proximity bias.
    #[serde(default)]
    pub center: Option<[f64; 2]>,
}

/// Payload of `search.select`: the result the user tapped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceSelection {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Payload of `map.locate`: what device geolocation reported.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LocateReport {
    Position { longitude: f64, latitude: f64 },
    /// `GeolocationPositionError` code: 1 denied, 2 unavailable, 3 timeout.
    Failed { error_code: u16 },
    /// `{"supported": false}` when the device has no geolocation.
    Unsupported { supported: bool },
}

/// Payload of `map.style`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StyleChoice {
    pub style: String,
}

#[derive(Debug, Deserialize)]
struct SavePayload {
    collection: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct AreaPayload {
    #[serde(default)]
    collection: Option<serde_json::Value>,
}

/// Backend operations behind the command router.
///
/// Each method returns the response payload. Search results arrive later as
/// events, so `search_query` only acknowledges the dispatch.
pub trait HostHandler: Send + Sync + 'static {
    fn search_query(&self, request: SearchRequest) -> Result<serde_json::Value>;
    fn search_select(&self, selection: PlaceSelection) -> Result<serde_json::Value>;
    fn search_clear(&self) -> Result<serde_json::Value>;
    fn drawing_save(&self, collection: &serde_json::Value) -> Result<serde_json::Value>;
    fn drawing_load(&self) -> Result<serde_json::Value>;
    fn drawing_clear(&self) -> Result<serde_json::Value>;
    fn drawing_export(&self) -> Result<serde_json::Value>;
    /// Area of `collection`, or of the saved drawing when `None`.
    fn drawing_area(&self, collection: Option<&serde_json::Value>) -> Result<serde_json::Value>;
    /// Initial camera and style for the map.
    fn map_defaults(&self) -> Result<serde_json::Value>;
    /// Fly-to and toast for a device location report.
    fn map_locate(&self, report: LocateReport) -> Result<serde_json::Value>;
    /// Switch and remember the map style.
    fn map_style(&self, choice: StyleChoice) -> Result<serde_json::Value>;
    fn runtime_stop(&self) -> Result<()> {
        Ok(())
    }
}

struct HostCommandRequest {
    envelope: CommandEnvelope,
    response_tx: oneshot::Sender<Result<ResponseEnvelope>>,
}

#[derive(Clone)]
pub struct HostCommandClient {
    request_tx: mpsc::Sender<HostCommandRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
}

impl HostCommandClient {
    pub async fn send(&self, envelope: CommandEnvelope) -> Result<ResponseEnvelope> {
        envelope.validate().map_err(|e| {
            PolydrawError::Contract(format!(
                "invalid host command envelope {}: {}",
                envelope.request_id, e
            ))
        })?;

        let (response_tx, response_rx) = oneshot::channel();
        self.request_tx
            .send(HostCommandRequest {
                envelope,
                response_tx,
            })
            .await
            .map_err(|e| {
                PolydrawError::Channel(format!("failed to send host command request: {e}"))
            })?;

        response_rx
            .await
            .map_err(|e| PolydrawError::Channel(format!("host command response dropped: {e}")))?
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.event_tx.subscribe()
    }
}

pub struct HostCommandServer<H: HostHandler> {
    request_rx: mpsc::Receiver<HostCommandRequest>,
    handler: H,
}

/// Create a command channel using an existing event broadcast sender.
///
/// The handler keeps its own clone of `event_tx` so search events emitted
/// from spawned tasks reach subscribers of the client.
#[must_use]
pub fn command_channel_with_events<H: HostHandler>(
    request_capacity: usize,
    event_tx: broadcast::Sender<EventEnvelope>,
    handler: H,
) -> (HostCommandClient, HostCommandServer<H>) {
    let (request_tx, request_rx) = mpsc::channel(request_capacity.max(1));
    (
        HostCommandClient {
            request_tx,
            event_tx,
        },
        HostCommandServer {
            request_rx,
            handler,
        },
    )
}

impl<H: HostHandler> HostCommandServer<H> {
    pub async fn run(mut self) {
        while let Some(request) = self.request_rx.recv().await {
            let response = self.route(&request.envelope);
            let _ = request.response_tx.send(response);
        }
    }

    /// Route a command envelope to the handler.
    ///
    /// Handler failures become error responses carrying the request id, so
    /// only transport problems surface as `Err`.
    pub fn route(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let request_id = envelope.request_id.clone();
        let payload = match self.dispatch(envelope) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    command = envelope.command.as_str(),
                    request_id = %request_id,
                    error = %e,
                    "host command failed"
                );
                return Ok(ResponseEnvelope::error(request_id, e.to_string()));
            }
        };
        Ok(ResponseEnvelope::ok(request_id, payload))
    }

    fn dispatch(&self, envelope: &CommandEnvelope) -> Result<serde_json::Value> {
        let command = envelope.command;
        match command {
            CommandName::HostPing => Ok(serde_json::json!({"pong": true})),
            CommandName::HostVersion => Ok(serde_json::json!({
                "contract_version": crate::host::contract::EVENT_VERSION,
                "package_version": env!("CARGO_PKG_VERSION"),
            })),
            CommandName::SearchQuery => self
                .handler
                .search_query(parse_payload(command, &envelope.payload)?),
            CommandName::SearchSelect => self
                .handler
                .search_select(parse_payload(command, &envelope.payload)?),
            CommandName::SearchClear => self.handler.search_clear(),
            CommandName::DrawingSave => {
                let save: SavePayload = parse_payload(command, &envelope.payload)?;
                self.handler.drawing_save(&save.collection)
            }
            CommandName::DrawingLoad => self.handler.drawing_load(),
            CommandName::DrawingClear => self.handler.drawing_clear(),
            CommandName::DrawingExport => self.handler.drawing_export(),
            CommandName::DrawingArea => {
                let area: AreaPayload = if envelope.payload.is_null() {
                    AreaPayload::default()
                } else {
                    parse_payload(command, &envelope.payload)?
                };
                self.handler.drawing_area(area.collection.as_ref())
            }
            CommandName::MapDefaults => self.handler.map_defaults(),
            CommandName::MapLocate => self
                .handler
                .map_locate(parse_payload(command, &envelope.payload)?),
            CommandName::MapStyle => self
                .handler
                .map_style(parse_payload(command, &envelope.payload)?),
            CommandName::RuntimeStop => {
                self.handler.runtime_stop()?;
                Ok(serde_json::json!({"stopping": true}))
            }
        }
    }
}

fn parse_payload<T: DeserializeOwned>(
    command: CommandName,
    payload: &serde_json::Value,
) -> Result<T> {
    serde_json::from_value(payload.clone()).map_err(|e| {
        PolydrawError::Contract(format!("{} payload invalid: {e}", command.as_str()))
    })
}
