//! Versioned command/event envelopes exchanged with the map UI.

use serde::{Deserialize, Serialize};

/// Contract version for host command/event envelopes.
pub const EVENT_VERSION: u32 = 1;

/// Command set accepted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "host.ping")]
    HostPing,
    #[serde(rename = "host.version")]
    HostVersion,
    #[serde(rename = "search.query")]
    SearchQuery,
    #[serde(rename = "search.select")]
    SearchSelect,
    #[serde(rename = "search.clear")]
    SearchClear,
    #[serde(rename = "drawing.save")]
    DrawingSave,
    #[serde(rename = "drawing.load")]
    DrawingLoad,
    #[serde(rename = "drawing.clear")]
    DrawingClear,
    #[serde(rename = "drawing.export")]
    DrawingExport,
    #[serde(rename = "drawing.area")]
    DrawingArea,
    #[serde(rename = "map.defaults")]
    MapDefaults,
    #[serde(rename = "map.locate")]
    MapLocate,
    #[serde(rename = "map.style")]
    MapStyle,
    #[serde(rename = "runtime.stop")]
    RuntimeStop,
}

impl CommandName {
    /// Render command name to wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostPing => "host.ping",
            Self::HostVersion => "host.version",
            Self::SearchQuery => "search.query",
            Self::SearchSelect => "search.select",
            Self::SearchClear => "search.clear",
            Self::DrawingSave => "drawing.save",
            Self::DrawingLoad => "drawing.load",
            Self::DrawingClear => "drawing.clear",
            Self::DrawingExport => "drawing.export",
            Self::DrawingArea => "drawing.area",
            Self::MapDefaults => "map.defaults",
            Self::MapLocate => "map.locate",
            Self::MapStyle => "map.style",
            Self::RuntimeStop => "runtime.stop",
        }
    }

    /// Parse a command name from wire format.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "host.ping" => Some(Self::HostPing),
            "host.version" => Some(Self::HostVersion),
            "search.query" => Some(Self::SearchQuery),
            "search.select" => Some(Self::SearchSelect),
            "search.clear" => Some(Self::SearchClear),
            "drawing.save" => Some(Self::DrawingSave),
            "drawing.load" => Some(Self::DrawingLoad),
            "drawing.clear" => Some(Self::DrawingClear),
            "drawing.export" => Some(Self::DrawingExport),
            "drawing.area" => Some(Self::DrawingArea),
            "map.defaults" => Some(Self::MapDefaults),
            "map.locate" => Some(Self::MapLocate),
            "map.style" => Some(Self::MapStyle),
            "runtime.stop" => Some(Self::RuntimeStop),
            _ => None,
        }
    }
}

/// Event names emitted by the host.
pub mod events {
    pub const SEARCH_RESULTS: &str = "search.results";
    pub const SEARCH_NO_RESULTS: &str = "search.no_results";
    pub const SEARCH_CLEARED: &str = "search.cleared";
}

/// A versioned response envelope from backend host -> frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    pub payload: serde_json::Value,
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Build a successful response envelope.
    #[must_use]
    pub fn ok(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    /// Build an error response envelope.
    #[must_use]
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(message.into()),
        }
    }
}

/// A versioned command envelope from frontend -> backend host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: CommandName,
    pub payload: serde_json::Value,
}

impl CommandEnvelope {
    /// Build a v1 command envelope.
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            command,
            payload,
        }
    }

    /// Validate envelope version and required identifiers.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.v != EVENT_VERSION {
            return Err(ContractError::new(
                ContractErrorKind::UnsupportedVersion,
                format!(
                    "unsupported contract version {}; expected {}",
                    self.v, EVENT_VERSION
                ),
            ));
        }
        if self.request_id.trim().is_empty() {
            return Err(ContractError::new(
                ContractErrorKind::InvalidEnvelope,
                "request_id cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// A versioned event envelope from backend host -> frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub v: u32,
    pub event_id: String,
    pub event: String,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Build a v1 event envelope with a fresh random id.
    #[must_use]
    pub fn emit(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), event, payload)
    }

    /// Build a v1 event envelope.
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        event: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            event_id: event_id.into(),
            event: event.into(),
            payload,
        }
    }
}

/// Contract validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    UnsupportedVersion,
    InvalidEnvelope,
}

/// Contract validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    #[must_use]
    pub fn new(kind: ContractErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ContractError {}
