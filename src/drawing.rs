//! Drawing persistence and GeoJSON export.
//!
//! The drawing is kept on disk as one GeoJSON `FeatureCollection` blob,
//! written back exactly as the map UI sent it. Everything read from or
//! written to the store goes through the `geojson` parser first.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use geojson::{Feature, FeatureCollection, JsonObject};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::area::feature_area;
use crate::error::{PolydrawError, Result};

/// An empty `FeatureCollection`.
#[must_use]
pub fn empty_collection() -> Value {
    json!({"type": "FeatureCollection", "features": []})
}

/// Parse `value` as a GeoJSON FeatureCollection.
///
/// # Errors
///
/// Returns [`PolydrawError::Storage`] if `value` is not a FeatureCollection
/// or any of its features is malformed.
pub fn parse_collection(value: &Value) -> Result<FeatureCollection> {
    FeatureCollection::deserialize(value)
        .map_err(|e| PolydrawError::Storage(format!("invalid FeatureCollection: {e}")))
}

/// File-backed store for the current drawing.
#[derive(Debug, Clone)]
pub struct DrawingStore {
    path: PathBuf,
}

impl DrawingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `collection`, replacing any previous drawing, and return it
    /// parsed.
    ///
    /// # Errors
    ///
    /// Returns [`PolydrawError::Storage`] if `collection` is not a valid
    /// FeatureCollection, or [`PolydrawError::Io`] if the write fails.
    pub fn save(&self, collection: &Value) -> Result<FeatureCollection> {
        let parsed = parse_collection(collection)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(collection)
            .map_err(|e| PolydrawError::Storage(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(
            path = %self.path.display(),
            features = parsed.features.len(),
            "drawing saved"
        );
        Ok(parsed)
    }

    /// Load the saved drawing as sent by the UI.
    ///
    /// A missing file is an empty drawing. A corrupt blob is logged and also
    /// treated as empty so the user can keep working.
    pub fn load(&self) -> Value {
        self.read().map_or_else(empty_collection, |(raw, _)| raw)
    }

    /// Load the saved drawing parsed, with the same fallbacks as
    /// [`load`](Self::load).
    pub fn load_features(&self) -> FeatureCollection {
        self.read().map_or_else(
            || FeatureCollection {
                bbox: None,
                features: Vec::new(),
                foreign_members: None,
            },
            |(_, parsed)| parsed,
        )
    }

    fn read(&self) -> Option<(Value, FeatureCollection)> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not read saved drawing"
                );
                return None;
            }
        };
        let parsed = serde_json::from_str::<Value>(&content)
            .map_err(|e| PolydrawError::Storage(e.to_string()))
            .and_then(|raw| parse_collection(&raw).map(|parsed| (raw, parsed)));
        match parsed {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring corrupt saved drawing"
                );
                None
            }
        }
    }

    /// Remove the saved drawing. Returns whether there was one.
    ///
    /// # Errors
    ///
    /// Returns [`PolydrawError::Io`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Build the export collection: `Polygon` features only, each tagged with a
/// 1-based `id`, its `area_sqm` and the export time.
///
/// Returns `None` when the drawing has no polygons.
#[must_use]
pub fn export_polygons(
    collection: &FeatureCollection,
    created: DateTime<Utc>,
) -> Option<FeatureCollection> {
    let created = created.to_rfc3339_opts(SecondsFormat::Millis, true);
    let features: Vec<Feature> = collection
        .features
        .iter()
        .filter_map(|feature| Some((feature.geometry.clone()?, feature_area(feature)?)))
        .enumerate()
        .map(|(index, (geometry, area))| {
            let mut properties = JsonObject::new();
            properties.insert("id".to_owned(), json!(index + 1));
            properties.insert("area_sqm".to_owned(), json!(area));
            properties.insert("created".to_owned(), json!(created));
            Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    if features.is_empty() {
        return None;
    }
    Some(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Export text: the polygon collection pretty-printed with two-space indent.
///
/// # Errors
///
/// Returns [`PolydrawError::Storage`] if serialization fails.
pub fn export_text(
    collection: &FeatureCollection,
    created: DateTime<Utc>,
) -> Result<Option<String>> {
    export_polygons(collection, created)
        .map(|export| {
            serde_json::to_string_pretty(&export)
                .map_err(|e| PolydrawError::Storage(e.to_string()))
        })
        .transpose()
}
