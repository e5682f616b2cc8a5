//! Host configuration, persisted as TOML.

use std::path::{Path, PathBuf};

use polydraw_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{PolydrawError, Result};
use crate::messages::Locale;

/// Environment variable overriding `search.mapbox_access_token`.
pub const MAPBOX_TOKEN_ENV: &str = "POLYDRAW_MAPBOX_TOKEN";

const MAPBOX_STYLE_PREFIX: &str = "mapbox://styles/mapbox/";

/// Mapbox styles offered by the style switcher, satellite first.
pub const MAP_STYLES: &[&str] = &[
    "satellite-streets-v12",
    "satellite-v9",
    "streets-v12",
    "outdoors-v12",
    "light-v11",
    "dark-v11",
];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolydrawConfig {
    pub search: SearchConfig,
    pub map: MapConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

/// Camera defaults and fly-to parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Initial center as `[longitude, latitude]`.
    pub center: [f64; 2],
    pub zoom: f64,
    pub style: String,
    /// Zoom used when flying to a selected search result.
    pub select_zoom: f64,
    /// Zoom used when flying to the device location.
    pub locate_zoom: f64,
    pub fly_duration_ms: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [4.9041, 52.3676],
            zoom: 12.0,
            style: "mapbox://styles/mapbox/satellite-streets-v12".to_owned(),
            select_zoom: 15.0,
            locate_zoom: 16.0,
            fly_duration_ms: 1500,
        }
    }
}

impl MapConfig {
    /// Resolve a style switcher choice to its style URL.
    ///
    /// Accepts a bare id from [`MAP_STYLES`] or its full `mapbox://` URL.
    ///
    /// # Errors
    ///
    /// Returns [`PolydrawError::Config`] for a style the switcher does not offer.
    pub fn resolve_style(choice: &str) -> Result<String> {
        let choice = choice.trim();
        let id = choice.strip_prefix(MAPBOX_STYLE_PREFIX).unwrap_or(choice);
        if MAP_STYLES.contains(&id) {
            Ok(format!("{MAPBOX_STYLE_PREFIX}{id}"))
        } else {
            Err(PolydrawError::Config(format!("unknown map style: {choice}")))
        }
    }
}

/// Where the drawing blob lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub drawing_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            drawing_path: crate::paths::drawing_file(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub locale: Locale,
    /// Seconds the copy-success dialog counts down before returning to the
    /// host form.
    pub return_countdown_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            return_countdown_secs: 5,
        }
    }
}

impl PolydrawConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PolydrawError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| PolydrawError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/polydraw/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::paths::config_dir().join("config.toml")
    }

    /// Apply `POLYDRAW_MAPBOX_TOKEN` if set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_mapbox_token(std::env::var(MAPBOX_TOKEN_ENV).ok());
    }

    /// Replace the Mapbox token when `token` is non-blank.
    pub fn apply_mapbox_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.search.mapbox_access_token = Some(token.trim().to_owned());
        }
    }

    /// Search settings with the result language defaulting to the UI locale.
    pub fn effective_search_config(&self) -> SearchConfig {
        let mut search = self.search.clone();
        if search.language.is_none() {
            search.language = Some(self.ui.locale.tag().to_owned());
        }
        search
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`PolydrawError::Search`] for invalid search settings and
    /// [`PolydrawError::Config`] for map settings out of range.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        let [lng, lat] = self.map.center;
        if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
            return Err(PolydrawError::Config(format!(
                "map.center out of range: [{lng}, {lat}]"
            )));
        }
        let zooms = [
            ("map.zoom", self.map.zoom),
            ("map.select_zoom", self.map.select_zoom),
            ("map.locate_zoom", self.map.locate_zoom),
        ];
        for (name, zoom) in zooms {
            if !(0.0..=22.0).contains(&zoom) {
                return Err(PolydrawError::Config(format!("{name} must be within 0..=22")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_amsterdam_satellite_view() {
        let config = PolydrawConfig::default();
        assert_eq!(config.map.center, [4.9041, 52.3676]);
        assert_eq!(config.map.zoom, 12.0);
        assert!(config.map.style.ends_with("satellite-streets-v12"));
        assert_eq!(config.map.select_zoom, 15.0);
        assert_eq!(config.map.locate_zoom, 16.0);
        assert_eq!(config.map.fly_duration_ms, 1500);
        assert_eq!(config.ui.locale, Locale::En);
        assert_eq!(config.ui.return_countdown_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: PolydrawConfig = toml::from_str(
            r#"
            [ui]
            locale = "nl"

            [search]
            max_results = 6
            "#,
        )
        .expect("parse");
        assert_eq!(config.ui.locale, Locale::Nl);
        assert_eq!(config.search.max_results, 6);
        assert_eq!(config.search.per_provider_limit, 5);
        assert_eq!(config.map, MapConfig::default());
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = PolydrawConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config =
            PolydrawConfig::load_or_default(&dir.path().join("missing.toml")).expect("defaults");
        assert_eq!(config, PolydrawConfig::default());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").expect("write");
        assert!(matches!(
            PolydrawConfig::from_file(&path),
            Err(PolydrawError::Config(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let mut config = PolydrawConfig::default();
        config.ui.locale = Locale::Nl;
        config.search.mapbox_access_token = Some("pk.test".into());
        config.map.zoom = 9.5;
        config.save_to_file(&path).expect("save");
        let loaded = PolydrawConfig::from_file(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = PolydrawConfig::default_config_path();
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn blank_token_override_is_ignored() {
        let mut config = PolydrawConfig::default();
        config.search.mapbox_access_token = Some("pk.file".into());
        config.apply_mapbox_token(Some("   ".into()));
        assert_eq!(config.search.mapbox_access_token.as_deref(), Some("pk.file"));
        config.apply_mapbox_token(None);
        assert_eq!(config.search.mapbox_access_token.as_deref(), Some("pk.file"));
        config.apply_mapbox_token(Some(" pk.env ".into()));
        assert_eq!(config.search.mapbox_access_token.as_deref(), Some("pk.env"));
    }

    #[test]
    fn search_language_follows_locale_unless_set() {
        let mut config = PolydrawConfig::default();
        config.ui.locale = Locale::Nl;
        assert_eq!(config.effective_search_config().language.as_deref(), Some("nl"));
        config.search.language = Some("de".into());
        assert_eq!(config.effective_search_config().language.as_deref(), Some("de"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = PolydrawConfig::default();
        config.map.center = [200.0, 0.0];
        assert!(matches!(config.validate(), Err(PolydrawError::Config(_))));

        let mut config = PolydrawConfig::default();
        config.map.select_zoom = 30.0;
        assert!(config.validate().is_err());

        let mut config = PolydrawConfig::default();
        config.map.locate_zoom = -1.0;
        assert!(config.validate().is_err());

        let mut config = PolydrawConfig::default();
        config.search.max_results = 0;
        assert!(matches!(config.validate(), Err(PolydrawError::Search(_))));
    }

    #[test]
    fn style_choices_resolve_to_urls() {
        assert_eq!(
            MapConfig::resolve_style("streets-v12").expect("offered"),
            "mapbox://styles/mapbox/streets-v12"
        );
        assert_eq!(
            MapConfig::resolve_style(" mapbox://styles/mapbox/dark-v11 ").expect("offered"),
            "mapbox://styles/mapbox/dark-v11"
        );
        assert_eq!(
            MapConfig::resolve_style(MAP_STYLES[0]).expect("offered"),
            MapConfig::default().style
        );
        assert!(matches!(
            MapConfig::resolve_style("mapbox://styles/someone/custom"),
            Err(PolydrawError::Config(_))
        ));
    }
}
