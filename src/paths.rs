//! Application directory paths.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Data | `~/Library/Application Support/polydraw/` | `~/.local/share/polydraw/` |
//! | Config | `~/Library/Application Support/polydraw/` | `~/.config/polydraw/` |
//!
//! Overrides: `POLYDRAW_DATA_DIR`, `POLYDRAW_CONFIG_DIR`.

use std::path::PathBuf;

/// Persistent data root (saved drawing).
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("POLYDRAW_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("polydraw"))
        .unwrap_or_else(|| PathBuf::from("/tmp/polydraw-data"))
}

/// Directory holding `config.toml`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("POLYDRAW_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("polydraw"))
        .unwrap_or_else(|| PathBuf::from("/tmp/polydraw-config"))
}

/// Default location of the persisted drawing.
#[must_use]
pub fn drawing_file() -> PathBuf {
    data_dir().join("drawing.geojson")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_are_scoped_to_app() {
        assert!(drawing_file().ends_with("drawing.geojson"));
        let config = config_dir();
        let config = config.to_string_lossy();
        assert!(config.contains("polydraw"), "unexpected config dir {config}");
    }
}
