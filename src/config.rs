/// Persistent application settings
///
/// Settings live in a small JSON file in the user's config directory:
/// - Linux: ~/.config/image-compressor/settings.json
/// - macOS: ~/Library/Application Support/image-compressor/settings.json
/// - Windows: %APPDATA%\image-compressor\settings.json
///
/// A missing file means defaults. A broken file is logged and ignored.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::state::quality::Quality;

/// Quiet period before a compression job starts
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// How long a notice stays on screen (roughly a short toast)
const DEFAULT_NOTICE_MS: u64 = 2000;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub debounce_ms: u64,
    /// Folder created under the Pictures directory for saved images
    pub output_subdir: String,
    /// Fixed output name; repeated saves overwrite it
    pub output_file_name: String,
    /// Quality used when re-encoding the displayed bitmap on save
    pub save_quality: u8,
    pub notice_ms: u64,
    /// Quality preset on startup, unset means the slider starts at 0
    pub initial_quality: Option<u8>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            output_subdir: "CompressedImages".to_string(),
            output_file_name: "compressed_image.jpg".to_string(),
            save_quality: 100,
            notice_ms: DEFAULT_NOTICE_MS,
            initial_quality: None,
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory available, using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Failed to read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring invalid settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("image-compressor");
        path.push("settings.json");
        Some(path)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }

    pub fn save_quality(&self) -> Quality {
        Quality::new(i64::from(self.save_quality))
    }

    pub fn initial_quality(&self) -> Option<Quality> {
        self.initial_quality.map(|q| Quality::new(i64::from(q)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_observed_behavior() {
        let settings = Settings::default();
        assert_eq!(settings.debounce(), Duration::from_millis(500));
        assert_eq!(settings.output_subdir, "CompressedImages");
        assert_eq!(settings.output_file_name, "compressed_image.jpg");
        assert_eq!(settings.save_quality().get(), 100);
        assert!(settings.initial_quality().is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "debounce_ms": 250 }"#).unwrap();
        assert_eq!(settings.debounce_ms, 250);
        assert_eq!(settings.output_file_name, "compressed_image.jpg");
    }

    #[test]
    fn test_save_quality_is_clamped() {
        let settings = Settings::from_json(r#"{ "save_quality": 255 }"#).unwrap();
        assert_eq!(settings.save_quality().get(), 100);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("missing.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_serialization() {
        let mut settings = Settings::default();
        settings.initial_quality = Some(80);
        settings.notice_ms = 3000;

        let json = serde_json::to_string_pretty(&settings).unwrap();
        let restored = Settings::from_json(&json).unwrap();

        assert_eq!(settings, restored);
    }
}
