use serde::Deserialize;
use std::path::Path;

use crate::codec::DEFAULT_JPEG_QUALITY;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Initial polygon fill colour.
    #[serde(default = "default_fill_color")]
    pub fill_color: [u8; 3],
    /// Value the JPEG quality prompt starts at.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default = "default_window_size")]
    pub window_size: [f32; 2],
    #[serde(default)]
    pub debug: bool,
}

fn default_fill_color() -> [u8; 3] {
    [255, 255, 255]
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_window_size() -> [f32; 2] {
    [1024.0, 768.0]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fill_color: default_fill_color(),
            jpeg_quality: default_jpeg_quality(),
            window_size: default_window_size(),
            debug: false,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing or empty file gives the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Self = serde_json::from_str(&content)?;
        settings.jpeg_quality = settings.jpeg_quality.clamp(1, 100);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(dir.path().join("settings.json")).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.fill_color, [255, 255, 255]);
        assert_eq!(s.jpeg_quality, 95);
        assert_eq!(s.window_size, [1024.0, 768.0]);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "fill_color": [255, 0, 0], "debug": true }"#).unwrap();

        let s = Settings::load(&path).unwrap();
        assert_eq!(s.fill_color, [255, 0, 0]);
        assert!(s.debug);
        assert_eq!(s.jpeg_quality, 95);
    }

    #[test]
    fn test_quality_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "jpeg_quality": 0 }"#).unwrap();
        assert_eq!(Settings::load(&path).unwrap().jpeg_quality, 1);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
