//! Configuration persistence for snaplabel settings

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::{DEFAULT_LOCALE, LabelContext};
use crate::capture::StillOptions;

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapLabelConfig {
    /// Active locale tag for labels and color names
    pub locale: String,
    /// Delay between live-detection samples in auto mode
    pub poll_interval_ms: u64,
    /// Still quality (0-1] for manual captures
    pub capture_quality: f32,
    /// Longest side for manual captures (None = full sensor resolution)
    pub capture_max_dimension: Option<u32>,
    /// Still quality (0-1] for auto-mode samples
    pub poll_quality: f32,
    /// Longest side for auto-mode samples
    pub poll_max_dimension: Option<u32>,
    /// Longest side of the cropped selection sent for analysis
    pub crop_max_dimension: Option<u32>,
    /// JPEG quality (1-100) of images sent to the services
    pub jpeg_quality: u8,
    /// Whether the label service sees the whole frame or just the selection
    pub label_context: LabelContext,
    /// Chat-completions endpoint used for labels
    pub label_endpoint: String,
    pub label_model: String,
    /// Environment variable holding the label service API key
    pub api_key_env: String,
    /// Base URL of the color service
    pub color_service_url: String,
    /// Base URL of the detection service
    pub detection_service_url: String,
    /// Transport timeout for every service request
    pub request_timeout_secs: u64,
}

impl Default for SnapLabelConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            poll_interval_ms: 800,
            capture_quality: 1.0,
            capture_max_dimension: None,
            poll_quality: 0.3,
            poll_max_dimension: Some(640),
            crop_max_dimension: Some(1024),
            jpeg_quality: 85,
            // The label service sees the whole still by default
            label_context: LabelContext::FullFrame,
            label_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            label_model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            color_service_url: "http://localhost:3000".to_string(),
            detection_service_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl SnapLabelConfig {
    /// Directory name under the platform config dir
    pub const APP_DIR: &'static str = "snaplabel";

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            log::error!("No config directory available, settings not saved");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        // tokio intervals reject a zero period
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn capture_still(&self) -> StillOptions {
        StillOptions {
            quality: self.capture_quality,
            max_dimension: self.capture_max_dimension,
        }
    }

    pub fn poll_still(&self) -> StillOptions {
        StillOptions {
            quality: self.poll_quality,
            max_dimension: self.poll_max_dimension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_preference_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = SnapLabelConfig::default();
        config.locale = "ja-JP".to_string();
        config.save_to(&path).unwrap();

        let loaded = SnapLabelConfig::load_from(&path).unwrap();
        assert_eq!(loaded.locale, "ja-JP");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"locale":"pt-BR","poll_interval_ms":0}"#).unwrap();

        let loaded = SnapLabelConfig::load_from(&path).unwrap();
        assert_eq!(loaded.locale, "pt-BR");
        assert_eq!(loaded.poll_interval(), Duration::from_millis(1));
        assert_eq!(loaded.label_context, LabelContext::FullFrame);
        assert_eq!(loaded.poll_still().max_dimension, Some(640));
    }

    #[test]
    fn test_missing_file_is_default_and_garbage_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_eq!(SnapLabelConfig::load_from(&path).unwrap(), SnapLabelConfig::default());

        std::fs::write(&path, "not json").unwrap();
        assert!(SnapLabelConfig::load_from(&path).is_err());
    }
}
