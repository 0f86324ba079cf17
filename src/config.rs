//! Configuration file handling for shutterpost.
//!
//! Loads configuration from `~/.config/shutterpost/config.toml` or a
//! custom path. Missing file means defaults; a present but unparsable
//! file is an error.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::gallery::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_PHOTOS};

/// Configuration file structure.
///
/// ```toml
/// [webhook]
/// url = "https://prod-12.westus.logic.azure.com/workflows/..."
///
/// [submission]
/// user_id = "kiosk-3"
/// max_photos = 10
/// jpeg_quality = 80
///
/// [camera]
/// device = 0
/// mirror = true
/// width = 640
/// height = 480
/// fps = 30
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct WebhookConfig {
    /// Endpoint URL; `SHUTTERPOST_WEBHOOK_URL` overrides it when set.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionConfig {
    /// Default user id; the `send` command's argument overrides it.
    pub user_id: Option<String>,
    #[serde(default = "default_max_photos")]
    pub max_photos: usize,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            max_photos: default_max_photos(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
    #[serde(default = "default_true")]
    pub mirror: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            mirror: true,
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_photos() -> usize {
    DEFAULT_MAX_PHOTOS
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_fps() -> u32 {
    30
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            config.validate().map_err(|reason| ConfigError::Invalid {
                path: path.clone(),
                reason,
            })?;
            Ok(config)
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Range-check values the file can set, matching what the CLI's
    /// value parsers enforce for the same settings.
    fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.submission.jpeg_quality) {
            return Err(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.submission.jpeg_quality
            ));
        }
        if !(1..=100).contains(&self.submission.max_photos) {
            return Err(format!(
                "max_photos must be between 1 and 100, got {}",
                self.submission.max_photos
            ));
        }
        if !(1..=120).contains(&self.camera.fps) {
            return Err(format!(
                "fps must be between 1 and 120, got {}",
                self.camera.fps
            ));
        }
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value in config file '{path}': {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("shutterpost").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/shutterpost/config.toml")
        })
}
