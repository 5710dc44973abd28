//! Configuration file handling for camsnap.
//!
//! Loads configuration from `<config dir>/camsnap/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::{Resolution, StreamConstraints};
use crate::snapshot::DEFAULT_JPEG_QUALITY;
use crate::upload::{UploadSettings, DEFAULT_BASE_URL, DEFAULT_ENDPOINT};

/// Environment variable overriding `upload.base_url`.
pub const URL_ENV: &str = "CAMSNAP_URL";

/// Default config written by `camsnap config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# camsnap configuration

[camera]
# Camera device id (from `camsnap list-cameras`); omit for the default camera
# device = "0"
# Mirror horizontally (selfie mode)
mirror = true
# Requested capture resolution
width = 640
height = 480
fps = 30
# JPEG quality of snapshots (1-100)
jpeg_quality = 92

[upload]
# Server receiving snapshots
base_url = "http://127.0.0.1:5000"
endpoint = "/camera"
timeout_secs = 30
connect_timeout_secs = 10
"#;

/// Configuration file structure for camsnap.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default = "default_true")]
    pub mirror: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: None,
            mirror: true,
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct UploadConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_width() -> u32 {
    Resolution::VGA.width
}

fn default_height() -> u32 {
    Resolution::VGA.height
}

fn default_fps() -> u32 {
    30
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::load_from_explicit(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a path that must exist.
    pub fn load_from_explicit(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Apply `CAMSNAP_URL` if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.trim().is_empty() {
                self.upload.base_url = url.trim().to_string();
            }
        }
    }

    /// Stream constraints for the configured camera settings.
    pub fn stream_constraints(&self) -> StreamConstraints {
        StreamConstraints {
            device_id: self.camera.device.clone().filter(|d| !d.is_empty()),
            resolution: Resolution {
                width: self.camera.width,
                height: self.camera.height,
            },
            fps: self.camera.fps,
            mirror: self.camera.mirror,
            ..StreamConstraints::default()
        }
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            base_url: self.upload.base_url.clone(),
            endpoint: self.upload.endpoint.clone(),
            timeout: Duration::from_secs(self.upload.timeout_secs),
            connect_timeout: Duration::from_secs(self.upload.connect_timeout_secs),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("camsnap").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/camsnap/config.toml")
        })
}
