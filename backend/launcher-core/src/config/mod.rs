use crate::error::config::ConfigError;
use crate::{APP_NAME, SERVER_HOSTNAME, SERVER_PORT, STREAMLIT_SCRIPT};

use common::ErrorLocation;

use std::ops::Range;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "launcher.json";
const CONFIG_VERSION: u32 = 1;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_script")]
    pub script: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// Directory holding the script and `venv/`. Falls back to the bundle's resource directory.
    #[serde(default)]
    pub app_root: Option<PathBuf>,
    /// Interpreter override. Relative paths resolve against the app root.
    #[serde(default)]
    pub interpreter: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            script: default_script(),
            headless: default_headless(),
            app_root: None,
            interpreter: None,
        }
    }
}

impl ServerConfig {
    /// Base URL the window navigates to, e.g. `http://localhost:8501`.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_min_width")]
    pub min_width: u32,
    #[serde(default = "default_min_height")]
    pub min_height: u32,
    #[serde(default = "default_background")]
    pub background: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            min_width: default_min_width(),
            min_height: default_min_height(),
            background: default_background(),
        }
    }
}

impl WindowConfig {
    /// Background as RGB bytes. `None` if the value is not `#RRGGBB`.
    pub fn background_rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.background.strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |range: Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Readiness poll timings, written as humantime strings ("30s", "250ms").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessConfig {
    #[serde(default = "default_timeout")]
    pub timeout: String,
    #[serde(default = "default_initial_interval")]
    pub initial_interval: String,
    #[serde(default = "default_max_interval")]
    pub max_interval: String,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            initial_interval: default_initial_interval(),
            max_interval: default_max_interval(),
        }
    }
}

/// Parsed form of [`ReadinessConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessTimings {
    pub timeout: Duration,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl ReadinessConfig {
    /// Parse the duration strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if a value is not a humantime duration,
    /// is zero, or the intervals are out of order.
    #[track_caller]
    pub fn timings(&self) -> Result<ReadinessTimings, ConfigError> {
        let timings = ReadinessTimings {
            timeout: parse_duration("readiness.timeout", &self.timeout)?,
            initial_interval: parse_duration(
                "readiness.initial_interval",
                &self.initial_interval,
            )?,
            max_interval: parse_duration("readiness.max_interval", &self.max_interval)?,
        };

        if timings.initial_interval > timings.max_interval
            || timings.max_interval > timings.timeout
        {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Readiness intervals out of order: initial {} <= max {} <= timeout {} required",
                    self.initial_interval, self.max_interval, self.timeout
                ),
            });
        }

        Ok(timings)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LauncherConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            window: WindowConfig::default(),
            readiness: ReadinessConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_host() -> String {
    SERVER_HOSTNAME.to_string()
}
fn default_port() -> u16 {
    SERVER_PORT
}
fn default_script() -> String {
    STREAMLIT_SCRIPT.to_string()
}
fn default_headless() -> bool {
    true
}
fn default_title() -> String {
    APP_NAME.to_string()
}
fn default_width() -> u32 {
    1920
}
fn default_height() -> u32 {
    1080
}
fn default_min_width() -> u32 {
    1200
}
fn default_min_height() -> u32 {
    800
}
fn default_background() -> String {
    "#0F0F0F".to_string()
}
fn default_timeout() -> String {
    "30s".to_string()
}
fn default_initial_interval() -> String {
    "250ms".to_string()
}
fn default_max_interval() -> String {
    "2s".to_string()
}

#[track_caller]
fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    let duration =
        humantime::parse_duration(value).map_err(|e| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("Invalid duration for {field}: '{value}' ({e})"),
        })?;

    if duration.is_zero() {
        return Err(ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("{field} must be greater than zero"),
        });
    }

    Ok(duration)
}

// ============================================
// IMPLEMENTATION
// ============================================

impl LauncherConfig {
    /// Load config from `{config_dir}/launcher.json`.
    ///
    /// # Returns
    ///
    /// Returns `Ok(LauncherConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: LauncherConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {e}");
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "server.port must be a fixed, non-zero port".to_string(),
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "server.host cannot be empty".to_string(),
            });
        }

        if self.server.script.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "server.script cannot be empty".to_string(),
            });
        }

        let window = &self.window;
        if window.min_width == 0 || window.min_height == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid minimum window size: {}x{}",
                    window.min_width, window.min_height
                ),
            });
        }

        if window.width < window.min_width || window.height < window.min_height {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Window size {}x{} is smaller than minimum {}x{}",
                    window.width, window.height, window.min_width, window.min_height
                ),
            });
        }

        if window.background_rgb().is_none() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid background colour: {} (expected #RRGGBB)",
                    window.background
                ),
            });
        }

        self.readiness.timings()?;

        Ok(())
    }
}
