//! Server configuration for premia.
//!
//! Values are layered: built-in defaults, then an optional JSON file named by
//! `PREMIA_CONFIG`, then individual environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Environment keys
// ─────────────────────────────────────────────────────────────────────────────

pub const CONFIG_FILE_VAR: &str = "PREMIA_CONFIG";
pub const HOST_VAR: &str = "HOST";
pub const PORT_VAR: &str = "PORT";
pub const MODEL_PATH_VAR: &str = "PREMIA_MODEL_PATH";
pub const ENCODER_PATH_VAR: &str = "PREMIA_ENCODER_PATH";
pub const PRELOAD_VAR: &str = "PREMIA_PRELOAD";

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub encoder_path: PathBuf,
    /// Load both artifacts before accepting traffic and refuse to start if
    /// either one is unusable.
    pub preload_artifacts: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            model_path: PathBuf::from("artifacts/model.json"),
            encoder_path: PathBuf::from("artifacts/encoder.json"),
            preload_artifacts: true,
        }
    }
}

impl ServerConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_FILE_VAR) {
            Some(path) => Self::load_from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(host) = lookup(HOST_VAR) {
            config.host = host;
        }
        if let Some(port) = lookup(PORT_VAR) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: PORT_VAR, value: port })?;
        }
        if let Some(path) = lookup(MODEL_PATH_VAR) {
            config.model_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENCODER_PATH_VAR) {
            config.encoder_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup(PRELOAD_VAR) {
            config.preload_artifacts = parse_flag(&flag)
                .ok_or(ConfigError::InvalidValue { key: PRELOAD_VAR, value: flag })?;
        }

        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Socket address string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
