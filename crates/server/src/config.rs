//! Server configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Prediction service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name reported in structured logs
    #[serde(default = "default_node_name")]
    pub node_name: String,

    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port for the form, health and metrics endpoints
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the three model artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
}

fn default_node_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            host: default_host(),
            port: default_port(),
            model_dir: default_model_dir(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `weather-server` config file,
    /// overridden by `WEATHER_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("weather-server").required(false))
            .add_source(config::Environment::with_prefix("WEATHER"))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
