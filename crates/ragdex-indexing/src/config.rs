//! HTTP API configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use ragdex_core::{Error, Result};

/// Configuration for the indexing HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Where uploads are staged while being processed
    pub staging_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            staging_dir: env::temp_dir(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl ApiConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let host = env::var("API_SERVER_HOST").unwrap_or(defaults.host);

        let port = match env::var("API_SERVER_PORT") {
            Ok(value) => value.parse().map_err(|_| {
                Error::Configuration(format!("API_SERVER_PORT is not a valid port: {}", value))
            })?,
            Err(_) => defaults.port,
        };

        let staging_dir = env::var("UPLOAD_STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.staging_dir);

        let max_upload_bytes = match env::var("UPLOAD_MAX_BYTES") {
            Ok(value) => value.parse().map_err(|_| {
                Error::Configuration(format!("UPLOAD_MAX_BYTES is not a number: {}", value))
            })?,
            Err(_) => defaults.max_upload_bytes,
        };

        Ok(Self {
            host,
            port,
            staging_dir,
            max_upload_bytes,
        })
    }

    /// Socket address string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
