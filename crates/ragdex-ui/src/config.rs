//! UI configuration

use serde::{Deserialize, Serialize};
use std::env;

use ragdex_core::{Error, Result};

/// Configuration for the indexing console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Base URL of the indexing API
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            timeout_secs: 300,
        }
    }
}

impl UiConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let api_url = env::var("API_SERVER_URL").unwrap_or(defaults.api_url);
        if url::Url::parse(&api_url).is_err() {
            return Err(Error::Configuration(format!(
                "API_SERVER_URL is not a valid URL: {}",
                api_url
            )));
        }

        Ok(Self {
            api_url,
            timeout_secs: defaults.timeout_secs,
        })
    }
}
