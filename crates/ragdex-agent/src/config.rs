//! Agent runtime configuration

use serde::{Deserialize, Serialize};
use std::env;

use ragdex_core::{Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the Gemini-backed agent runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub api_url: String,
    /// Upper bound on model turns per agent invocation
    pub max_turns: usize,
    pub timeout_secs: u64,
}

impl AgentConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("GOOGLE_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .map_err(|_| {
                Error::Configuration(
                    "GOOGLE_API_KEY or GEMINI_API_KEY environment variable not found".to_string(),
                )
            })?;

        let model = env::var("MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let max_turns = match env::var("AGENT_MAX_TURNS") {
            Ok(value) => value.parse().map_err(|_| {
                Error::Configuration(format!("AGENT_MAX_TURNS is not a number: {}", value))
            })?,
            Err(_) => 8,
        };

        Ok(Self {
            model,
            api_key,
            api_url,
            max_turns,
            timeout_secs: 120,
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            max_turns: 8,
            timeout_secs: 120,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}
