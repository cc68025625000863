//! Search engine configuration

use serde::{Deserialize, Serialize};
use std::env;

use ragdex_core::{DEFAULT_NUM_CANDIDATES, Error, Result, SearchMode};

/// Which engine implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    Elasticsearch,
    Memory,
}

/// Configuration for the search engine client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub backend: SearchBackend,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub mode: SearchMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackend::Elasticsearch,
            endpoint: "http://localhost:9200".to_string(),
            timeout_secs: 30,
            mode: SearchMode::default(),
        }
    }
}

impl SearchConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let backend = match env::var("SEARCH_BACKEND") {
            Ok(value) => match value.to_lowercase().as_str() {
                "elasticsearch" | "es" => SearchBackend::Elasticsearch,
                "memory" => SearchBackend::Memory,
                other => {
                    return Err(Error::Configuration(format!(
                        "SEARCH_BACKEND must be 'elasticsearch' or 'memory', got '{}'",
                        other
                    )));
                }
            },
            Err(_) => defaults.backend,
        };

        let endpoint = env::var("ELASTICSEARCH_ENDPOINT").unwrap_or(defaults.endpoint);
        let timeout_secs = parse_var("ELASTICSEARCH_TIMEOUT_SECS", defaults.timeout_secs)?;
        let num_candidates = parse_var("KNN_NUM_CANDIDATES", DEFAULT_NUM_CANDIDATES)?;

        let mode = match env::var("SEARCH_MODE") {
            Ok(name) => SearchMode::from_name(&name, num_candidates)?,
            Err(_) => SearchMode::Knn { num_candidates },
        };

        Ok(Self {
            backend,
            endpoint,
            timeout_secs,
            mode,
        })
    }

    /// In-memory configuration, used by tests and offline runs
    pub fn memory() -> Self {
        Self {
            backend: SearchBackend::Memory,
            ..Default::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| Error::Configuration(format!("{} is not a valid number: {}", key, value))),
        Err(_) => Ok(default),
    }
}
