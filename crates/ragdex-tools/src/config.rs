//! Tool server and client configuration

use serde::{Deserialize, Serialize};
use std::env;

use ragdex_core::{Error, Result};

/// First set variable among a preferred name and its legacy spellings
fn first_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env::var(name).ok())
}

/// Configuration for the tool server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ToolServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
        }
    }
}

impl ToolServerConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let host = env::var("MCP_SERVER_HOST").unwrap_or(defaults.host);
        let port = match first_var(&["MCP_SERVER_PORT", "MCP_SEVER_PORT"]) {
            Some(value) => value.parse().map_err(|_| {
                Error::Configuration(format!("MCP_SERVER_PORT is not a valid port: {}", value))
            })?,
            None => defaults.port,
        };

        Ok(Self { host, port })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for clients of the tool server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolClientConfig {
    /// Base URL of the tool server, without the `/mcp` path
    pub server_url: String,
    pub timeout_secs: u64,
}

impl Default for ToolClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8001".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ToolClientConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let server_url =
            first_var(&["MCP_SERVER_URL", "MCP_SEVER_URL"]).unwrap_or(defaults.server_url);

        let timeout_secs = match env::var("MCP_TIMEOUT_SECS") {
            Ok(value) => value.parse().map_err(|_| {
                Error::Configuration(format!("MCP_TIMEOUT_SECS is not a number: {}", value))
            })?,
            Err(_) => defaults.timeout_secs,
        };

        Ok(Self {
            server_url,
            timeout_secs,
        })
    }

    /// Full URL of the MCP endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/mcp", self.server_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_path_once() {
        let config = ToolClientConfig {
            server_url: "http://tools:8001/".to_string(),
            timeout_secs: 5,
        };
        assert_eq!(config.endpoint(), "http://tools:8001/mcp");
    }
}
