//! MCP client for the tool server

use async_trait::async_trait;
use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParam, CallToolResult, Tool},
    service::RunningService,
    transport::StreamableHttpClientTransport,
};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use ragdex_core::{Error, Result};

use crate::config::ToolClientConfig;

/// Access to a catalog of remotely callable tools
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Live catalog of available tools
    async fn list_tools(&self) -> Result<Vec<Tool>>;

    /// Invoke a tool with an argument mapping
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult>;
}

/// Streamable-HTTP MCP client for `{server}/mcp`.
///
/// The session is opened on first use and kept for the client's lifetime.
pub struct ToolClient {
    endpoint: String,
    timeout: Duration,
    session: OnceCell<RunningService<RoleClient, ()>>,
}

impl ToolClient {
    pub fn new(config: &ToolClientConfig) -> Self {
        Self {
            endpoint: config.endpoint(),
            timeout: Duration::from_secs(config.timeout_secs),
            session: OnceCell::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open the session now instead of on the first tool request
    pub async fn connect(&self) -> Result<()> {
        self.session().await.map(|_| ())
    }

    async fn session(&self) -> Result<&RunningService<RoleClient, ()>> {
        self.session
            .get_or_try_init(|| async {
                let transport = StreamableHttpClientTransport::from_uri(self.endpoint.as_str());
                let session = self
                    .bounded(async {
                        ().serve(transport).await.map_err(|e| {
                            Error::Network(format!(
                                "Failed to connect to tool server at {}: {}",
                                self.endpoint, e
                            ))
                        })
                    })
                    .await?;
                info!(endpoint = %self.endpoint, "tool server session opened");
                Ok::<_, Error>(session)
            })
            .await
    }

    async fn bounded<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| {
                Error::Network(format!(
                    "Tool server at {} did not answer within {:?}",
                    self.endpoint, self.timeout
                ))
            })?
    }
}

#[async_trait]
impl ToolGateway for ToolClient {
    async fn list_tools(&self) -> Result<Vec<Tool>> {
        let session = self.session().await?;
        self.bounded(async {
            session
                .list_all_tools()
                .await
                .map_err(|e| Error::ToolInvocation(format!("tools/list failed: {}", e)))
        })
        .await
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let arguments = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            _ => {
                return Err(Error::InvalidInput(format!(
                    "arguments for '{}' must be a JSON object",
                    name
                )));
            }
        };

        let session = self.session().await?;
        debug!(tool = name, "calling tool");
        self.bounded(async {
            session
                .call_tool(CallToolRequestParam {
                    name: name.to_string().into(),
                    arguments,
                })
                .await
                .map_err(|e| Error::ToolInvocation(format!("tool '{}' failed: {}", name, e)))
        })
        .await
    }
}

/// Payload of a tool result: its JSON text content when present,
/// otherwise the text itself.
pub fn result_value(result: &CallToolResult) -> Value {
    if let Some(structured) = &result.structured_content {
        return structured.clone();
    }

    let text: String = result
        .content
        .iter()
        .filter_map(|content| content.as_text())
        .map(|content| content.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    serde_json::from_str(&text).unwrap_or(Value::String(text))
}
