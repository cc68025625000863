//! MCP tool server exposing search operations over streamable HTTP

use axum::{Json, Router, response::IntoResponse, routing::get};
use rmcp::{
    ErrorData, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    schemars, tool, tool_handler, tool_router,
    transport::streamable_http_server::{
        StreamableHttpService, session::local::LocalSessionManager,
    },
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use ragdex_indexing::{DEFAULT_TOP_K, IndexingService};

use crate::config::ToolServerConfig;

pub const SERVER_NAME: &str = "ragdex-tools";

/// Arguments of the `search` tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchArgs {
    /// Name of the index to search
    pub index_name: String,
    /// Natural-language search query
    pub query: String,
    /// Number of results to return
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// Serves the `search` and `list_indices` tools from an [`IndexingService`]
#[derive(Clone)]
pub struct ToolServer {
    service: IndexingService,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ToolServer {
    pub fn new(service: IndexingService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    /// Catalog of the tools this server offers
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    #[tool(
        description = "Search an index for the chunks most relevant to a query. Returns results with description, content and score."
    )]
    pub async fn search(
        &self,
        Parameters(args): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let outcome = self
            .service
            .search(&args.index_name, &args.query, args.top_k)
            .await
            .map(|results| json!({ "results": results }));
        tool_result("search", outcome)
    }

    #[tool(
        description = "List the available indices with their descriptions. Use the descriptions to decide which index suits a question; an index without metadata has an empty description."
    )]
    pub async fn list_indices(&self) -> Result<CallToolResult, ErrorData> {
        let outcome = self
            .service
            .list_indices()
            .await
            .map(|indices| json!({ "indices": indices }));
        tool_result("list_indices", outcome)
    }
}

/// Failures while a tool runs come back as a result with `is_error` set,
/// so the caller can read them instead of losing the session.
fn tool_result(tool: &str, outcome: ragdex_core::Result<Value>) -> Result<CallToolResult, ErrorData> {
    match outcome {
        Ok(value) => {
            debug!(tool, "tool call succeeded");
            Ok(CallToolResult::success(vec![Content::json(value)?]))
        }
        Err(e) => {
            warn!(tool, error = %e, "tool call failed");
            Ok(CallToolResult::error(vec![Content::text(format!(
                "{} failed: {}",
                tool, e
            ))]))
        }
    }
}

#[tool_handler]
impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("ragdex document search".to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Call list_indices to see which indices exist and what they hold, \
                 then search the most suitable index."
                    .to_string(),
            ),
        }
    }
}

/// Build the router serving MCP at `/mcp`; every session gets its own
/// [`ToolServer`] over the shared service.
pub fn router(service: IndexingService) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(ToolServer::new(service.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", mcp)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serve the tool server until the process is stopped
pub async fn run_server(config: &ToolServerConfig, service: IndexingService) -> anyhow::Result<()> {
    let tools: Vec<String> = ToolServer::new(service.clone())
        .tools()
        .into_iter()
        .map(|tool| tool.name.to_string())
        .collect();
    let app = router(service);

    let addr: SocketAddr = config.bind_address().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, tools = ?tools, "tool server listening on /mcp");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ragdex_embed::HashEmbedder;
    use ragdex_search::{InMemorySearchEngine, SearchMode};

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|content| content.as_text())
            .map(|text| text.text.clone())
            .collect()
    }

    async fn server() -> ToolServer {
        let service = IndexingService::new(
            Arc::new(InMemorySearchEngine::new()),
            Arc::new(HashEmbedder::new(32)),
            SearchMode::default(),
        );
        service.create_index("notes", Some("meeting notes")).await.unwrap();
        service
            .index_text("notes", "standup", "the release moves to friday", 200)
            .await
            .unwrap();
        ToolServer::new(service)
    }

    #[test]
    fn test_search_args_default_top_k() {
        let args: SearchArgs =
            serde_json::from_value(json!({"index_name": "notes", "query": "release"})).unwrap();
        assert_eq!(args.top_k, 3);
    }

    #[tokio::test]
    async fn test_catalog() {
        let tools = server().await.tools();
        let mut names: Vec<&str> = tools.iter().map(|tool| tool.name.as_ref()).collect();
        names.sort();
        assert_eq!(names, vec!["list_indices", "search"]);

        let search = tools.iter().find(|tool| tool.name == "search").unwrap();
        assert_eq!(
            search.input_schema.get("required"),
            Some(&json!(["index_name", "query"]))
        );
        assert_eq!(search.input_schema["properties"]["top_k"]["default"], json!(3));
    }

    #[tokio::test]
    async fn test_search_tool() {
        let server = server().await;
        let result = server
            .search(Parameters(SearchArgs {
                index_name: "notes".to_string(),
                query: "release friday".to_string(),
                top_k: 3,
            }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        let value: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(value["results"][0]["description"], "standup - chunk 1");
    }

    #[tokio::test]
    async fn test_search_failure_is_tool_error() {
        let server = server().await;
        let result = server
            .search(Parameters(SearchArgs {
                index_name: "ghost".to_string(),
                query: "x".to_string(),
                top_k: 3,
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("ghost"));
    }

    #[test]
    fn test_server_info_enables_tools() {
        let info = ToolServer::new(IndexingService::new(
            Arc::new(InMemorySearchEngine::new()),
            Arc::new(HashEmbedder::new(8)),
            SearchMode::default(),
        ))
        .get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
    }
}
