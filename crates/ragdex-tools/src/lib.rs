//! Tool-invocation protocol for ragdex
//!
//! Serves the `search` and `list_indices` operations as MCP tools over
//! streamable HTTP, and provides the client the agent runtime uses to
//! discover and call them.

mod client;
mod config;
pub mod server;

#[cfg(test)]
mod tests;

pub use client::{ToolClient, ToolGateway, result_value};
pub use config::{ToolClientConfig, ToolServerConfig};
pub use server::{SearchArgs, ToolServer, router, run_server};

// Protocol types shared with the agent runtime
pub use rmcp::model::{CallToolResult, Content, Tool};

pub use ragdex_core::{Error, Result};
