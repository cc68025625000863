//! Agent orchestration for ragdex
//!
//! This crate provides the Gemini implementation of the `LLMProvider` trait,
//! the static tree of agent roles, and the runner that executes a role's
//! turn loop against the tool server.

mod config;
mod gemini;
pub mod roles;
mod runner;

#[cfg(test)]
mod tests;

pub use config::{AgentConfig, DEFAULT_API_URL, DEFAULT_MODEL};
pub use gemini::{GeminiClient, sanitize_schema};
pub use roles::{AgentRole, RoleTool, all_roles, find_role, orchestrator_agent};
pub use runner::AgentRunner;

// Re-export core types for convenience
pub use ragdex_core::{Error, LLMProvider, Message, Result};
