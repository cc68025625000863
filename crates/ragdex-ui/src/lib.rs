//! Console front end for the ragdex indexing API
//!
//! Provides a typed HTTP client for every indexing endpoint, the form
//! validation used before requests are sent, and an interactive menu.

pub mod app;
mod client;
mod config;
pub mod console;
pub mod forms;


pub use app::run;
pub use client::{ApiClient, CreateIndexResponse, IndexContentResponse, MessageResponse};
pub use config::UiConfig;

pub use ragdex_core::{Error, Result};
