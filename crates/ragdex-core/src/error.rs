//! Error types for ragdex

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the ragdex system
#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Search engine error: {0}")]
    SearchEngine(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    #[error("Tool invocation error: {0}")]
    ToolInvocation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Whether the error was caused by the caller rather than an upstream system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::UnsupportedFormat(_) | Error::NotFound(_)
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(Error::NotFound("ghost".to_string()).is_client_error());
        assert!(Error::UnsupportedFormat(".pdf".to_string()).is_client_error());
        assert!(!Error::SearchEngine("boom".to_string()).is_client_error());
    }

    #[test]
    fn test_display_keeps_original_message() {
        let err = Error::SearchEngine("index_not_found_exception".to_string());
        assert_eq!(err.to_string(), "Search engine error: index_not_found_exception");
    }
}
