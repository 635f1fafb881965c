use std::io;
use thiserror::Error;

/// Unified error type for todochat
#[derive(Error, Debug)]
pub enum TodoError {
    /// Model backend returned an error or an unusable body
    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Connection failures and timeouts
    #[error("Network error: {0}")]
    Network(String),

    /// Todo store failures other than a missing record
    #[error("Store error: {0}")]
    Store(String),

    #[error("Todo #{0} not found")]
    NotFound(i64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for TodoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TodoError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            TodoError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            TodoError::Api(format!("API returned error status: {}", err))
        } else if err.is_decode() {
            TodoError::Serialization(format!("Malformed response body: {}", err))
        } else {
            TodoError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for TodoError {
    fn from(err: serde_json::Error) -> Self {
        TodoError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for TodoError {
    fn from(err: serde_yml::Error) -> Self {
        TodoError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<rusqlite::Error> for TodoError {
    fn from(err: rusqlite::Error) -> Self {
        TodoError::Store(format!("SQLite: {}", err))
    }
}

impl From<tokio::task::JoinError> for TodoError {
    fn from(err: tokio::task::JoinError) -> Self {
        TodoError::Store(format!("Store task failed: {}", err))
    }
}

impl From<String> for TodoError {
    fn from(err: String) -> Self {
        TodoError::Unknown(err)
    }
}

impl From<&str> for TodoError {
    fn from(err: &str) -> Self {
        TodoError::Unknown(err.to_string())
    }
}
