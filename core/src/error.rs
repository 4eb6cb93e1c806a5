//! Error types and handling for Relay Core

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Relay Core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model endpoint errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Tool registry and dispatch errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Schema translation errors
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("No configuration found")]
    NoConfigFound,
}

/// Model endpoint errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Transient 429-class error. Carries the server-advertised retry
    /// delay when the endpoint provides one.
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },
}

/// Tool registry and dispatch errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// The model requested a name the registry never exposed. Indicates
    /// a registry/model mismatch and is never silently swallowed.
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Tool provider '{name}' unavailable: {message}")]
    ProviderUnavailable { name: String, message: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },
}

/// Schema translation errors, fatal at registry-build time
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unsupported schema type: {type_name}")]
    UnsupportedType { type_name: String },

    #[error("Malformed schema: {message}")]
    Malformed { message: String },
}

/// Agent execution errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Maximum steps exceeded: {max_steps}")]
    MaxStepsExceeded { max_steps: usize },

    #[error("Task execution failed: {message}")]
    TaskFailed { message: String },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}

impl Error {
    /// Whether this error is a transient rate limit that the turn
    /// executor may retry.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Model(ModelError::RateLimited { .. }))
    }

    /// Server-advertised retry delay, if this is a rate-limit error
    /// that carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::Model(ModelError::RateLimited { retry_after }) => *retry_after,
            _ => None,
        }
    }
}
