//! Error types for the Google MCP Server
//!
//! Startup errors (configuration, registry, I/O) are unified under [`GoogleMcpError`].
//! Per-call errors are [`ToolCallError`] values whose `Display` output is the
//! category-prefixed message returned to the MCP caller.

use thiserror::Error;

use crate::gateway::schema::ParamType;

/// Main error type for the Google MCP Server
#[derive(Error, Debug)]
pub enum GoogleMcpError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tool registry errors (startup only)
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found: {path}")]
    DirNotFound { path: String },

    #[error("Failed to create config directory: {path}")]
    DirCreationFailed { path: String },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnvVar { var: String, value: String },
}

/// Tool registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate tool: {name}")]
    DuplicateTool { name: String },
}

/// Argument validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required parameter: {name}")]
    MissingArgument { name: String },

    #[error("type mismatch for parameter {name}: expected {expected}")]
    TypeMismatch { name: String, expected: ParamType },

    #[error("unsupported value for parameter {name}: {value}")]
    UnsupportedValue { name: String, value: String },

    #[error("arguments must be a JSON object")]
    NotAnObject,
}

/// Category of a backend failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendErrorKind {
    /// Missing, expired or rejected credentials
    Auth,
    /// Transport failure or timeout
    Network,
    /// Rate limit or quota exhausted
    Quota,
    /// Upstream answered with something we could not use
    InvalidUpstreamResponse,
}

impl BackendErrorKind {
    /// Stable category name, as used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendErrorKind::Auth => "auth",
            BackendErrorKind::Network => "network",
            BackendErrorKind::Quota => "quota",
            BackendErrorKind::InvalidUpstreamResponse => "invalid-upstream-response",
        }
    }
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            BackendErrorKind::Auth => "authentication failed",
            BackendErrorKind::Network => "network failure",
            BackendErrorKind::Quota => "quota exceeded",
            BackendErrorKind::InvalidUpstreamResponse => "invalid upstream response",
        };
        f.write_str(text)
    }
}

/// Failure reported by a backend handler.
///
/// Only the category is shown to callers. `detail` carries upstream context for
/// logs and may contain anything the API sent back, so it never reaches the
/// tool-call response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub detail: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn auth(detail: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Auth, detail)
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, detail)
    }

    pub fn quota(detail: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Quota, detail)
    }

    pub fn invalid_response(detail: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidUpstreamResponse, detail)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL: Maps requests carry the API key as a query parameter.
        let err = err.without_url();
        if err.is_decode() {
            BackendError::invalid_response(err.to_string())
        } else {
            BackendError::network(err.to_string())
        }
    }
}

/// Any failure of a single tool call, as seen by the dispatcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] ValidationError),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type alias for Google MCP operations
pub type Result<T> = std::result::Result<T, GoogleMcpError>;
