//! Configuration management for the Google MCP Server
//!
//! Handles paths, environment variables, and configuration loading.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, GoogleMcpError, Result};

/// Default per-request timeout handed to backend calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Google MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for storing configuration files
    pub config_dir: PathBuf,

    /// Path to stored OAuth credentials (authorized-user JSON)
    pub credentials_path: PathBuf,

    /// Access token supplied directly through the environment
    pub access_token: Option<String>,

    /// Google Maps API key
    pub maps_api_key: Option<String>,

    /// Timeout applied by handlers to each upstream request
    pub request_timeout: Duration,
}

impl Config {
    /// Create a new configuration from the environment, with default paths
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;

        let credentials_path = std::env::var("GOOGLE_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join("credentials.json"));

        let request_timeout = match std::env::var("GOOGLE_MCP_TIMEOUT_SECS") {
            Ok(value) => Duration::from_secs(parse_timeout_secs("GOOGLE_MCP_TIMEOUT_SECS", &value)?),
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            config_dir,
            credentials_path,
            access_token: non_empty_env("GOOGLE_ACCESS_TOKEN"),
            maps_api_key: non_empty_env("GOOGLE_MAPS_API_KEY"),
            request_timeout,
        })
    }

    /// Get the configuration directory, creating it if necessary
    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| {
                GoogleMcpError::Config(ConfigError::DirNotFound {
                    path: "~".to_string(),
                })
            })?
            .join(".google-mcp");

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|_| {
                GoogleMcpError::Config(ConfigError::DirCreationFailed {
                    path: config_dir.display().to_string(),
                })
            })?;
        }

        Ok(config_dir)
    }

    /// Check if credentials (tokens) exist
    pub fn credentials_exist(&self) -> bool {
        self.access_token.is_some() || self.credentials_path.exists()
    }

    /// Override the credentials file location
    pub fn with_credentials_path(mut self, path: PathBuf) -> Self {
        self.credentials_path = path;
        self
    }

    /// Override the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_timeout_secs(var: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| {
            GoogleMcpError::Config(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                value: value.to_string(),
            })
        })
}

/// Gmail API constants
pub mod gmail {
    /// Base URL for Gmail API
    pub const API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

    /// User ID for the authenticated user
    pub const USER_ID: &str = "me";
}

/// Calendar API constants
pub mod calendar {
    /// Base URL for Calendar API
    pub const API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

    /// Calendar used when the caller names none
    pub const PRIMARY: &str = "primary";

    /// Time zone attached to created events
    pub const TIME_ZONE: &str = "UTC";
}

/// Maps web service constants
pub mod maps {
    /// Base URL for the Maps web services
    pub const API_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
}
