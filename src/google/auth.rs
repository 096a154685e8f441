//! Access tokens for Google APIs
//!
//! Obtaining and refreshing OAuth tokens is left to external tooling. This
//! module only reads what that tooling produced:
//! - a token passed directly through the environment
//! - an authorized-user credentials file, re-read on every call so it can be
//!   rotated while the server runs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::BackendError;

/// Supplies a bearer token for each upstream request
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, BackendError>;
}

/// A fixed token
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, BackendError> {
        Ok(self.token.clone())
    }
}

/// Stored credentials (authorized-user JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Access token (`token` in Google's authorized-user format)
    #[serde(alias = "access_token")]
    pub token: Option<String>,

    /// Refresh token, kept for the external refresher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Expiry as an ISO-8601 timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,

    /// Expiry timestamp (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

impl StoredCredentials {
    /// Expiry instant, from whichever field is present
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if let Some(expiry) = &self.expiry {
            return parse_expiry(expiry);
        }
        self.expiry_date
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }

    /// Usable access token, or an auth error
    pub fn valid_token(&self, now: DateTime<Utc>) -> Result<String, BackendError> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BackendError::auth("credentials file holds no access token"))?;

        if self.is_expired(now) {
            return Err(BackendError::auth("stored access token has expired"));
        }

        Ok(token.to_string())
    }
}

/// Accepts RFC 3339 and the zone-less form Python's google-auth writes
fn parse_expiry(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Reads the credentials file on each call
pub struct FileTokenSource {
    path: PathBuf,
}

impl FileTokenSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoredCredentials, BackendError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            BackendError::auth(format!(
                "cannot read credentials file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        // serde_json errors only carry positions, never the offending text
        serde_json::from_str(&content).map_err(|e| {
            BackendError::auth(format!(
                "malformed credentials file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl TokenSource for FileTokenSource {
    async fn access_token(&self) -> Result<String, BackendError> {
        self.load().await?.valid_token(Utc::now())
    }
}

/// Token source selected by configuration: an environment token wins over the file
pub fn token_source_from_config(config: &Config) -> Box<dyn TokenSource> {
    match &config.access_token {
        Some(token) => Box::new(StaticTokenSource::new(token.clone())),
        None => Box::new(FileTokenSource::new(config.credentials_path.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::io::Write;

    #[test]
    fn test_authorized_user_format() {
        let json = r#"{
            "token": "ya29.test",
            "refresh_token": "1//refresh",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "secret",
            "scopes": ["https://www.googleapis.com/auth/gmail.readonly"],
            "expiry": "2099-01-01T00:00:00.000000Z"
        }"#;
        let creds: StoredCredentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.valid_token(Utc::now()).unwrap(), "ya29.test");
    }

    #[test]
    fn test_access_token_alias_and_unix_expiry() {
        let json = r#"{"access_token": "tok", "expiry_date": 1000}"#;
        let creds: StoredCredentials = serde_json::from_str(json).unwrap();
        assert!(creds.is_expired(Utc::now()));
        let err = creds.valid_token(Utc::now()).unwrap_err();
        assert_eq!(err.kind, crate::error::BackendErrorKind::Auth);
    }

    #[test]
    fn test_naive_expiry() {
        let creds = StoredCredentials {
            token: Some("tok".to_string()),
            refresh_token: None,
            expiry: Some("2024-01-01T10:00:00.123456".to_string()),
            expiry_date: None,
        };
        let at = creds.expires_at().unwrap();
        assert!(!creds.is_expired(at - Duration::seconds(1)));
        assert!(creds.is_expired(at));
    }

    #[test]
    fn test_missing_token() {
        let creds: StoredCredentials = serde_json::from_str(r#"{"token": null}"#).unwrap();
        assert!(creds.valid_token(Utc::now()).is_err());
    }

    #[tokio::test]
    async fn test_file_token_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"token": "from-file"}}"#).unwrap();

        let source = FileTokenSource::new(file.path());
        assert_eq!(source.access_token().await.unwrap(), "from-file");
    }

    #[test]
    fn test_missing_file_is_auth_error() {
        let source = FileTokenSource::new("/nonexistent/google-mcp/credentials.json");
        let err = tokio_test::block_on(source.access_token()).unwrap_err();
        assert_eq!(err.kind, crate::error::BackendErrorKind::Auth);
    }

    #[test]
    fn test_static_source() {
        let source = StaticTokenSource::new("env-token");
        assert_eq!(tokio_test::block_on(source.access_token()).unwrap(), "env-token");
    }
}
