//! Shared HTTP response handling for Google APIs

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::BackendError;

/// Longest slice of an upstream error body kept for logs
const MAX_DETAIL_LEN: usize = 300;

/// Error reasons Google uses for rate limiting under a 403
const QUOTA_REASONS: &[&str] = &[
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "quotaExceeded",
    "dailyLimitExceeded",
    "RESOURCE_EXHAUSTED",
];

/// Decode a successful JSON response, or classify the failure
pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(BackendError::from);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, &body))
}

/// Map a non-success status to a backend error category
pub fn classify_status(status: StatusCode, body: &str) -> BackendError {
    let detail = format!("HTTP {}: {}", status.as_u16(), truncate(body, MAX_DETAIL_LEN));

    match status {
        StatusCode::TOO_MANY_REQUESTS => BackendError::quota(detail),
        StatusCode::FORBIDDEN if QUOTA_REASONS.iter().any(|r| body.contains(r)) => {
            BackendError::quota(detail)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::auth(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => BackendError::network(detail),
        _ => BackendError::invalid_response(detail),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendErrorKind;

    #[test]
    fn test_classify_status() {
        let cases = [
            (StatusCode::UNAUTHORIZED, "", BackendErrorKind::Auth),
            (StatusCode::FORBIDDEN, r#"{"error":{"errors":[{"reason":"insufficientPermissions"}]}}"#, BackendErrorKind::Auth),
            (StatusCode::FORBIDDEN, r#"{"error":{"errors":[{"reason":"rateLimitExceeded"}]}}"#, BackendErrorKind::Quota),
            (StatusCode::TOO_MANY_REQUESTS, "", BackendErrorKind::Quota),
            (StatusCode::GATEWAY_TIMEOUT, "", BackendErrorKind::Network),
            (StatusCode::NOT_FOUND, "Not Found", BackendErrorKind::InvalidUpstreamResponse),
            (StatusCode::INTERNAL_SERVER_ERROR, "", BackendErrorKind::InvalidUpstreamResponse),
        ];

        for (status, body, kind) in cases {
            assert_eq!(classify_status(status, body).kind, kind, "status {}", status);
        }
    }

    #[test]
    fn test_detail_truncated() {
        let body = "é".repeat(1000);
        let err = classify_status(StatusCode::BAD_REQUEST, &body);
        assert!(err.detail.chars().count() < 400);
    }
}
