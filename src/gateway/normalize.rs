//! Error normalization
//!
//! Every failure leaves the gateway as one line of text, prefixed with its
//! category and scrubbed of credential material.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ToolCallError;

const REDACTED: &str = "[REDACTED]";

static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Authorization headers and bearer tokens
        r"(?i)(bearer\s+)[A-Za-z0-9\-._~+/]+=*",
        // key=..., access_token=... style query or form parameters
        r"(?i)\b((?:key|api_key|access_token|refresh_token|client_secret|token)=)[^&\s]+",
        // the same fields inside JSON bodies
        r#"(?i)("(?:access_token|refresh_token|client_secret|token|api_key)"\s*:\s*")[^"]*"#,
        // Google OAuth access tokens and API keys appearing bare
        r"\bya29\.[A-Za-z0-9\-._]+",
        r"\bAIza[0-9A-Za-z\-_]{35}\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Convert a tool-call failure into its caller-facing message
pub fn normalize(error: &ToolCallError) -> String {
    single_line(&redact_secrets(&error.to_string()))
}

/// Replace credential material in `text` with a placeholder
pub fn redact_secrets(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in SECRET_PATTERNS.iter() {
        let replacement = if pattern.captures_len() > 1 {
            format!("${{1}}{}", REDACTED)
        } else {
            REDACTED.to_string()
        };
        out = pattern.replace_all(&out, replacement.as_str()).into_owned();
    }
    out
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
