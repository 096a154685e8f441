//! Gmail API client
//!
//! Lists message summaries and sends plain-text messages.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::config::gmail::{API_BASE_URL, USER_ID};
use crate::error::BackendError;
use crate::gateway::dispatch::CallContext;
use crate::google::auth::TokenSource;
use crate::google::http::read_json;
use crate::google::types::{MessageSummary, SentMessage};
use crate::google::GmailBackend;

/// Header in a message part
#[derive(Debug, Clone, Deserialize)]
struct Header {
    name: String,
    value: String,
}

/// Top-level message part (metadata format only carries headers)
#[derive(Debug, Clone, Deserialize, Default)]
struct MessagePart {
    #[serde(default)]
    headers: Vec<Header>,
}

/// A Gmail message
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    id: String,
    #[serde(default)]
    thread_id: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    payload: Option<MessagePart>,
}

/// List of messages response
#[derive(Debug, Clone, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

/// Reference to a message
#[derive(Debug, Clone, Deserialize)]
struct MessageRef {
    id: String,
}

/// Request to send a message
#[derive(Debug, Clone, Serialize)]
struct SendMessageRequest {
    /// Raw RFC822 message (base64url encoded)
    raw: String,
}

/// Gmail API client
pub struct GmailClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Bearer token supplier
    tokens: Arc<dyn TokenSource>,

    /// API root, overridable for tests and proxies
    base_url: String,
}

impl GmailClient {
    /// Create a new Gmail client
    pub fn new(http_client: reqwest::Client, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http_client,
            tokens,
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Base URL for messages
    fn messages_url(&self) -> String {
        format!("{}/users/{}/messages", self.base_url, USER_ID)
    }

    async fn fetch_metadata(
        &self,
        token: &str,
        id: &str,
        ctx: &CallContext,
    ) -> Result<Message, BackendError> {
        let url = format!("{}/{}", self.messages_url(), id);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("format", "metadata"),
                ("metadataHeaders", "From"),
                ("metadataHeaders", "Subject"),
                ("metadataHeaders", "Date"),
            ])
            .timeout(ctx.timeout)
            .send()
            .await?;

        read_json(response).await
    }
}

#[async_trait]
impl GmailBackend for GmailClient {
    async fn list_messages(
        &self,
        query: &str,
        max_results: u32,
        ctx: &CallContext,
    ) -> Result<Vec<MessageSummary>, BackendError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .http_client
            .get(self.messages_url())
            .bearer_auth(&token)
            .query(&[("q", query.to_string()), ("maxResults", max_results.to_string())])
            .timeout(ctx.timeout)
            .send()
            .await?;

        let list: MessageList = read_json(response).await?;

        // Gmail's list call returns ids only; headers need one fetch per message.
        let mut summaries = Vec::with_capacity(list.messages.len());
        for msg_ref in list.messages {
            let message = self.fetch_metadata(&token, &msg_ref.id, ctx).await?;
            summaries.push(summarize(message));
        }

        tracing::debug!(count = summaries.len(), "listed gmail messages");
        Ok(summaries)
    }

    async fn send_message(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        ctx: &CallContext,
    ) -> Result<SentMessage, BackendError> {
        let token = self.tokens.access_token().await?;
        let request = SendMessageRequest {
            raw: encode_raw_message(&build_message(to, subject, body)),
        };

        let response = self
            .http_client
            .post(format!("{}/send", self.messages_url()))
            .bearer_auth(&token)
            .json(&request)
            .timeout(ctx.timeout)
            .send()
            .await?;

        let sent: Message = read_json(response).await?;
        Ok(SentMessage {
            thread_id: sent.thread_id.unwrap_or_default(),
            id: sent.id,
        })
    }
}

fn summarize(message: Message) -> MessageSummary {
    let header = |name: &str| {
        message
            .payload
            .as_ref()
            .and_then(|p| find_header(p, name))
            .unwrap_or("")
            .to_string()
    };

    MessageSummary {
        from: header("from"),
        subject: header("subject"),
        date: header("date"),
        snippet: message.snippet.clone().unwrap_or_default(),
        id: message.id.clone(),
    }
}

fn find_header<'a>(part: &'a MessagePart, name: &str) -> Option<&'a str> {
    part.headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Encode text for MIME header (RFC 2047)
pub fn encode_mime_header(text: &str) -> String {
    if text.chars().all(|c| c.is_ascii() && c != '\r' && c != '\n') {
        return text.to_string();
    }

    format!(
        "=?UTF-8?B?{}?=",
        base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
    )
}

/// Build a plain-text RFC 822 message
pub fn build_message(to: &str, subject: &str, body: &str) -> String {
    // Line breaks in the recipient would start new headers.
    let to: String = to.chars().filter(|c| *c != '\r' && *c != '\n').collect();

    [
        format!("To: {}", to),
        format!("Subject: {}", encode_mime_header(subject)),
        "MIME-Version: 1.0".to_string(),
        "Content-Type: text/plain; charset=\"UTF-8\"".to_string(),
        "Content-Transfer-Encoding: 8bit".to_string(),
        String::new(),
        body.to_string(),
    ]
    .join("\r\n")
}

/// Encode a raw email message for Gmail API (base64url, no padding)
pub fn encode_raw_message(message: &str) -> String {
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}
