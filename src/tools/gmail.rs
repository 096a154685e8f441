//! Gmail tools

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::gateway::dispatch::CallContext;
use crate::gateway::format::ToolOutput;
use crate::gateway::registry::ToolHandler;
use crate::gateway::schema::{ParamType, ParameterSpec, ToolSchema};
use crate::gateway::validate::Arguments;
use crate::google::GmailBackend;
use crate::tools::clamp_u32;

pub const LIST_MESSAGES: &str = "list_gmail_messages_tool";
pub const SEND_MESSAGE: &str = "send_gmail_message_tool";

/// Gmail caps a single list page at 500 messages
const MAX_LIST_RESULTS: u32 = 500;

pub fn list_messages_schema() -> ToolSchema {
    ToolSchema::new(vec![
        ParameterSpec::with_default(
            "query",
            ParamType::String,
            "",
            "Gmail search query, e.g. 'is:unread from:alice@example.com'",
        ),
        ParameterSpec::with_default(
            "max_results",
            ParamType::Integer,
            10,
            "Maximum number of messages to return",
        ),
    ])
}

pub fn send_message_schema() -> ToolSchema {
    ToolSchema::new(vec![
        ParameterSpec::required("to", ParamType::String, "Recipient email address"),
        ParameterSpec::required("subject", ParamType::String, "Email subject"),
        ParameterSpec::required("body", ParamType::String, "Plain-text email body"),
    ])
}

/// Lists recent messages matching a search query
pub struct ListMessages {
    gmail: Arc<dyn GmailBackend>,
}

impl ListMessages {
    pub fn new(gmail: Arc<dyn GmailBackend>) -> Self {
        Self { gmail }
    }
}

#[async_trait]
impl ToolHandler for ListMessages {
    async fn call(&self, args: Arguments, ctx: &CallContext) -> Result<ToolOutput, BackendError> {
        let max_results = clamp_u32(args.i64("max_results").unwrap_or(10), 1, MAX_LIST_RESULTS);
        let messages = self
            .gmail
            .list_messages(args.str_or_empty("query"), max_results, ctx)
            .await?;
        Ok(ToolOutput::Messages(messages))
    }
}

/// Sends a plain-text message
pub struct SendMessage {
    gmail: Arc<dyn GmailBackend>,
}

impl SendMessage {
    pub fn new(gmail: Arc<dyn GmailBackend>) -> Self {
        Self { gmail }
    }
}

#[async_trait]
impl ToolHandler for SendMessage {
    async fn call(&self, args: Arguments, ctx: &CallContext) -> Result<ToolOutput, BackendError> {
        let sent = self
            .gmail
            .send_message(
                args.str_or_empty("to"),
                args.str_or_empty("subject"),
                args.str_or_empty("body"),
                ctx,
            )
            .await?;

        tracing::info!(message_id = %sent.id, "sent gmail message");
        Ok(ToolOutput::MessageSent(sent))
    }
}
