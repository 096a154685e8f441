//! Tool-call dispatch
//!
//! lookup -> validate -> invoke -> format. Every runtime failure becomes a
//! [`ToolCallResult::Failure`]; nothing escapes to the transport. The handler
//! call is the only suspension point and runs exactly once per request.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::ToolCallError;
use crate::gateway::format::{format, ToolOutput};
use crate::gateway::normalize::{normalize, redact_secrets};
use crate::gateway::registry::Registry;
use crate::gateway::validate::validate;
use crate::mcp::types::{CallToolResult, ToolCallRequest, ToolResultContent};

/// Per-call signals handed to a handler
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Timeout the handler applies to each upstream request
    pub timeout: Duration,

    /// Fired when the caller abandons the request
    pub cancellation: CancellationToken,
}

impl CallContext {
    pub fn new(timeout: Duration, cancellation: CancellationToken) -> Self {
        Self {
            timeout,
            cancellation,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            CancellationToken::new(),
        )
    }
}

/// Outcome of a tool call: exactly one of success or failure
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCallResult {
    Success(Vec<ToolResultContent>),
    Failure(String),
}

impl ToolCallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolCallResult::Success(_))
    }

    /// Failure message, if any
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            ToolCallResult::Failure(message) => Some(message),
            ToolCallResult::Success(_) => None,
        }
    }
}

impl From<ToolCallResult> for CallToolResult {
    fn from(result: ToolCallResult) -> Self {
        match result {
            ToolCallResult::Success(content) => CallToolResult::success(content),
            ToolCallResult::Failure(message) => CallToolResult::error(message),
        }
    }
}

/// Routes tool calls to registered handlers
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Fresh context with this dispatcher's timeout
    pub fn context(&self, cancellation: CancellationToken) -> CallContext {
        CallContext::new(self.timeout, cancellation)
    }

    /// Dispatch a tool call that cannot be cancelled
    pub async fn dispatch(&self, request: ToolCallRequest) -> ToolCallResult {
        let ctx = self.context(CancellationToken::new());
        self.run(request, &ctx).await
    }

    /// Dispatch a tool call, giving up if `ctx.cancellation` fires.
    ///
    /// Cancellation drops the in-flight handler future and yields `None`: a
    /// cancelled call produces no response at all.
    pub async fn dispatch_with(
        &self,
        request: ToolCallRequest,
        ctx: &CallContext,
    ) -> Option<ToolCallResult> {
        let name = request.name.clone();
        tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => {
                tracing::debug!(tool = %name, "tool call cancelled");
                None
            }
            result = self.run(request, ctx) => Some(result),
        }
    }

    async fn run(&self, request: ToolCallRequest, ctx: &CallContext) -> ToolCallResult {
        match self.invoke(request, ctx).await {
            Ok(output) => ToolCallResult::Success(format(&output)),
            Err(err) => ToolCallResult::Failure(normalize(&err)),
        }
    }

    async fn invoke(
        &self,
        request: ToolCallRequest,
        ctx: &CallContext,
    ) -> Result<ToolOutput, ToolCallError> {
        let descriptor = self.registry.lookup(&request.name)?;
        let args = validate(&descriptor.schema, &request.arguments)?;

        tracing::debug!(tool = %descriptor.name, args = args.len(), "invoking tool");

        descriptor.handler.call(args, ctx).await.map_err(|err| {
            tracing::warn!(
                tool = %descriptor.name,
                category = err.kind.as_str(),
                detail = %redact_secrets(&err.detail),
                "backend call failed"
            );
            ToolCallError::from(err)
        })
    }
}
