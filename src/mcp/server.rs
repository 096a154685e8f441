//! MCP Server implementation
//!
//! Serves JSON-RPC over line-delimited stdio. Each `tools/call` runs on its
//! own task so a slow backend never blocks other requests, and all responses
//! go through a single writer task so output lines never interleave.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::gateway::dispatch::Dispatcher;
use crate::mcp::types::*;

/// MCP Server info
const SERVER_NAME: &str = "google-mcp-server";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long in-flight calls may keep running after input closes
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

type InFlight = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// MCP Server for Google services
pub struct McpServer {
    dispatcher: Dispatcher,

    /// Cancellation handles of running tool calls, by request id
    in_flight: InFlight,

    /// Parent of every call token, fired when the shutdown grace runs out
    shutdown: CancellationToken,

    shutdown_grace: Duration,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
            shutdown_grace: SHUTDOWN_GRACE,
        }
    }

    /// Set how long in-flight calls may run once input has closed
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Run the server on stdio
    pub async fn run_stdio(&self) -> Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        self.serve(stdin, tokio::io::stdout()).await
    }

    /// Serve requests from `reader` until EOF, writing responses to `writer`.
    ///
    /// After EOF, in-flight calls get the shutdown grace period to finish and
    /// have their responses written. Calls still running after that are
    /// cancelled and get no response.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut writer_task = tokio::spawn(write_responses(rx, writer));

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line, &tx).await {
                // The writer only stops early on an I/O error, reported below
                let _ = tx.send(response);
            }
        }

        tracing::debug!("input closed, waiting for in-flight calls");
        drop(tx);

        if tokio::time::timeout(self.shutdown_grace, &mut writer_task)
            .await
            .is_err()
        {
            tracing::warn!(
                pending = self.in_flight.lock().await.len(),
                "shutdown grace elapsed, cancelling in-flight calls"
            );
            self.shutdown.cancel();
        }

        match writer_task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "response writer task failed");
                Ok(())
            }
        }
    }

    /// Handle one incoming JSON-RPC message. Returns the response to send
    /// immediately, if any; tool calls respond later from their own task.
    async fn handle_message(
        &self,
        message: &str,
        tx: &mpsc::UnboundedSender<JsonRpcResponse>,
    ) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable message");
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        match request.method.as_str() {
            methods::INITIALIZE => {
                let id = request.id?;
                Some(respond(id, self.handle_initialize(request.params)))
            }
            methods::INITIALIZED => {
                tracing::debug!("client initialized");
                None
            }
            methods::PING => request
                .id
                .map(|id| JsonRpcResponse::success(id, serde_json::json!({}))),
            methods::LIST_TOOLS => {
                let id = request.id?;
                Some(respond(id, self.handle_list_tools()))
            }
            methods::CALL_TOOL => self.handle_call_tool(request, tx).await,
            methods::CANCELLED => {
                self.handle_cancelled(request.params).await;
                None
            }
            _ if request.is_notification() => {
                tracing::debug!(method = %request.method, "ignoring notification");
                None
            }
            _ => Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::method_not_found(&request.method),
            )),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, params: Option<Value>) -> InitializeResult {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                version = %client.version,
                protocol = params.protocol_version.as_deref().unwrap_or("unknown"),
                "client connected"
            );
        }

        InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
        }
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> ListToolsResult {
        ListToolsResult {
            tools: self
                .dispatcher
                .registry()
                .list()
                .map(|descriptor| descriptor.to_tool())
                .collect(),
        }
    }

    /// Start a tool call on its own task
    async fn handle_call_tool(
        &self,
        request: JsonRpcRequest,
        tx: &mpsc::UnboundedSender<JsonRpcResponse>,
    ) -> Option<JsonRpcResponse> {
        let call: ToolCallRequest = match request.params.map(serde_json::from_value) {
            Some(Ok(call)) => call,
            Some(Err(e)) => {
                return Some(JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params(format!("Invalid tool parameters: {}", e)),
                ));
            }
            None => {
                return Some(JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params("Missing tool parameters"),
                ));
            }
        };

        let token = self.shutdown.child_token();
        if let Some(id) = &request.id {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.contains_key(id) {
                tracing::warn!(request_id = %id, "duplicate id for a call in flight");
                return Some(JsonRpcResponse::error(
                    Some(id.clone()),
                    JsonRpcError::invalid_request(format!(
                        "Request id {} is already in use by a running call",
                        id
                    )),
                ));
            }
            in_flight.insert(id.clone(), token.clone());
        }

        let dispatcher = self.dispatcher.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let tx = tx.clone();
        let id = request.id;

        tokio::spawn(async move {
            let ctx = dispatcher.context(token);
            let outcome = dispatcher.dispatch_with(call, &ctx).await;

            let Some(id) = id else {
                return;
            };
            in_flight.lock().await.remove(&id);

            if let Some(result) = outcome {
                let _ = tx.send(respond(id, CallToolResult::from(result)));
            }
        });

        None
    }

    /// Fire the cancellation token of a running call
    async fn handle_cancelled(&self, params: Option<Value>) {
        let Some(params) = params.and_then(|p| serde_json::from_value::<CancelledParams>(p).ok())
        else {
            tracing::debug!("ignoring malformed cancellation");
            return;
        };

        match self.in_flight.lock().await.remove(&params.request_id) {
            Some(token) => {
                tracing::debug!(
                    request_id = %params.request_id,
                    reason = params.reason.as_deref().unwrap_or(""),
                    "cancelling tool call"
                );
                token.cancel();
            }
            None => {
                tracing::debug!(request_id = %params.request_id, "no call in flight to cancel");
            }
        }
    }
}

/// Wrap a result in a success response
fn respond(id: RequestId, result: impl Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(Some(id), JsonRpcError::internal_error(e.to_string())),
    }
}

/// Write responses one line each until every sender is gone
async fn write_responses<W>(
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
    mut writer: W,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
