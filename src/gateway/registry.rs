//! Tool registry
//!
//! Tools are registered once at startup into an owned [`Registry`], which is
//! then shared read-only behind an `Arc`. Lookups take `&self` and need no lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{BackendError, RegistryError, ToolCallError};
use crate::gateway::dispatch::CallContext;
use crate::gateway::format::ToolOutput;
use crate::gateway::schema::ToolSchema;
use crate::gateway::validate::Arguments;
use crate::mcp::types::Tool;

/// The backend operation bound to a tool.
///
/// Implementations hold their backend client and are the only code that talks
/// to an external service. They must honor `ctx.timeout` on upstream requests.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Arguments, ctx: &CallContext) -> Result<ToolOutput, BackendError>;
}

/// A registered tool
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub schema: ToolSchema,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    pub fn new(
        name: &str,
        description: &str,
        schema: ToolSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            schema,
            handler,
        }
    }

    /// MCP tool definition for `tools/list`
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            input_schema: self.schema.to_json_schema(),
        }
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Registry of tools, in registration order
#[derive(Default)]
pub struct Registry {
    tools: Vec<Arc<ToolDescriptor>>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), RegistryError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateTool {
                name: descriptor.name,
            });
        }
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(Arc::new(descriptor));
        Ok(())
    }

    /// Look up a tool by name
    pub fn lookup(&self, name: &str) -> Result<Arc<ToolDescriptor>, ToolCallError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| ToolCallError::UnknownTool {
                name: name.to_string(),
            })
    }

    /// All tools, in registration order
    pub fn list(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|d| d.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
