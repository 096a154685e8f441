//! MCP (Model Context Protocol) module
//!
//! JSON-RPC wire types and the stdio server loop.

pub mod server;
pub mod types;
