//! Google MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing Gmail, Google Calendar and
//! Google Maps as callable tools. The [`gateway`] module holds the generic
//! tool-invocation pipeline; [`tools`] binds it to the Google backends.

pub mod config;
pub mod error;
pub mod gateway;
pub mod google;
pub mod mcp;
pub mod tools;

pub use config::Config;
pub use error::{GoogleMcpError, Result};
pub use gateway::{Dispatcher, Registry, ToolCallResult};
pub use tools::{build_registry, Backends};
