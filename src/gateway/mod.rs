//! Tool invocation gateway
//!
//! A call flows through the pieces in order: the registry finds the tool,
//! the validator shapes its arguments, the dispatcher runs the handler, and
//! the result is either formatted into content blocks or normalized into a
//! single error line.

pub mod dispatch;
pub mod format;
pub mod normalize;
pub mod registry;
pub mod schema;
pub mod validate;

pub use dispatch::{CallContext, Dispatcher, ToolCallResult};
pub use format::ToolOutput;
pub use registry::{Registry, ToolDescriptor, ToolHandler};
pub use schema::{ParamType, ParameterSpec, ToolSchema};
pub use validate::{validate, Arguments};
