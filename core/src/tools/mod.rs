//! Tool system for model-driven function calling

pub mod base;
pub mod factory;

pub use base::{Tool, ToolCall, ToolExecutor, ToolResult};
pub use factory::ToolFactory;
