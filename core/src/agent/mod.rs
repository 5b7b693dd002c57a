//! Agent definitions and the tool-calling run loop

pub mod persona;
pub mod runner;

pub use persona::PersonaAgent;
pub use runner::{RunReport, ToolLoopAgent, DEFAULT_MAX_STEPS};
