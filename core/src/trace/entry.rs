//! Run entry structures

use crate::llm::{LlmMessage, Usage};
use crate::tools::{ToolCall, ToolResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single entry in a recorded pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEntry {
    /// Unique identifier for this entry
    pub id: String,

    /// Timestamp when this entry was created
    pub timestamp: DateTime<Utc>,

    /// Type of entry
    pub entry_type: RunEntryType,

    /// Step number in the run (0 for run-level entries)
    pub step: usize,
}

/// Type of run entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEntryType {
    /// An agent run started
    RunStart { agent: String, instruction: String },

    /// LLM request sent
    LlmRequest {
        messages: Vec<LlmMessage>,
        model: String,
        provider: String,
    },

    /// LLM response received
    LlmResponse {
        message: LlmMessage,
        usage: Option<Usage>,
        finish_reason: Option<String>,
    },

    /// Tool call initiated
    ToolCall { call: ToolCall },

    /// Tool result received
    ToolResult { result: ToolResult },

    /// Control handed off to a downstream agent
    Handoff { from: String, to: String },

    /// The run completed
    RunComplete {
        success: bool,
        final_output: String,
        total_steps: usize,
        duration_ms: u64,
    },

    /// Error occurred
    Error {
        error: String,
        context: Option<String>,
    },
}

impl RunEntry {
    /// Create a new run entry
    pub fn new(entry_type: RunEntryType, step: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            entry_type,
            step,
        }
    }

    /// Create a run start entry
    pub fn run_start(agent: String, instruction: String) -> Self {
        Self::new(RunEntryType::RunStart { agent, instruction }, 0)
    }

    /// Create an LLM request entry
    pub fn llm_request(
        messages: Vec<LlmMessage>,
        model: String,
        provider: String,
        step: usize,
    ) -> Self {
        Self::new(
            RunEntryType::LlmRequest {
                messages,
                model,
                provider,
            },
            step,
        )
    }

    /// Create an LLM response entry
    pub fn llm_response(
        message: LlmMessage,
        usage: Option<Usage>,
        finish_reason: Option<String>,
        step: usize,
    ) -> Self {
        Self::new(
            RunEntryType::LlmResponse {
                message,
                usage,
                finish_reason,
            },
            step,
        )
    }

    /// Create a tool call entry
    pub fn tool_call(call: ToolCall, step: usize) -> Self {
        Self::new(RunEntryType::ToolCall { call }, step)
    }

    /// Create a tool result entry
    pub fn tool_result(result: ToolResult, step: usize) -> Self {
        Self::new(RunEntryType::ToolResult { result }, step)
    }

    /// Create a handoff entry
    pub fn handoff(from: String, to: String, step: usize) -> Self {
        Self::new(RunEntryType::Handoff { from, to }, step)
    }

    /// Create a run completion entry
    pub fn run_complete(
        success: bool,
        final_output: String,
        total_steps: usize,
        duration_ms: u64,
    ) -> Self {
        Self::new(
            RunEntryType::RunComplete {
                success,
                final_output,
                total_steps,
                duration_ms,
            },
            total_steps,
        )
    }

    /// Create an error entry
    pub fn error(error: String, context: Option<String>, step: usize) -> Self {
        Self::new(RunEntryType::Error { error, context }, step)
    }
}
