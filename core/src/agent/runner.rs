//! Tool-calling run loop for coordinating agents

use crate::error::{AgentError, Result};
use crate::llm::{ContentBlock, LlmClient, LlmMessage};
use crate::tools::{ToolCall, ToolExecutor};
use crate::trace::{RunEntry, RunRecorder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Default bound on the number of model round-trips in one run
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Outcome of one agent run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Final text output of the run
    pub final_output: String,

    /// Number of model round-trips executed
    pub steps: usize,

    /// Total run duration in milliseconds
    pub duration_ms: u64,

    /// Whether control was handed off to a downstream agent
    pub handoff_occurred: bool,
}

/// An agent that repeatedly calls the model, executes requested tools, and
/// feeds results back until the model answers in plain text.
///
/// A successful handoff tool call ends the run: the downstream agent's
/// output becomes the final output.
pub struct ToolLoopAgent {
    name: String,
    instructions: String,
    llm: Arc<dyn LlmClient>,
    tools: ToolExecutor,
    max_steps: usize,
    recorder: Option<Arc<RunRecorder>>,
}

impl ToolLoopAgent {
    /// Create a new tool-loop agent
    pub fn new<S: Into<String>>(
        name: S,
        instructions: S,
        llm: Arc<dyn LlmClient>,
        tools: ToolExecutor,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            llm,
            tools,
            max_steps: DEFAULT_MAX_STEPS,
            recorder: None,
        }
    }

    /// Set the maximum number of model round-trips
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Attach a run recorder
    pub fn with_recorder(mut self, recorder: Arc<RunRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Get the agent name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the tools this agent can call
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.list_tools()
    }

    /// Run the agent on a task until it produces a text answer, hands off,
    /// or exceeds the step bound.
    pub async fn run(&self, task: &str) -> Result<RunReport> {
        let start_time = Instant::now();

        let mut messages = vec![
            LlmMessage::system(self.instructions.clone()),
            LlmMessage::user(task),
        ];

        if let Some(recorder) = &self.recorder {
            recorder
                .record(RunEntry::run_start(self.name.clone(), task.to_string()))
                .await?;
        }

        let tool_definitions = self.tools.get_tool_definitions();

        for step in 1..=self.max_steps {
            if let Some(recorder) = &self.recorder {
                recorder
                    .record(RunEntry::llm_request(
                        messages.clone(),
                        self.llm.model_name().to_string(),
                        self.llm.provider_name().to_string(),
                        step,
                    ))
                    .await?;
            }

            let response = self
                .llm
                .chat_completion(messages.clone(), Some(tool_definitions.clone()), None)
                .await
                .inspect_err(|e| {
                    tracing::error!(agent = %self.name, step, "LLM request failed: {}", e);
                })?;

            if let Some(recorder) = &self.recorder {
                recorder
                    .record(RunEntry::llm_response(
                        response.message.clone(),
                        response.usage.clone(),
                        response.finish_reason.as_ref().map(|r| format!("{:?}", r)),
                        step,
                    ))
                    .await?;
            }

            messages.push(response.message.clone());

            if response.message.has_tool_use() {
                for tool_use in response.message.get_tool_uses() {
                    if let ContentBlock::ToolUse { id, name, input } = tool_use {
                        let call = ToolCall {
                            id: id.clone(),
                            name: name.clone(),
                            parameters: input.clone(),
                        };

                        if let Some(recorder) = &self.recorder {
                            recorder.record(RunEntry::tool_call(call.clone(), step)).await?;
                        }

                        let is_handoff = self.tools.is_handoff(name);
                        let tool_result = self.tools.execute(call).await?;

                        if let Some(recorder) = &self.recorder {
                            recorder
                                .record(RunEntry::tool_result(tool_result.clone(), step))
                                .await?;
                        }

                        // Control transfer: the downstream agent's output is
                        // the final output of this run.
                        if is_handoff && tool_result.success {
                            let duration_ms = start_time.elapsed().as_millis() as u64;

                            if let Some(recorder) = &self.recorder {
                                recorder
                                    .record(RunEntry::handoff(
                                        self.name.clone(),
                                        name.clone(),
                                        step,
                                    ))
                                    .await?;
                                recorder
                                    .record(RunEntry::run_complete(
                                        true,
                                        tool_result.content.clone(),
                                        step,
                                        duration_ms,
                                    ))
                                    .await?;
                            }

                            return Ok(RunReport {
                                final_output: tool_result.content,
                                steps: step,
                                duration_ms,
                                handoff_occurred: true,
                            });
                        }

                        messages.push(LlmMessage::tool_result(
                            id.clone(),
                            !tool_result.success,
                            tool_result.content,
                        ));
                    }
                }

                // One model round-trip per step; the next step lets the
                // model process the tool results.
                continue;
            }

            let final_output = response.message.get_text().unwrap_or_default();
            let duration_ms = start_time.elapsed().as_millis() as u64;

            if let Some(recorder) = &self.recorder {
                recorder
                    .record(RunEntry::run_complete(
                        true,
                        final_output.clone(),
                        step,
                        duration_ms,
                    ))
                    .await?;
            }

            return Ok(RunReport {
                final_output,
                steps: step,
                duration_ms,
                handoff_occurred: false,
            });
        }

        if let Some(recorder) = &self.recorder {
            recorder
                .record(RunEntry::error(
                    format!("run exceeded {} steps", self.max_steps),
                    Some(self.name.clone()),
                    self.max_steps,
                ))
                .await?;
        }

        Err(AgentError::MaxStepsExceeded {
            max_steps: self.max_steps,
        }
        .into())
    }
}
