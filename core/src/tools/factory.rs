//! Factory for the pipeline's tool set
//!
//! Wraps persona agents and email sends as tools a coordinating agent can
//! call through the model's function-calling mechanism.

use crate::agent::{persona, PersonaAgent, ToolLoopAgent};
use crate::config::CompanyProfile;
use crate::email::EmailService;
use crate::error::Result;
use crate::llm::LlmClient;
use crate::tools::{Tool, ToolCall, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Tool name of the handoff to the email manager
pub const HANDOFF_TOOL_NAME: &str = "transfer_to_email_manager";

/// A persona agent exposed as a tool
pub struct AgentTool {
    name: String,
    description: String,
    agent: PersonaAgent,
}

impl AgentTool {
    /// Wrap a persona agent under a tool name
    pub fn new<S: Into<String>>(name: S, description: S, agent: PersonaAgent) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            agent,
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "Input message for the agent"
                }
            },
            "required": ["input"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let input: String = call.get_parameter("input")?;
        let output = self.agent.respond(&input).await?;
        Ok(ToolResult::success(call.id, output))
    }
}

/// Tool that sends a plain text email to the configured recipient
pub struct SendEmailTool {
    service: Arc<EmailService>,
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send out an email with the given body to all sales prospects"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "body": {
                    "type": "string",
                    "description": "Plain text body of the email"
                }
            },
            "required": ["body"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let body: String = call.get_parameter("body")?;
        let delivery = self.service.send_plain_email(&body, "Sales email").await?;
        let content = json!({
            "status": "success",
            "status_code": delivery.status_code
        })
        .to_string();
        Ok(ToolResult::success(call.id, content))
    }
}

/// Tool that sends an HTML email to the configured recipient
pub struct SendHtmlEmailTool {
    service: Arc<EmailService>,
}

#[async_trait]
impl Tool for SendHtmlEmailTool {
    fn name(&self) -> &str {
        "send_html_email"
    }

    fn description(&self) -> &str {
        "Send out an email with the given subject and HTML body to all sales prospects"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "subject": {
                    "type": "string",
                    "description": "Subject line of the email"
                },
                "html_body": {
                    "type": "string",
                    "description": "HTML body of the email"
                }
            },
            "required": ["subject", "html_body"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let subject: String = call.get_parameter("subject")?;
        let html_body: String = call.get_parameter("html_body")?;
        let delivery = self.service.send_html_email(&subject, &html_body).await?;
        let content = json!({
            "status": "success",
            "status_code": delivery.status_code
        })
        .to_string();
        Ok(ToolResult::success(call.id, content))
    }
}

/// Handoff to a downstream tool-loop agent.
///
/// Executing this tool runs the downstream agent on the given body; the
/// run loop treats a successful execution as a control transfer.
pub struct HandoffTool {
    agent: Arc<ToolLoopAgent>,
}

impl HandoffTool {
    /// Wrap a downstream agent as a handoff target
    pub fn new(agent: Arc<ToolLoopAgent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Tool for HandoffTool {
    fn name(&self) -> &str {
        HANDOFF_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Hand the winning email draft to the Email Manager, which converts it to HTML and sends it"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "body": {
                    "type": "string",
                    "description": "The winning email draft to format and send"
                }
            },
            "required": ["body"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let body: String = call.get_parameter("body")?;
        tracing::info!(to = %self.agent.name(), "handing off winning draft");
        let report = self.agent.run(&body).await?;
        Ok(ToolResult::success(call.id, report.final_output))
    }

    fn is_handoff(&self) -> bool {
        true
    }
}

/// Builds the tools the pipeline's coordinating agents use
pub struct ToolFactory {
    llm: Arc<dyn LlmClient>,
    email: Arc<EmailService>,
    company: CompanyProfile,
}

impl ToolFactory {
    /// Create a new tool factory
    pub fn new(llm: Arc<dyn LlmClient>, email: Arc<EmailService>, company: CompanyProfile) -> Self {
        Self {
            llm,
            email,
            company,
        }
    }

    /// The three drafting persona tools, in pipeline order
    pub fn sales_agent_tools(&self) -> Vec<Box<dyn Tool>> {
        let description = "Write a cold sales email";
        let personas = persona::sales_personas(&self.company, self.llm.clone());

        personas
            .into_iter()
            .enumerate()
            .map(|(i, agent)| {
                Box::new(AgentTool::new(
                    format!("sales_agent{}", i + 1),
                    description.to_string(),
                    agent,
                )) as Box<dyn Tool>
            })
            .collect()
    }

    /// Subject writer and HTML converter tools for the email manager
    pub fn email_formatting_tools(&self) -> Vec<Box<dyn Tool>> {
        vec![
            Box::new(AgentTool::new(
                "subject_writer",
                "Write a subject for a cold sales email",
                persona::subject_writer(self.llm.clone()),
            )),
            Box::new(AgentTool::new(
                "html_converter",
                "Convert a text email body to an HTML email body",
                persona::html_converter(self.llm.clone()),
            )),
        ]
    }

    /// Plain text send tool for the no-handoff topology
    pub fn send_email_tool(&self) -> Box<dyn Tool> {
        Box::new(SendEmailTool {
            service: self.email.clone(),
        })
    }

    /// HTML send tool for the email manager
    pub fn send_html_email_tool(&self) -> Box<dyn Tool> {
        Box::new(SendHtmlEmailTool {
            service: self.email.clone(),
        })
    }

    /// Handoff tool targeting the given downstream agent
    pub fn handoff_tool(&self, agent: Arc<ToolLoopAgent>) -> Box<dyn Tool> {
        Box::new(HandoffTool::new(agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmailConfig;
    use crate::error::Result;
    use crate::llm::{ChatOptions, LlmMessage, LlmResponse, ToolDefinition};
    use async_trait::async_trait;

    struct MockLlmClient;

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn chat_completion(
            &self,
            messages: Vec<LlmMessage>,
            _tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmResponse> {
            let user_text = messages
                .last()
                .and_then(|m| m.get_text())
                .unwrap_or_default();
            Ok(LlmResponse {
                message: LlmMessage::assistant(format!("reply: {}", user_text)),
                usage: None,
                model: "mock-model".to_string(),
                finish_reason: None,
            })
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }

    fn test_factory() -> ToolFactory {
        let email = EmailService::new(EmailConfig::new(
            "sg-key".to_string(),
            "sender@example.com".to_string(),
            "prospect@example.com".to_string(),
        ));
        ToolFactory::new(
            Arc::new(MockLlmClient),
            Arc::new(email),
            CompanyProfile::default(),
        )
    }

    #[test]
    fn test_sales_agent_tools_are_three_and_named() {
        let tools = test_factory().sales_agent_tools();
        let names: Vec<_> = tools.iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["sales_agent1", "sales_agent2", "sales_agent3"]);
        assert!(tools.iter().all(|t| !t.is_handoff()));
    }

    #[test]
    fn test_formatting_tools() {
        let tools = test_factory().email_formatting_tools();
        let names: Vec<_> = tools.iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["subject_writer", "html_converter"]);
    }

    #[test]
    fn test_send_tools_schemas() {
        let factory = test_factory();

        let plain = factory.send_email_tool();
        assert_eq!(plain.name(), "send_email");
        assert_eq!(plain.parameters_schema()["required"][0], "body");

        let html = factory.send_html_email_tool();
        assert_eq!(html.name(), "send_html_email");
        let required = html.parameters_schema()["required"].clone();
        assert_eq!(required[0], "subject");
        assert_eq!(required[1], "html_body");
    }

    #[tokio::test]
    async fn test_agent_tool_executes_persona() {
        let tools = test_factory().sales_agent_tools();
        let call = ToolCall::new("sales_agent1", serde_json::json!({"input": "draft one"}));
        let result = tools[0].execute(call).await.unwrap();

        assert!(result.success);
        assert_eq!(result.content, "reply: draft one");
    }

    #[test]
    fn test_handoff_tool_is_marked() {
        let factory = test_factory();
        let downstream = Arc::new(ToolLoopAgent::new(
            "Email Manager",
            "format and send",
            Arc::new(MockLlmClient),
            crate::tools::ToolExecutor::new(),
        ));
        let handoff = factory.handoff_tool(downstream);

        assert_eq!(handoff.name(), HANDOFF_TOOL_NAME);
        assert!(handoff.is_handoff());
    }
}
