//! Sales manager orchestration
//!
//! Coordinates the drafting personas, draft selection, formatting and
//! delivery into one pipeline.

pub mod guardrail;

use crate::agent::{persona, RunReport, ToolLoopAgent, DEFAULT_MAX_STEPS};
use crate::config::{CompanyProfile, EmailConfig, ResolvedLlmConfig};
use crate::email::EmailService;
use crate::error::{AgentError, Error, Result};
use crate::llm::{LlmClient, OpenAiClient};
use crate::tools::{ToolExecutor, ToolFactory};
use crate::trace::RunRecorder;
use futures::future;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One persona's email draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    /// Name of the persona that wrote the draft
    pub persona: String,

    /// Draft email body
    pub body: String,
}

/// The chosen draft, with formatting applied in place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedEmail {
    /// Body of the winning draft
    pub body: String,

    /// Subject line, once written
    pub subject: Option<String>,

    /// HTML body, once converted
    pub html_body: Option<String>,
}

impl SelectedEmail {
    /// Wrap a winning draft body
    pub fn new<S: Into<String>>(body: S) -> Self {
        Self {
            body: body.into(),
            subject: None,
            html_body: None,
        }
    }
}

/// Orchestrates the multi-agent cold sales email pipeline
pub struct SdrManager {
    llm: Arc<dyn LlmClient>,
    email: Arc<EmailService>,
    company: CompanyProfile,
    max_steps: usize,
    recorder: Option<Arc<RunRecorder>>,
}

impl std::fmt::Debug for SdrManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdrManager")
            .field("llm", &"Arc<dyn LlmClient>")
            .field("email", &self.email)
            .field("company", &self.company)
            .field("max_steps", &self.max_steps)
            .field("recorder", &self.recorder)
            .finish()
    }
}

impl SdrManager {
    /// Create a manager from resolved configuration.
    ///
    /// Both configurations are validated here, before any network call.
    pub fn new(
        llm_config: &ResolvedLlmConfig,
        email_config: EmailConfig,
        company: CompanyProfile,
    ) -> Result<Self> {
        llm_config.validate()?;
        email_config.validate()?;

        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(llm_config)?);
        let email = Arc::new(EmailService::new(email_config));
        Ok(Self::with_client(llm, email, company))
    }

    /// Create a manager from already constructed components
    pub fn with_client(
        llm: Arc<dyn LlmClient>,
        email: Arc<EmailService>,
        company: CompanyProfile,
    ) -> Self {
        Self {
            llm,
            email,
            company,
            max_steps: DEFAULT_MAX_STEPS,
            recorder: None,
        }
    }

    /// Set the step bound for coordinating agent runs
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Attach a run recorder
    pub fn with_recorder(mut self, recorder: Arc<RunRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Generate one draft per declared persona, in persona-list order.
    ///
    /// The three model calls are issued together and joined; the returned
    /// order is the fixed persona order regardless of completion order.
    pub async fn generate_emails(&self, instruction: &str) -> Result<Vec<Draft>> {
        let personas = persona::sales_personas(&self.company, self.llm.clone());

        future::try_join_all(personas.iter().map(|p| async move {
            let body = p.respond(instruction).await?;
            Ok::<_, Error>(Draft {
                persona: p.name().to_string(),
                body,
            })
        }))
        .await
    }

    /// Ask the judge persona to pick the best draft.
    ///
    /// The judge's reply is taken verbatim as the selected body; there is
    /// no deterministic tie-break.
    pub async fn pick_best_email(&self, drafts: &[Draft]) -> Result<SelectedEmail> {
        let picker = persona::sales_picker(self.llm.clone());

        let joined = drafts
            .iter()
            .map(|d| d.body.as_str())
            .collect::<Vec<_>>()
            .join("\n\nEmail:\n\n");
        let prompt = format!("Cold sales emails:\n\n{}", joined);

        let body = picker.respond(&prompt).await?;
        Ok(SelectedEmail::new(body))
    }

    /// Apply the formatting personas to a selected email, in place:
    /// subject first, then the HTML conversion of the body.
    pub async fn format_email(&self, email: &mut SelectedEmail) -> Result<()> {
        let subject = persona::subject_writer(self.llm.clone())
            .respond(&email.body)
            .await?;
        email.subject = Some(subject);

        let html = persona::html_converter(self.llm.clone())
            .respond(&email.body)
            .await?;
        email.html_body = Some(html);

        Ok(())
    }

    /// Run the coordinating sales-manager agent: draft, select, and send.
    ///
    /// With `use_handoff` the winning draft is passed to the Email Manager
    /// agent, which owns the formatting and sending tools. Without it the
    /// sales manager sends the plain text draft itself through the
    /// `send_email` tool; the handoff path is never constructed.
    pub async fn send_sales_email(&self, message: &str, use_handoff: bool) -> Result<RunReport> {
        let check = guardrail::check_for_name(self.llm.clone(), message).await?;
        if check.is_name_in_message {
            tracing::warn!(name = %check.name, "guardrail rejected instruction");
            return Err(AgentError::GuardrailTriggered { name: check.name }.into());
        }

        let factory = ToolFactory::new(self.llm.clone(), self.email.clone(), self.company.clone());

        let mut tools = ToolExecutor::new();
        for tool in factory.sales_agent_tools() {
            tools.register_tool(tool);
        }

        let instructions = if use_handoff {
            let mut email_manager_tools = ToolExecutor::new();
            for tool in factory.email_formatting_tools() {
                email_manager_tools.register_tool(tool);
            }
            email_manager_tools.register_tool(factory.send_html_email_tool());

            let mut email_manager = ToolLoopAgent::new(
                "Email Manager".to_string(),
                EMAIL_MANAGER_INSTRUCTIONS.to_string(),
                self.llm.clone(),
                email_manager_tools,
            )
            .with_max_steps(self.max_steps);
            if let Some(recorder) = &self.recorder {
                email_manager = email_manager.with_recorder(recorder.clone());
            }

            tools.register_tool(factory.handoff_tool(Arc::new(email_manager)));
            handoff_instructions(&self.company)
        } else {
            tools.register_tool(factory.send_email_tool());
            tools_only_instructions(&self.company)
        };

        let mut sales_manager = ToolLoopAgent::new(
            "Sales Manager".to_string(),
            instructions,
            self.llm.clone(),
            tools,
        )
        .with_max_steps(self.max_steps);
        if let Some(recorder) = &self.recorder {
            sales_manager = sales_manager.with_recorder(recorder.clone());
        }

        sales_manager.run(message).await
    }
}

const EMAIL_MANAGER_INSTRUCTIONS: &str = "You are an email formatter and sender. You receive the body of an email to be sent. \
     You first use the subject_writer tool to write a subject for the email, \
     then use the html_converter tool to convert the body to HTML. \
     Finally, you use the send_html_email tool to send the email with the subject and HTML body.";

fn handoff_instructions(company: &CompanyProfile) -> String {
    format!(
        "You are a Sales Manager at {}. Your goal is to find the single best cold sales email \
using the sales_agent tools.

Follow these steps carefully:
1. Generate Drafts: Use all three sales_agent tools to generate three different email drafts. \
Do not proceed until all three drafts are ready.

2. Evaluate and Select: Review the drafts and choose the single best email using your judgment \
of which one is most effective. You can use the tools multiple times if you're not satisfied \
with the results from the first try.

3. Handoff for Sending: Pass ONLY the winning email draft to the Email Manager through the \
transfer_to_email_manager tool. The Email Manager will take care of formatting and sending.

Crucial Rules:
- You must use the sales agent tools to generate the drafts, do not write them yourself.
- You must hand off exactly ONE email to the Email Manager, never more than one.",
        company.name
    )
}

fn tools_only_instructions(company: &CompanyProfile) -> String {
    format!(
        "You are a Sales Manager at {}. Your goal is to find the single best cold sales email \
using the sales_agent tools.

Follow these steps carefully:
1. Generate Drafts: Use all three sales_agent tools to generate three different email drafts. \
Do not proceed until all three drafts are ready.

2. Evaluate and Select: Review the drafts and choose the single best email using your judgment \
of which one is most effective.

3. Use the send_email tool to send the best email (and only the best email) to the user.

Crucial Rules:
- You must use the sales agent tools to generate the drafts, do not write them yourself.
- You must send ONE email using the send_email tool, never more than one.",
        company.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{
        ChatOptions, ContentBlock, LlmMessage, LlmResponse, MessageContent, MessageRole,
        ToolDefinition,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// What the mock saw on each call: the tool names it was offered
    #[derive(Debug, Clone)]
    struct SeenCall {
        offered_tools: Vec<String>,
    }

    /// Mock client that plays back a fixed script and records what each
    /// call offered
    struct ScriptedLlmClient {
        script: Mutex<Vec<LlmMessage>>,
        seen: Mutex<Vec<SeenCall>>,
    }

    impl ScriptedLlmClient {
        fn new(mut responses: Vec<LlmMessage>) -> Self {
            responses.reverse();
            Self {
                script: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen_calls(&self) -> Vec<SeenCall> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlmClient {
        async fn chat_completion(
            &self,
            _messages: Vec<LlmMessage>,
            tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> crate::error::Result<LlmResponse> {
            self.seen.lock().unwrap().push(SeenCall {
                offered_tools: tools
                    .unwrap_or_default()
                    .iter()
                    .map(|t| t.function.name.clone())
                    .collect(),
            });

            let message = self
                .script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| LlmMessage::assistant("done"));
            Ok(LlmResponse {
                message,
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

    fn test_manager(llm: Arc<ScriptedLlmClient>) -> SdrManager {
        let email = Arc::new(EmailService::new(EmailConfig::new(
            "sg-key".to_string(),
            "sender@example.com".to_string(),
            "prospect@example.com".to_string(),
        )));
        SdrManager::with_client(llm, email, CompanyProfile::default())
    }

    fn no_name_found() -> LlmMessage {
        LlmMessage::assistant(r#"{"is_name_in_message": false, "name": ""}"#)
    }

    fn tool_use(name: &str, input: serde_json::Value) -> LlmMessage {
        LlmMessage {
            role: MessageRole::Assistant,
            content: MessageContent::Blocks(vec![ContentBlock::ToolUse {
                id: "call_1".to_string(),
                name: name.to_string(),
                input,
            }]),
        }
    }

    #[test]
    fn test_new_rejects_missing_credentials_before_any_call() {
        let llm_config = ResolvedLlmConfig::new(
            "https://api.openai.com/v1".to_string(),
            String::new(),
            "gpt-4o-mini".to_string(),
        );
        let email_config = EmailConfig::new(
            "sg-key".to_string(),
            "sender@example.com".to_string(),
            "prospect@example.com".to_string(),
        );

        let err = SdrManager::new(&llm_config, email_config, CompanyProfile::default())
            .unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[tokio::test]
    async fn test_generate_emails_one_draft_per_persona() {
        let llm = Arc::new(ScriptedLlmClient::new(vec![
            LlmMessage::assistant("draft A"),
            LlmMessage::assistant("draft B"),
            LlmMessage::assistant("draft C"),
        ]));
        let manager = test_manager(llm);

        let drafts = manager
            .generate_emails("Write a cold sales email")
            .await
            .unwrap();

        assert_eq!(drafts.len(), 3);
        let personas: Vec<_> = drafts.iter().map(|d| d.persona.as_str()).collect();
        assert_eq!(
            personas,
            vec![
                "Professional Sales Agent",
                "Engaging Sales Agent",
                "Concise Sales Agent"
            ]
        );
    }

    #[tokio::test]
    async fn test_pick_best_email_returns_judge_reply() {
        let llm = Arc::new(ScriptedLlmClient::new(vec![LlmMessage::assistant(
            "the winning draft",
        )]));
        let manager = test_manager(llm);

        let drafts = vec![
            Draft {
                persona: "Professional Sales Agent".to_string(),
                body: "draft A".to_string(),
            },
            Draft {
                persona: "Engaging Sales Agent".to_string(),
                body: "draft B".to_string(),
            },
        ];

        let selected = manager.pick_best_email(&drafts).await.unwrap();
        assert_eq!(selected.body, "the winning draft");
        assert!(selected.subject.is_none());
        assert!(selected.html_body.is_none());
    }

    #[tokio::test]
    async fn test_format_email_mutates_in_place() {
        let llm = Arc::new(ScriptedLlmClient::new(vec![
            LlmMessage::assistant("A subject"),
            LlmMessage::assistant("<p>body</p>"),
        ]));
        let manager = test_manager(llm);

        let mut email = SelectedEmail::new("body");
        manager.format_email(&mut email).await.unwrap();

        assert_eq!(email.subject.as_deref(), Some("A subject"));
        assert_eq!(email.html_body.as_deref(), Some("<p>body</p>"));
    }

    #[tokio::test]
    async fn test_no_handoff_never_offers_handoff_tool() {
        let llm = Arc::new(ScriptedLlmClient::new(vec![
            no_name_found(),
            LlmMessage::assistant("Email sent"),
        ]));
        let manager = test_manager(llm.clone());

        let report = manager
            .send_sales_email("Write a cold sales email", false)
            .await
            .unwrap();

        assert!(!report.handoff_occurred);

        // First call is the guardrail (no tools); the manager loop offers
        // the drafting tools plus send_email and never the handoff.
        let seen = llm.seen_calls();
        assert!(seen[0].offered_tools.is_empty());
        for call in &seen[1..] {
            assert!(call.offered_tools.contains(&"send_email".to_string()));
            assert!(!call
                .offered_tools
                .contains(&"transfer_to_email_manager".to_string()));
        }
    }

    #[tokio::test]
    async fn test_handoff_path_always_offered_and_reported() {
        let llm = Arc::new(ScriptedLlmClient::new(vec![
            no_name_found(),
            // Sales manager immediately hands the draft off
            tool_use(
                "transfer_to_email_manager",
                json!({"body": "winning draft"}),
            ),
            // Email manager answers without calling tools
            LlmMessage::assistant("formatted and sent"),
        ]));
        let manager = test_manager(llm.clone());

        let report = manager
            .send_sales_email("Write a cold sales email", true)
            .await
            .unwrap();

        assert!(report.handoff_occurred);
        assert_eq!(report.final_output, "formatted and sent");

        let seen = llm.seen_calls();
        // Call 1: guardrail. Call 2: sales manager with the handoff tool
        // offered. Call 3: email manager with the formatting tools.
        assert!(seen[1]
            .offered_tools
            .contains(&"transfer_to_email_manager".to_string()));
        assert!(!seen[1].offered_tools.contains(&"send_email".to_string()));
        assert!(seen[2].offered_tools.contains(&"subject_writer".to_string()));
        assert!(seen[2].offered_tools.contains(&"html_converter".to_string()));
        assert!(seen[2]
            .offered_tools
            .contains(&"send_html_email".to_string()));
    }

    #[tokio::test]
    async fn test_guardrail_blocks_run_before_drafting() {
        let llm = Arc::new(ScriptedLlmClient::new(vec![LlmMessage::assistant(
            r#"{"is_name_in_message": true, "name": "Alice"}"#,
        )]));
        let manager = test_manager(llm.clone());

        let err = manager
            .send_sales_email("Send a cold sales email from Alice", true)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Guardrail"));
        // Only the guardrail call went out
        assert_eq!(llm.seen_calls().len(), 1);
    }
}
