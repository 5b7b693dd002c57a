//! Persona agents: named prompt templates bound to a shared model backend

use crate::config::CompanyProfile;
use crate::error::{LlmError, Result};
use crate::llm::{LlmClient, LlmMessage};
use std::sync::Arc;

/// A named prompt template over a shared LLM backend.
///
/// A persona has no tools and no memory; `respond` is a single
/// system-plus-user completion.
pub struct PersonaAgent {
    name: &'static str,
    instructions: String,
    llm: Arc<dyn LlmClient>,
}

impl PersonaAgent {
    /// Create a new persona agent
    pub fn new(name: &'static str, instructions: String, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            name,
            instructions,
            llm,
        }
    }

    /// Get the persona name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the persona instructions
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Run the persona once on the given input
    pub async fn respond(&self, input: &str) -> Result<String> {
        let messages = vec![
            LlmMessage::system(self.instructions.clone()),
            LlmMessage::user(input),
        ];

        tracing::debug!(persona = self.name, "invoking persona agent");

        let response = self.llm.chat_completion(messages, None, None).await?;
        response.message.get_text().ok_or_else(|| {
            LlmError::InvalidRequest {
                message: format!("Persona '{}' returned no text content", self.name),
            }
            .into()
        })
    }
}

/// Professional, serious drafting persona
pub fn professional_sales_agent(company: &CompanyProfile, llm: Arc<dyn LlmClient>) -> PersonaAgent {
    let instructions = format!(
        "You are a sales agent working for {}. \
         You write professional, serious cold emails.",
        company.context()
    );
    PersonaAgent::new("Professional Sales Agent", instructions, llm)
}

/// Humorous, engaging drafting persona
pub fn engaging_sales_agent(company: &CompanyProfile, llm: Arc<dyn LlmClient>) -> PersonaAgent {
    let instructions = format!(
        "You are a humorous, engaging sales agent working for {}. \
         You write witty, engaging cold emails that are likely to get a response.",
        company.context()
    );
    PersonaAgent::new("Engaging Sales Agent", instructions, llm)
}

/// Concise, to-the-point drafting persona
pub fn concise_sales_agent(company: &CompanyProfile, llm: Arc<dyn LlmClient>) -> PersonaAgent {
    let instructions = format!(
        "You are a busy sales agent working for {}. \
         You write concise, to the point cold emails.",
        company.context()
    );
    PersonaAgent::new("Concise Sales Agent", instructions, llm)
}

/// The fixed drafting persona list, in pipeline order
pub fn sales_personas(company: &CompanyProfile, llm: Arc<dyn LlmClient>) -> Vec<PersonaAgent> {
    vec![
        professional_sales_agent(company, llm.clone()),
        engaging_sales_agent(company, llm.clone()),
        concise_sales_agent(company, llm),
    ]
}

/// Judge persona that selects the best draft
pub fn sales_picker(llm: Arc<dyn LlmClient>) -> PersonaAgent {
    let instructions = "You pick the best cold sales email from the given options. \
         Imagine you are a customer and pick the one you are most likely to respond to. \
         Do not give an explanation; reply with the selected email only."
        .to_string();
    PersonaAgent::new("sales_picker", instructions, llm)
}

/// Formatting persona that writes a subject line
pub fn subject_writer(llm: Arc<dyn LlmClient>) -> PersonaAgent {
    let instructions = "You can write a subject for a cold sales email. \
         You are given a message and you need to write a subject for an email \
         that is likely to get a response."
        .to_string();
    PersonaAgent::new("Email subject writer", instructions, llm)
}

/// Formatting persona that converts a text body to HTML
pub fn html_converter(llm: Arc<dyn LlmClient>) -> PersonaAgent {
    let instructions = "You can convert a text email body to an HTML email body. \
         You are given a text email body which might have some markdown \
         and you need to convert it to an HTML email body with simple, \
         clear, compelling layout and design."
        .to_string();
    PersonaAgent::new("HTML email body converter", instructions, llm)
}
