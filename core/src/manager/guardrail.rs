//! Input guardrail: refuse instructions that include a personal name

use crate::error::{LlmError, Result};
use crate::llm::{LlmClient, LlmMessage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structured output of the name check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameCheck {
    /// Whether the instruction contains a personal name
    pub is_name_in_message: bool,

    /// The detected name, empty when none was found
    #[serde(default)]
    pub name: String,
}

const NAME_CHECK_INSTRUCTIONS: &str = "Check if the user is including someone's personal name \
     in what they want you to do. Respond with JSON only, no prose, exactly in the form \
     {\"is_name_in_message\": <true|false>, \"name\": \"<the detected name, or empty>\"}.";

/// Run the name check against the given instruction
pub async fn check_for_name(llm: Arc<dyn LlmClient>, message: &str) -> Result<NameCheck> {
    let messages = vec![
        LlmMessage::system(NAME_CHECK_INSTRUCTIONS),
        LlmMessage::user(message),
    ];

    let response = llm.chat_completion(messages, None, None).await?;
    let text = response
        .message
        .get_text()
        .ok_or_else(|| LlmError::InvalidRequest {
            message: "Name check returned no text content".to_string(),
        })?;

    parse_name_check(&text)
}

/// Parse the model's JSON reply, tolerating a markdown code fence
fn parse_name_check(text: &str) -> Result<NameCheck> {
    let stripped = strip_code_fence(text);
    serde_json::from_str(stripped).map_err(|_| {
        LlmError::InvalidRequest {
            message: format!("Name check returned malformed output: {}", text),
        }
        .into()
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") and the closing fence
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.trim_end_matches('`').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let check = parse_name_check(r#"{"is_name_in_message": true, "name": "Alice"}"#).unwrap();
        assert!(check.is_name_in_message);
        assert_eq!(check.name, "Alice");
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = "```json\n{\"is_name_in_message\": false, \"name\": \"\"}\n```";
        let check = parse_name_check(fenced).unwrap();
        assert!(!check.is_name_in_message);
    }

    #[test]
    fn test_parse_missing_name_defaults_empty() {
        let check = parse_name_check(r#"{"is_name_in_message": false}"#).unwrap();
        assert_eq!(check.name, "");
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(parse_name_check("I could not decide").is_err());
    }
}
