//! Resolved configuration types for the SDR agent core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in the CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Model parameters for LLM requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
}

/// A fully resolved LLM configuration ready for use by core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLlmConfig {
    /// Base URL for the OpenAI-compatible API
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Model name/identifier
    pub model: String,
    /// Model parameters
    #[serde(default)]
    pub params: ModelParams,
}

impl ResolvedLlmConfig {
    /// Create a new resolved LLM config
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            base_url,
            api_key,
            model,
            params: ModelParams::default(),
        }
    }

    /// Set model parameters
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api_key".to_string(),
            });
        }

        if self.model.is_empty() {
            return Err(ConfigError::MissingField {
                field: "model".to_string(),
            });
        }

        if self.base_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "base_url".to_string(),
            });
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                message: "must start with http:// or https://".to_string(),
            });
        }

        if let Some(temp) = self.params.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ConfigError::InvalidValue {
                    field: "temperature".to_string(),
                    message: format!("{} is not between 0.0 and 2.0", temp),
                });
            }
        }

        if let Some(top_p) = self.params.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ConfigError::InvalidValue {
                    field: "top_p".to_string(),
                    message: format!("{} is not between 0.0 and 1.0", top_p),
                });
            }
        }

        Ok(())
    }
}

/// A fully resolved email delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SendGrid API key
    pub api_key: String,
    /// Verified sender address
    pub from_email: String,
    /// Recipient address for outreach
    pub to_email: String,
    /// Base URL for the mail API
    #[serde(default = "default_mail_base_url")]
    pub base_url: String,
}

fn default_mail_base_url() -> String {
    "https://api.sendgrid.com".to_string()
}

impl EmailConfig {
    /// Create a new email config with the default provider endpoint
    pub fn new(api_key: String, from_email: String, to_email: String) -> Self {
        Self {
            api_key,
            from_email,
            to_email,
            base_url: default_mail_base_url(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingField {
                field: "sendgrid_api_key".to_string(),
            });
        }

        if self.from_email.is_empty() || !self.from_email.contains('@') {
            return Err(ConfigError::InvalidValue {
                field: "from_email".to_string(),
                message: format!("not a valid address: {}", self.from_email),
            });
        }

        if self.to_email.is_empty() || !self.to_email.contains('@') {
            return Err(ConfigError::InvalidValue {
                field: "to_email".to_string(),
                message: format!("not a valid address: {}", self.to_email),
            });
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                message: "must start with http:// or https://".to_string(),
            });
        }

        Ok(())
    }
}

/// The company the sales personas write on behalf of
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Company name
    pub name: String,
    /// One-line description used in persona instructions
    pub description: String,
}

impl CompanyProfile {
    /// Create a new company profile
    pub fn new<S: Into<String>>(name: S, description: S) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Context string interpolated into persona instructions
    pub fn context(&self) -> String {
        format!("{}, {}", self.name, self.description)
    }
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "ComplAI".to_string(),
            description: "a company that provides a SaaS tool for ensuring SOC2 compliance \
                 and preparing for audits, powered by AI"
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_validation() {
        let config = ResolvedLlmConfig::new(
            "https://api.openai.com/v1".to_string(),
            "test-key".to_string(),
            "gpt-4o-mini".to_string(),
        );
        assert!(config.validate().is_ok());

        let mut missing_key = config.clone();
        missing_key.api_key = String::new();
        assert!(missing_key.validate().is_err());

        let mut bad_url = config.clone();
        bad_url.base_url = "api.openai.com".to_string();
        assert!(bad_url.validate().is_err());

        let mut bad_temp = config;
        bad_temp.params.temperature = Some(3.0);
        assert!(bad_temp.validate().is_err());
    }

    #[test]
    fn test_email_config_validation() {
        let config = EmailConfig::new(
            "sg-key".to_string(),
            "sender@example.com".to_string(),
            "prospect@example.com".to_string(),
        );
        assert!(config.validate().is_ok());

        let mut missing_key = config.clone();
        missing_key.api_key = String::new();
        assert!(missing_key.validate().is_err());

        let mut bad_sender = config;
        bad_sender.from_email = "not-an-address".to_string();
        assert!(bad_sender.validate().is_err());
    }

    #[test]
    fn test_company_context() {
        let profile = CompanyProfile::new("Acme", "a rocket skate vendor");
        assert_eq!(profile.context(), "Acme, a rocket skate vendor");

        let default = CompanyProfile::default();
        assert!(default.context().starts_with("ComplAI, "));
    }
}
