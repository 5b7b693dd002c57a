//! CLI configuration loader for the sdr agent
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./sdr.json
//! 3. XDG config: $XDG_CONFIG_HOME/sdr/config.json or ~/.config/sdr/config.json
//! 4. Environment variables only (no files)
//!
//! Resolution fails before any network call when a required value is
//! missing.

use anyhow::{anyhow, bail, Context, Result};
use sdr_core::{CompanyProfile, EmailConfig, ModelParams, ResolvedLlmConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Raw configuration file format (simple single-file schema).
///
/// String credential fields accept an `env:VAR_NAME` indirection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConfig {
    /// OpenAI API key
    pub api_key: String,
    /// Base URL (optional, defaults to the OpenAI endpoint)
    pub base_url: Option<String>,
    /// Model name (optional)
    pub model: Option<String>,
    /// Model parameters (optional)
    #[serde(default)]
    pub params: ModelParams,
    /// SendGrid API key (optional, falls back to SENDGRID_API_KEY)
    pub sendgrid_api_key: Option<String>,
    /// Verified sender address (optional, falls back to SENDGRID_FROM_EMAIL)
    pub from_email: Option<String>,
    /// Recipient address (optional, falls back to SENDGRID_TO_EMAIL)
    pub to_email: Option<String>,
    /// Company name for the persona instructions (optional)
    pub company_name: Option<String>,
    /// Company description for the persona instructions (optional)
    pub company_description: Option<String>,
}

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            api_key_override: None,
            base_url_override: None,
            model_override: None,
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set API key override
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Set base URL override
    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Load and resolve the full configuration
    pub async fn load(&self) -> Result<(ResolvedLlmConfig, EmailConfig, CompanyProfile)> {
        let mut raw = self.load_raw().await?;

        // Apply flag overrides
        if let Some(api_key) = &self.api_key_override {
            raw.api_key = api_key.clone();
        }
        if let Some(base_url) = &self.base_url_override {
            raw.base_url = Some(base_url.clone());
        }
        if let Some(model) = &self.model_override {
            raw.model = Some(model.clone());
        }

        let llm_config = self.resolve_llm(&raw)?;
        let email_config = self.resolve_email(&raw)?;
        let company = self.resolve_company(&raw);

        Ok((llm_config, email_config, company))
    }

    /// Load and resolve only the email configuration
    pub async fn load_email(&self) -> Result<EmailConfig> {
        // The test-email path must not require LLM credentials
        let raw = self.load_raw().await.unwrap_or_else(|_| RawConfig {
            api_key: String::new(),
            base_url: None,
            model: None,
            params: ModelParams::default(),
            sendgrid_api_key: None,
            from_email: None,
            to_email: None,
            company_name: None,
            company_description: None,
        });

        self.resolve_email(&raw)
    }

    /// Find and load a raw configuration in priority order
    async fn load_raw(&self) -> Result<RawConfig> {
        if let Some(override_path) = &self.config_override {
            return self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            });
        }

        // 1. Current working directory
        if let Ok(cwd) = std::env::current_dir() {
            let sdr_json = cwd.join("sdr.json");
            if sdr_json.exists() {
                return self.load_file(&sdr_json).await;
            }
        }

        // 2. XDG config directory
        if let Some(config_dir) = self.xdg_config_dir() {
            let config_path = config_dir.join("sdr").join("config.json");
            if config_path.exists() {
                return self.load_file(&config_path).await;
            }
        }

        // 3. Environment variables only
        self.load_env_only()
    }

    /// Build a raw configuration from environment variables alone
    fn load_env_only(&self) -> Result<RawConfig> {
        let api_key = if self.api_key_override.is_some() {
            // The flag will be applied on top; don't require the variable
            String::new()
        } else {
            std::env::var("OPENAI_API_KEY").map_err(|_| {
                anyhow!(
                    "No configuration found. Please create an sdr.json file or set the \
                     OPENAI_API_KEY environment variable"
                )
            })?
        };

        let model = std::env::var("SDR_MODEL")
            .or_else(|_| std::env::var("OPENAI_MODEL"))
            .ok();

        Ok(RawConfig {
            api_key,
            base_url: std::env::var("OPENAI_BASE_URL").ok(),
            model,
            params: ModelParams::default(),
            sendgrid_api_key: None,
            from_email: None,
            to_email: None,
            company_name: None,
            company_description: None,
        })
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get XDG config directory
    fn xdg_config_dir(&self) -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            Some(PathBuf::from(xdg_config))
        } else if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".config"))
        } else {
            None
        }
    }

    /// Resolve the LLM side of a raw config
    fn resolve_llm(&self, raw: &RawConfig) -> Result<ResolvedLlmConfig> {
        let api_key = resolve_env_ref(&raw.api_key)?;
        let base_url = raw
            .base_url
            .clone()
            .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string());
        let model = raw
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let resolved = ResolvedLlmConfig::new(base_url, api_key, model).with_params(raw.params.clone());

        resolved
            .validate()
            .map_err(|e| anyhow!("LLM configuration validation failed: {}", e))?;

        Ok(resolved)
    }

    /// Resolve the email side of a raw config, falling back to environment
    /// variables for fields the file does not set
    fn resolve_email(&self, raw: &RawConfig) -> Result<EmailConfig> {
        let api_key = match &raw.sendgrid_api_key {
            Some(key) => resolve_env_ref(key)?,
            None => require_env("SENDGRID_API_KEY")?,
        };
        let from_email = match &raw.from_email {
            Some(addr) => addr.clone(),
            None => require_env("SENDGRID_FROM_EMAIL")?,
        };
        let to_email = match &raw.to_email {
            Some(addr) => addr.clone(),
            None => require_env("SENDGRID_TO_EMAIL")?,
        };

        let config = EmailConfig::new(api_key, from_email, to_email);
        config
            .validate()
            .map_err(|e| anyhow!("Email configuration validation failed: {}", e))?;

        Ok(config)
    }

    /// Resolve the company profile, defaulting to the built-in one
    fn resolve_company(&self, raw: &RawConfig) -> CompanyProfile {
        let defaults = CompanyProfile::default();
        let name = raw
            .company_name
            .clone()
            .or_else(|| std::env::var("SDR_COMPANY_NAME").ok())
            .unwrap_or(defaults.name);
        let description = raw
            .company_description
            .clone()
            .or_else(|| std::env::var("SDR_COMPANY_DESCRIPTION").ok())
            .unwrap_or(defaults.description);

        CompanyProfile::new(name, description)
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve an `env:VAR_NAME` indirection, or return the literal value
fn resolve_env_ref(value: &str) -> Result<String> {
    if let Some(var_name) = value.strip_prefix("env:") {
        std::env::var(var_name)
            .with_context(|| format!("Environment variable not found: {}", var_name))
    } else {
        Ok(value.to_string())
    }
}

/// Read a required environment variable with a pointed error
fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!("Required environment variable {} is not set", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("sdr.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "api_key": "file-key",
                "model": "gpt-4o",
                "sendgrid_api_key": "sg-key",
                "from_email": "sender@example.com",
                "to_email": "prospect@example.com"
            }"#,
        );

        let loader = CliConfigLoader::new().with_config_override(path);
        let (llm, email, company) = loader.load().await.unwrap();

        assert_eq!(llm.api_key, "file-key");
        assert_eq!(llm.model, "gpt-4o");
        assert_eq!(llm.base_url, OPENAI_DEFAULT_BASE_URL);
        assert_eq!(email.from_email, "sender@example.com");
        assert_eq!(company.name, "ComplAI");
    }

    #[tokio::test]
    async fn test_flag_overrides_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "api_key": "file-key",
                "model": "gpt-4o",
                "sendgrid_api_key": "sg-key",
                "from_email": "sender@example.com",
                "to_email": "prospect@example.com"
            }"#,
        );

        let loader = CliConfigLoader::new()
            .with_config_override(path)
            .with_api_key_override("flag-key".to_string())
            .with_model_override("gpt-4.1".to_string());

        let (llm, _, _) = loader.load().await.unwrap();
        assert_eq!(llm.api_key, "flag-key");
        assert_eq!(llm.model, "gpt-4.1");
    }

    #[tokio::test]
    async fn test_company_profile_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "api_key": "file-key",
                "sendgrid_api_key": "sg-key",
                "from_email": "sender@example.com",
                "to_email": "prospect@example.com",
                "company_name": "Acme",
                "company_description": "a rocket skate vendor"
            }"#,
        );

        let loader = CliConfigLoader::new().with_config_override(path);
        let (_, _, company) = loader.load().await.unwrap();
        assert_eq!(company.context(), "Acme, a rocket skate vendor");
    }

    #[tokio::test]
    async fn test_invalid_sender_address_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "api_key": "file-key",
                "sendgrid_api_key": "sg-key",
                "from_email": "not-an-address",
                "to_email": "prospect@example.com"
            }"#,
        );

        let loader = CliConfigLoader::new().with_config_override(path);
        let err = loader.load().await.unwrap_err();
        assert!(err.to_string().contains("Email configuration"));
    }

    #[tokio::test]
    async fn test_missing_config_path_fails() {
        let loader =
            CliConfigLoader::new().with_config_override(PathBuf::from("/nonexistent/sdr.json"));
        assert!(loader.load().await.is_err());
    }

    #[test]
    fn test_env_ref_literal_passthrough() {
        assert_eq!(resolve_env_ref("literal-key").unwrap(), "literal-key");
    }

    #[test]
    fn test_env_ref_missing_variable_fails() {
        assert!(resolve_env_ref("env:SDR_TEST_SURELY_UNSET_VAR").is_err());
    }
}
