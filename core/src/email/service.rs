//! SendGrid mail client

use crate::config::EmailConfig;
use crate::error::{EmailError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Outcome of an accepted send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    /// HTTP status returned by the provider (200 or 202)
    pub status_code: u16,

    /// Provider message id, when present in the response headers
    pub message_id: Option<String>,
}

/// Service for sending emails through SendGrid
#[derive(Debug)]
pub struct EmailService {
    client: Client,
    config: EmailConfig,
}

impl EmailService {
    /// Create a new email service
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send a plain text email
    pub async fn send_plain_email(&self, body: &str, subject: &str) -> Result<Delivery> {
        self.send(subject, "text/plain", body).await
    }

    /// Send an HTML email
    pub async fn send_html_email(&self, subject: &str, html_body: &str) -> Result<Delivery> {
        self.send(subject, "text/html", html_body).await
    }

    /// Send a fixed test email to verify credentials and sender setup
    pub async fn send_test_email(&self) -> Result<Delivery> {
        self.send_plain_email("This is an important test email", "Test email")
            .await
    }

    /// The configured recipient address
    pub fn to_email(&self) -> &str {
        &self.config.to_email
    }

    async fn send(&self, subject: &str, content_type: &str, body: &str) -> Result<Delivery> {
        let payload = self.build_payload(subject, content_type, body);

        tracing::debug!(
            to = %self.config.to_email,
            subject = %subject,
            content_type = %content_type,
            "sending email"
        );

        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmailError::Delivery {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !(status.as_u16() == 200 || status.as_u16() == 202) {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(Delivery {
            status_code: status.as_u16(),
            message_id,
        })
    }

    /// Build the v3 mail/send request body
    fn build_payload(&self, subject: &str, content_type: &str, body: &str) -> serde_json::Value {
        json!({
            "personalizations": [{
                "to": [{ "email": self.config.to_email }]
            }],
            "from": { "email": self.config.from_email },
            "subject": subject,
            "content": [{
                "type": content_type,
                "value": body
            }]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig::new(
            "sg-test-key".to_string(),
            "sender@example.com".to_string(),
            "prospect@example.com".to_string(),
        )
    }

    #[test]
    fn test_payload_shape() {
        let service = EmailService::new(test_config());
        let payload = service.build_payload("Hello", "text/html", "<p>Hi</p>");

        assert_eq!(payload["from"]["email"], "sender@example.com");
        assert_eq!(
            payload["personalizations"][0]["to"][0]["email"],
            "prospect@example.com"
        );
        assert_eq!(payload["subject"], "Hello");
        assert_eq!(payload["content"][0]["type"], "text/html");
        assert_eq!(payload["content"][0]["value"], "<p>Hi</p>");
    }

    #[test]
    fn test_plain_payload_content_type() {
        let service = EmailService::new(test_config());
        let payload = service.build_payload("Sales email", "text/plain", "body");
        assert_eq!(payload["content"][0]["type"], "text/plain");
    }
}
