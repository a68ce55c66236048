//! Email service for dispatching entry pass emails.
//!
//! Supports multiple providers:
//! - `console`: Logs emails and returns a mock message ID (development)
//! - `resend`: Uses the Resend API
//! - `sendgrid`: Uses the SendGrid API
//!
//! Providers without a configured API key fall back to the console path so
//! development environments can exercise the full send pipeline.

use crate::config::EmailConfig;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient name
    pub to_name: String,
    /// Email subject
    pub subject: String,
    /// HTML body
    pub body_html: String,
}

/// Email service for sending transactional emails.
///
/// Returns the provider's message ID on success.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            config: Arc::new(config),
            client,
        }
    }

    /// Send an email message and return the provider message ID.
    pub async fn send(&self, message: EmailMessage) -> Result<String, EmailError> {
        match self.config.provider.as_str() {
            "console" => self.send_console(message),
            "resend" => {
                if self.config.resend_api_key.is_empty() {
                    debug!("Resend API key not configured, using console fallback");
                    self.send_console(message)
                } else {
                    self.send_resend(message).await
                }
            }
            "sendgrid" => {
                if self.config.sendgrid_api_key.is_empty() {
                    debug!("SendGrid API key not configured, using console fallback");
                    self.send_console(message)
                } else {
                    self.send_sendgrid(message).await
                }
            }
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Console provider: logs the email and fabricates a message ID.
    fn send_console(&self, message: EmailMessage) -> Result<String, EmailError> {
        let message_id = format!("mock-{}", Utc::now().timestamp_millis());

        info!(
            to = %message.to,
            to_name = %message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            message_id = %message_id,
            body_html_length = message.body_html.len(),
            "Email (console provider)"
        );

        Ok(message_id)
    }

    /// Resend provider.
    async fn send_resend(&self, message: EmailMessage) -> Result<String, EmailError> {
        let body = serde_json::json!({
            "from": format!("{} <{}>", self.config.sender_name, self.config.sender_email),
            "to": [message.to],
            "subject": message.subject,
            "html": message.body_html,
        });

        let response = self
            .client
            .post("https://api.resend.com/emails")
            .bearer_auth(&self.config.resend_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("Resend request failed: {}", e)))?;

        if response.status().is_success() {
            let payload: serde_json::Value = response
                .json()
                .await
                .map_err(|e| EmailError::ProviderError(format!("Resend response: {}", e)))?;
            let message_id = payload["id"].as_str().unwrap_or_default().to_string();
            info!(message_id = %message_id, "Email sent via Resend");
            Ok(message_id)
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "Resend API error");
            Err(EmailError::ProviderError(format!(
                "Resend returned {}: {}",
                status, error_body
            )))
        }
    }

    /// SendGrid provider.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<String, EmailError> {
        let body = serde_json::json!({
            "personalizations": [{
                "to": [{ "email": message.to, "name": message.to_name }]
            }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": [{
                "type": "text/html",
                "value": message.body_html
            }]
        });

        let response = self
            .client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            let message_id = response
                .headers()
                .get("X-Message-Id")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("sendgrid-{}", Utc::now().timestamp_millis()));
            info!(message_id = %message_id, "Email sent via SendGrid");
            Ok(message_id)
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "SendGrid API error");
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(provider: &str) -> EmailConfig {
        EmailConfig {
            provider: provider.to_string(),
            resend_api_key: String::new(),
            sendgrid_api_key: String::new(),
            sender_email: "passes@example.com".to_string(),
            sender_name: "Front Desk".to_string(),
            company_name: "Example Corp".to_string(),
            timeout_secs: 5,
        }
    }

    fn test_message() -> EmailMessage {
        EmailMessage {
            to: "visitor@example.com".to_string(),
            to_name: "Jane Roe".to_string(),
            subject: "Your entry pass".to_string(),
            body_html: "<p>pass</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_console_send_returns_mock_id() {
        let service = EmailService::new(test_config("console"));
        let id = service.send(test_message()).await.unwrap();
        assert!(id.starts_with("mock-"));
    }

    #[tokio::test]
    async fn test_resend_without_key_falls_back_to_console() {
        let service = EmailService::new(test_config("resend"));
        let id = service.send(test_message()).await.unwrap();
        assert!(id.starts_with("mock-"));
    }

    #[tokio::test]
    async fn test_sendgrid_without_key_falls_back_to_console() {
        let service = EmailService::new(test_config("sendgrid"));
        let id = service.send(test_message()).await.unwrap();
        assert!(id.starts_with("mock-"));
    }

    #[tokio::test]
    async fn test_unknown_provider_fails() {
        let service = EmailService::new(test_config("carrier-pigeon"));
        assert!(matches!(
            service.send(test_message()).await,
            Err(EmailError::NotConfigured)
        ));
    }
}
