use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{EmailMessage, Mailer};
use crate::core::error::{AppError, Result};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body understood by the mail API
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Mailer backed by an HTTP JSON mail API
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: &str, api_key: Option<String>, from: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let body = SendEmailRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };

        let mut request = self.client.post(&self.api_url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Mail API request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Mail API returned status {}",
                response.status()
            )));
        }

        tracing::debug!("Email sent to {}", message.to);
        Ok(())
    }
}
