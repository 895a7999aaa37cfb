use async_trait::async_trait;

use super::{EmailMessage, Mailer};
use crate::core::error::Result;

/// Mailer that records messages in the log instead of sending them
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email not sent (no mail API configured)"
        );
        tracing::debug!("Email body:\n{}", message.body);
        Ok(())
    }
}
