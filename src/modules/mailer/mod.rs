//! Outbound email
//!
//! `HttpMailer` posts to a JSON mail API. `LogMailer` only writes the message
//! to the log and is used when no API is configured.

mod http_mailer;
mod log_mailer;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::MailConfig;
use crate::core::error::Result;

pub use http_mailer::HttpMailer;
pub use log_mailer::LogMailer;

/// A plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Pick the mailer for the current configuration
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    match config.api_url.as_deref() {
        Some(api_url) => Ok(Arc::new(HttpMailer::new(
            api_url,
            config.api_key.clone(),
            config.from.clone(),
        )?)),
        None => {
            tracing::info!("MAIL_API_URL not set, notifications will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}
