pub mod resend;
pub mod smtp;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, MailTransport};
use crate::error::Result;

/// A single HTML message handed to the relay
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound mail relay
#[async_trait]
pub trait MailRelay: Send + Sync {
    /// Deliver one message. Any failure is reported as `AppError::Delivery`.
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// Build the relay selected by `MAIL_TRANSPORT`
pub fn relay_from_config(config: &Config) -> Result<Arc<dyn MailRelay>> {
    let relay: Arc<dyn MailRelay> = match &config.mail_transport {
        MailTransport::Resend { api_key } => Arc::new(resend::ResendRelay::new(api_key.clone())),
        MailTransport::Smtp {
            host,
            port,
            username,
            password,
        } => Arc::new(smtp::SmtpRelay::new(
            host,
            *port,
            username.clone(),
            password.clone(),
        )?),
    };

    Ok(relay)
}
