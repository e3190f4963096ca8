use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailRelay, OutgoingMail};
use crate::error::{AppError, Result};

const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP submission relay authenticated with username and password
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    pub fn new(host: &str, port: u16, username: String, password: String) -> Result<Self> {
        let builder = if port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| AppError::InternalError(format!("Invalid SMTP host: {}", e)))?;

        let transport = builder
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self { transport })
    }
}

/// Build the RFC 5322 message for an outgoing mail
pub fn build_message(mail: &OutgoingMail) -> Result<Message> {
    let from: Mailbox = mail
        .from
        .parse()
        .map_err(|e| AppError::Delivery(format!("Invalid sender address: {}", e)))?;
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|e| AppError::Delivery(format!("Invalid recipient address: {}", e)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(mail.html.clone())
        .map_err(|e| AppError::Delivery(format!("Failed to build email: {}", e)))
}

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let message = build_message(mail)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Delivery(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
