use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{MailRelay, OutgoingMail};
use crate::error::{AppError, Result};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Clone)]
pub struct ResendRelay {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ResendRelay {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: RESEND_ENDPOINT.to_string(),
        }
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl<'a> From<&'a OutgoingMail> for Payload<'a> {
    fn from(mail: &'a OutgoingMail) -> Self {
        Self {
            from: &mail.from,
            to: [mail.to.as_str()],
            subject: &mail.subject,
            html: &mail.html,
        }
    }
}

#[async_trait]
impl MailRelay for ResendRelay {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&Payload::from(mail))
            .send()
            .await
            .map_err(|e| AppError::Delivery(format!("Mail send failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!(
                "Resend API error ({}): {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_payload_shape() {
        let mail = OutgoingMail {
            from: "party@example.com".to_string(),
            to: "a@b.com".to_string(),
            subject: "Invitation to Summer Party".to_string(),
            html: "<h1>You're Invited!</h1>".to_string(),
        };

        let json = serde_json::to_value(Payload::from(&mail)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "from": "party@example.com",
                "to": ["a@b.com"],
                "subject": "Invitation to Summer Party",
                "html": "<h1>You're Invited!</h1>"
            })
        );
    }
}
