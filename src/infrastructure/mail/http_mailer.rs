//! HTTP mail relay transport.

use super::mailer::{EmailMessage, MailError, MailResult, Mailer};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Sends emails by POSTing JSON to a transactional mail relay.
///
/// Payload: `{"from", "to": [..], "subject", "text"}`, authenticated with
/// `Authorization: Bearer <api_key>` when a key is configured.
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpMailer {
    /// Creates a relay client with a 10 second request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> MailResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> MailResult<()> {
        let payload = RelayPayload {
            from: &message.from,
            to: [&message.to],
            subject: &message.subject,
            text: &message.body,
        };

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
