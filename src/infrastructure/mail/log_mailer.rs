//! Mail transport that only logs messages.

use super::mailer::{EmailMessage, MailResult, Mailer};
use async_trait::async_trait;
use tracing::info;

/// A mailer that writes messages to the log instead of sending them.
///
/// Used when no mail relay is configured (development and tests).
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> MailResult<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "Email (not sent, no relay configured):\n{}",
            message.body
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
