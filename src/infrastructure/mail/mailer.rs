//! Mailer trait and message types.

use async_trait::async_trait;

/// Errors that can occur while delivering an email.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),
    #[error("Mail relay rejected message: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Result type for mail operations.
pub type MailResult<T> = Result<T, MailError>;

/// A rendered plain-text email.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Trait for delivering rendered emails.
///
/// Implementations must be thread-safe; the email worker shares a single
/// instance across concurrent deliveries and retries failed sends.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers a message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] if the transport fails or the message is rejected.
    async fn send(&self, message: &EmailMessage) -> MailResult<()>;

    /// Short transport name for logs and health output.
    fn name(&self) -> &'static str;
}
