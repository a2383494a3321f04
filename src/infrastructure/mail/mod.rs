//! Transactional email delivery.
//!
//! Provides a [`Mailer`] trait with two transports:
//! - [`HttpMailer`] - Posts messages to an HTTP mail relay
//! - [`LogMailer`] - Logs messages instead of sending them
//!
//! Message bodies are rendered from `templates/emails/*.txt` by [`EmailComposer`].

mod http_mailer;
mod log_mailer;
mod mailer;
mod templates;

pub use http_mailer::HttpMailer;
pub use log_mailer::LogMailer;
pub use mailer::{EmailMessage, MailError, MailResult, Mailer};
pub use templates::EmailComposer;
