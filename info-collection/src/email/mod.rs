//! Mail dispatch with console and SMTP backends
//!
//! Assembled [`EmailContent`](crate::assembler::EmailContent) converts into an
//! [`Email`], which any [`EmailSender`] can deliver.
//!
//! ```rust,no_run
//! use info_collection::email::{Email, EmailSender, SmtpBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SmtpBackend::from_env()?;
//!
//! let email = Email::new()
//!     .to("user@example.com")
//!     .from("noreply@myapp.com")
//!     .subject("Thanks for your message")
//!     .html("<p>We will get back to you shortly.</p>");
//!
//! backend.send(email).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod builder;
mod error;
mod sender;

use std::sync::Arc;

pub use backend::{console::ConsoleBackend, smtp::SmtpBackend, smtp::SmtpConfig};
pub use builder::{Email, EmailAttachment};
pub use error::EmailError;
pub use sender::EmailSender;

#[cfg(test)]
pub use sender::MockEmailSender;

use crate::config::{MailerBackend, MailerSettings};

/// Build the sender selected by the mailer settings
///
/// # Errors
///
/// Returns `EmailError::ConfigError` if the SMTP backend is selected without
/// settings and the `SMTP_*` environment variables are incomplete
pub fn sender_from_settings(settings: &MailerSettings) -> Result<Arc<dyn EmailSender>, EmailError> {
    match settings.backend {
        MailerBackend::Console => Ok(Arc::new(ConsoleBackend::new())),
        MailerBackend::Smtp => {
            let config = match &settings.smtp {
                Some(config) => config.clone(),
                None => SmtpConfig::from_env()?,
            };
            Ok(Arc::new(SmtpBackend::new(config)))
        }
    }
}
