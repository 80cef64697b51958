//! The seam between form actions and mail delivery

use async_trait::async_trait;

use super::{Email, EmailError};

/// Delivers assembled form mail
///
/// [`ConsoleBackend`](super::ConsoleBackend) and
/// [`SmtpBackend`](super::SmtpBackend) implement it; actions only see the
/// trait object chosen by [`sender_from_settings`](super::sender_from_settings).
///
/// # Examples
///
/// ```rust,no_run
/// use info_collection::email::{Email, EmailSender, SmtpBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let relay = SmtpBackend::from_env()?;
///
/// relay
///     .send(
///         Email::new()
///             .to("owner@example.com")
///             .from("forms@example.com")
///             .subject("New submission")
///             .html("<p>Please call me back</p>"),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Validate and deliver one message
    ///
    /// # Errors
    ///
    /// Returns `EmailError` when the message is incomplete or the backend
    /// rejects it
    async fn send(&self, email: Email) -> Result<(), EmailError>;
}
