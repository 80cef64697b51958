//! Dispatch errors

use thiserror::Error;

/// Why an outgoing email could not be handed to the mail backend
#[derive(Debug, Error)]
pub enum EmailError {
    /// No To, Cc or Bcc address
    #[error("no recipient address set")]
    NoRecipients,

    /// No From address
    #[error("no sender address set")]
    NoSender,

    /// Subject missing
    #[error("subject is missing")]
    NoSubject,

    /// Neither a text nor an HTML body
    #[error("message body is empty")]
    NoContent,

    /// Address the mail library rejected
    #[error("cannot parse address '{0}'")]
    InvalidAddress(String),

    /// Attachment MIME type could not be parsed
    #[error("invalid content type for attachment '{file_name}': {mime_type}")]
    InvalidContentType {
        /// Attachment file name
        file_name: String,
        /// Rejected MIME type
        mime_type: String,
    },

    /// SMTP transport error
    #[error("SMTP error: {0}")]
    SmtpError(String),

    /// Mailer settings are incomplete or invalid
    #[error("mailer configuration error: {0}")]
    ConfigError(String),

    /// An attachment could not be read
    #[error("attachment read failed: {0}")]
    IoError(#[from] std::io::Error),
}

impl EmailError {
    /// Transport failure with the relay's message
    #[must_use]
    pub fn smtp(message: impl Into<String>) -> Self {
        Self::SmtpError(message.into())
    }

    /// Settings problem
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}
