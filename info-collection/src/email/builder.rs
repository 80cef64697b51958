//! Outgoing message representation shared by the mail backends

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::EmailError;
use crate::assembler::EmailContent;
use crate::content::BinaryFile;

/// A file attached to an outgoing email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAttachment {
    /// Location of the file on disk
    pub path: PathBuf,

    /// File name shown to the recipient
    pub file_name: String,

    /// MIME type, e.g. `application/pdf`
    pub mime_type: String,
}

impl From<&BinaryFile> for EmailAttachment {
    fn from(file: &BinaryFile) -> Self {
        Self {
            path: PathBuf::from(&file.input_uri),
            file_name: file.file_name.clone(),
            mime_type: file.mime_type.clone(),
        }
    }
}

/// Message handed to an [`EmailSender`](super::EmailSender)
///
/// Usually produced by [`Email::from_content`]; the setters exist for
/// backends, tests and hand-written notices.
///
/// ```rust
/// use info_collection::email::Email;
///
/// let email = Email::new()
///     .to("owner@example.com")
///     .from("forms@example.com")
///     .subject("New submission")
///     .html("<p>Please call me back</p>");
/// assert!(email.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Email {
    /// To addresses
    pub to: Vec<String>,

    /// From addresses; more than one adds a `Sender` header
    pub from: Vec<String>,

    /// Cc addresses
    pub cc: Vec<String>,

    /// Bcc addresses
    pub bcc: Vec<String>,

    /// Subject line
    pub subject: Option<String>,

    /// Plain text alternative
    pub text: Option<String>,

    /// HTML body
    pub html: Option<String>,

    /// Files read from disk at send time
    pub attachments: Vec<EmailAttachment>,
}

impl Email {
    /// Empty message
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert an assembled message
    ///
    /// The body is sent as HTML and every sender becomes a From mailbox.
    #[must_use]
    pub fn from_content(content: &EmailContent) -> Self {
        Self {
            to: content.recipients().to_vec(),
            from: content.sender().to_vec(),
            cc: content.cc().to_vec(),
            bcc: content.bcc().to_vec(),
            subject: Some(content.subject().to_string()),
            text: None,
            html: Some(content.body().to_string()),
            attachments: content
                .attachments()
                .iter()
                .map(EmailAttachment::from)
                .collect(),
        }
    }

    /// Append a To address
    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Append a From address
    #[must_use]
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from.push(address.into());
        self
    }

    /// Append a Cc address
    #[must_use]
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Append a Bcc address
    #[must_use]
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// Replace the subject
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Replace the plain text body
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Replace the HTML body
    #[must_use]
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// Append an attachment
    #[must_use]
    pub fn attach(mut self, attachment: EmailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Check the message can be dispatched
    ///
    /// At least one To, Cc or Bcc address, a sender, a subject and a body
    /// are required.
    ///
    /// # Errors
    ///
    /// Returns the `EmailError` naming the first missing part
    pub fn validate(&self) -> Result<(), EmailError> {
        let has_recipient = [&self.to, &self.cc, &self.bcc]
            .iter()
            .any(|list| !list.is_empty());

        if !has_recipient {
            Err(EmailError::NoRecipients)
        } else if self.from.is_empty() {
            Err(EmailError::NoSender)
        } else if self.subject.is_none() {
            Err(EmailError::NoSubject)
        } else if self.text.is_none() && self.html.is_none() {
            Err(EmailError::NoContent)
        } else {
            Ok(())
        }
    }
}
