//! The assembled outbound message

use serde::Serialize;

use super::MessageKind;
use crate::content::BinaryFile;
use crate::error::{InfoCollectionError, Result};
use crate::resolver::fields;

/// A fully resolved outbound message
///
/// Recipients, sender, subject and body are always present; construction
/// fails otherwise. Built once per submission and handed to a mail sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailContent {
    recipients: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    sender: Vec<String>,
    subject: String,
    body: String,
    attachments: Vec<BinaryFile>,
}

impl EmailContent {
    /// Create a message from its required parts
    ///
    /// # Errors
    ///
    /// Returns `InfoCollectionError::MissingValue` naming the first empty part
    pub fn new(
        recipients: Vec<String>,
        sender: Vec<String>,
        subject: String,
        body: String,
    ) -> Result<Self> {
        Self::for_kind(MessageKind::Notification, recipients, sender, subject, body)
    }

    /// Create a message of `kind`, reporting a blank subject under that
    /// kind's subject field
    ///
    /// # Errors
    ///
    /// Returns `InfoCollectionError::MissingValue` naming the first empty part
    pub fn for_kind(
        kind: MessageKind,
        recipients: Vec<String>,
        sender: Vec<String>,
        subject: String,
        body: String,
    ) -> Result<Self> {
        if recipients.is_empty() {
            return Err(InfoCollectionError::missing_value(fields::RECIPIENT));
        }
        if sender.is_empty() {
            return Err(InfoCollectionError::missing_value(fields::SENDER));
        }
        if subject.trim().is_empty() {
            return Err(InfoCollectionError::missing_value(kind.subject_field()));
        }
        if body.trim().is_empty() {
            return Err(InfoCollectionError::missing_value(fields::EMAIL_BLOCK));
        }

        Ok(Self {
            recipients,
            cc: Vec::new(),
            bcc: Vec::new(),
            sender,
            subject,
            body,
            attachments: Vec::new(),
        })
    }

    /// Set carbon copy recipients
    #[must_use]
    pub fn with_cc(mut self, cc: Vec<String>) -> Self {
        self.cc = cc;
        self
    }

    /// Set blind carbon copy recipients
    #[must_use]
    pub fn with_bcc(mut self, bcc: Vec<String>) -> Self {
        self.bcc = bcc;
        self
    }

    /// Set attachments
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<BinaryFile>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Recipient addresses
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Carbon copy addresses
    #[must_use]
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    /// Blind carbon copy addresses
    #[must_use]
    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    /// Sender addresses
    #[must_use]
    pub fn sender(&self) -> &[String] {
        &self.sender
    }

    /// Subject line
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Rendered HTML body
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Files to attach
    #[must_use]
    pub fn attachments(&self) -> &[BinaryFile] {
        &self.attachments
    }

    /// Whether any file is attached
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}
