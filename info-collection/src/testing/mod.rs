//! Testing utilities
//!
//! Provides a recording email sender for assertions on dispatched mail.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::email::{Email, EmailError, EmailSender};

/// Email sender that keeps every sent email in memory
///
/// Emails are validated before they are recorded, like a real backend
/// would. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl RecordingEmailSender {
    /// Create a new recording sender
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emails sent
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// All sent emails, in send order
    #[must_use]
    pub fn sent_emails(&self) -> Vec<Email> {
        self.sent.lock().clone()
    }

    /// Whether an email was sent to `address`
    #[must_use]
    pub fn was_sent_to(&self, address: &str) -> bool {
        self.sent
            .lock()
            .iter()
            .any(|email| email.to.iter().any(|to| to == address))
    }

    /// Whether an email was sent with `subject`
    #[must_use]
    pub fn was_sent_with_subject(&self, subject: &str) -> bool {
        self.sent
            .lock()
            .iter()
            .any(|email| email.subject.as_deref() == Some(subject))
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;
        self.sent.lock().push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_valid_emails_only() {
        let sender = RecordingEmailSender::new();

        let valid = Email::new()
            .to("user@example.com")
            .from("noreply@example.com")
            .subject("Test")
            .html("<p>Hello</p>");
        let invalid = Email::new().from("noreply@example.com").subject("Test").html("x");

        sender.send(valid).await.unwrap();
        assert!(sender.send(invalid).await.is_err());

        assert_eq!(sender.sent_count(), 1);
        assert!(sender.was_sent_to("user@example.com"));
        assert!(sender.was_sent_with_subject("Test"));
    }
}
