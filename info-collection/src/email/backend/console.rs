//! Console mail backend
//!
//! Writes each message to stdout instead of handing it to a relay, so forms
//! can be exercised locally.

use std::fmt::Write as _;

use async_trait::async_trait;
use tracing::info;

use crate::email::{Email, EmailError, EmailSender};

/// Body lines shown when not verbose
const PREVIEW_LINES: usize = 8;

/// Prints outgoing form emails to stdout
///
/// # Examples
///
/// ```rust
/// use info_collection::email::{ConsoleBackend, Email, EmailSender};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let email = Email::new()
///     .to("owner@example.com")
///     .from("forms@example.com")
///     .subject("New submission")
///     .html("<p>Please call me back</p>");
///
/// ConsoleBackend::new().send(email).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend {
    verbose: bool,
}

impl ConsoleBackend {
    /// Print headers and the first lines of the body
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Print headers and the whole body
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }

    /// Text written for one message
    #[must_use]
    pub fn render(&self, email: &Email) -> String {
        let mut out = String::from("\n==== outgoing email (console, not delivered) ====\n");

        let mut header = |name: &str, values: &[String]| {
            if !values.is_empty() {
                let _ = writeln!(out, "{name:<9}{}", values.join(", "));
            }
        };
        header("From:", &email.from);
        header("To:", &email.to);
        header("Cc:", &email.cc);
        header("Bcc:", &email.bcc);

        if let Some(subject) = &email.subject {
            let _ = writeln!(out, "{:<9}{subject}", "Subject:");
        }
        for attachment in &email.attachments {
            let _ = writeln!(
                out,
                "{:<9}{} [{}]",
                "Attach:",
                attachment.file_name, attachment.mime_type
            );
        }

        if let Some(body) = email.html.as_ref().or(email.text.as_ref()) {
            out.push_str("---- body ----\n");
            let total = body.lines().count();
            let shown = if self.verbose { total } else { total.min(PREVIEW_LINES) };
            for line in body.lines().take(shown) {
                out.push_str(line);
                out.push('\n');
            }
            if shown < total {
                let _ = writeln!(out, "({} more lines)", total - shown);
            }
        }

        out.push_str("================================================\n");
        out
    }
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        info!(
            to = ?email.to,
            cc = email.cc.len(),
            bcc = email.bcc.len(),
            subject = email.subject.as_deref().unwrap_or_default(),
            attachments = email.attachments.len(),
            "Printed email to console"
        );

        print!("{}", self.render(&email));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::EmailAttachment;

    fn submission_email(body: &str) -> Email {
        Email::new()
            .to("owner@example.com")
            .cc("sales@example.com")
            .from("forms@example.com")
            .subject("New submission")
            .html(body)
            .attach(EmailAttachment {
                path: "/var/uploads/cv.pdf".into(),
                file_name: "cv.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
            })
    }

    #[tokio::test]
    async fn test_send_valid_email() {
        let backend = ConsoleBackend::new();

        assert!(backend.send(submission_email("<p>Hi</p>")).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_rejects_email_without_recipients() {
        let email = Email::new()
            .from("forms@example.com")
            .subject("New submission")
            .text("x");

        assert!(matches!(
            ConsoleBackend::verbose().send(email).await,
            Err(EmailError::NoRecipients)
        ));
    }

    #[test]
    fn test_render_headers_and_attachments() {
        let text = ConsoleBackend::new().render(&submission_email("<p>Hi</p>"));

        assert!(text.contains("To:      owner@example.com\n"));
        assert!(text.contains("Cc:      sales@example.com\n"));
        assert!(!text.contains("Bcc:"));
        assert!(text.contains("Subject: New submission\n"));
        assert!(text.contains("Attach:  cv.pdf [application/pdf]\n"));
        assert!(text.contains("<p>Hi</p>\n"));
    }

    #[test]
    fn test_render_shortens_long_bodies_unless_verbose() {
        let body = (1..=10).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n");
        let email = submission_email(&body);

        let short = ConsoleBackend::new().render(&email);
        assert!(short.contains("line 8\n"));
        assert!(!short.contains("line 9\n"));
        assert!(short.contains("(2 more lines)"));

        let full = ConsoleBackend::verbose().render(&email);
        assert!(full.contains("line 10\n"));
        assert!(!full.contains("more lines"));
    }
}
