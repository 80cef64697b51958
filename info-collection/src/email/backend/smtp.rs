//! SMTP delivery
//!
//! Attachments are read from disk when the message is built, so a file
//! removed after submission fails the send with `EmailError::IoError`.

use async_trait::async_trait;
use lettre::{
    message::{header, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::email::{Email, EmailAttachment, EmailError, EmailSender};

/// Relay settings for outgoing form mail
///
/// Read from `[mailer.smtp]` or, when that section is absent, from the
/// `SMTP_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Relay hostname
    pub host: String,

    /// Relay port, 587 for submission with STARTTLS
    pub port: u16,

    /// Login name
    pub username: String,

    /// Login password
    pub password: String,

    /// Require STARTTLS; plain connections are only for local relays
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
}

const fn default_use_tls() -> bool {
    true
}

const DEFAULT_SUBMISSION_PORT: u16 = 587;

fn required_var(name: &str) -> Result<String, EmailError> {
    std::env::var(name).map_err(|_| EmailError::config(format!("{name} is not set")))
}

impl SmtpConfig {
    /// Read relay settings from the environment
    ///
    /// `SMTP_HOST`, `SMTP_USERNAME` and `SMTP_PASSWORD` are required.
    /// `SMTP_PORT` defaults to 587 and `SMTP_USE_TLS` to `true`.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::ConfigError` naming the missing or malformed variable
    pub fn from_env() -> Result<Self, EmailError> {
        let port = match std::env::var("SMTP_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| EmailError::config(format!("SMTP_PORT is not a port: {raw}")))?,
            Err(_) => DEFAULT_SUBMISSION_PORT,
        };
        let use_tls = !matches!(std::env::var("SMTP_USE_TLS").as_deref(), Ok("false"));

        Ok(Self {
            host: required_var("SMTP_HOST")?,
            port,
            username: required_var("SMTP_USERNAME")?,
            password: required_var("SMTP_PASSWORD")?,
            use_tls,
        })
    }
}

/// Body of a message before attachments are added
enum Body {
    Single(SinglePart),
    Alternative(MultiPart),
}

/// Delivers form mail through an SMTP relay with `lettre`
///
/// A transport is opened per message.
pub struct SmtpBackend {
    config: SmtpConfig,
}

impl SmtpBackend {
    /// Backend for a relay
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Backend for the relay named by the `SMTP_*` variables
    ///
    /// # Errors
    ///
    /// Returns `EmailError::ConfigError` as [`SmtpConfig::from_env`] does
    pub fn from_env() -> Result<Self, EmailError> {
        SmtpConfig::from_env().map(Self::new)
    }

    fn mailbox(address: &str) -> Result<Mailbox, EmailError> {
        address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(address.to_string()))
    }

    /// Read attachments from disk into MIME parts
    async fn load_attachments(email: &Email) -> Result<Vec<SinglePart>, EmailError> {
        let mut parts = Vec::with_capacity(email.attachments.len());
        for attachment in &email.attachments {
            let bytes = tokio::fs::read(&attachment.path).await?;
            debug!(file = %attachment.file_name, size = bytes.len(), "Read attachment");
            parts.push(Self::attachment_part(attachment, bytes)?);
        }
        Ok(parts)
    }

    fn attachment_part(attachment: &EmailAttachment, bytes: Vec<u8>) -> Result<SinglePart, EmailError> {
        let content_type = header::ContentType::parse(&attachment.mime_type).map_err(|_| {
            EmailError::InvalidContentType {
                file_name: attachment.file_name.clone(),
                mime_type: attachment.mime_type.clone(),
            }
        })?;

        Ok(Attachment::new(attachment.file_name.clone()).body(bytes, content_type))
    }

    fn body(email: &Email) -> Result<Body, EmailError> {
        match (&email.html, &email.text) {
            (Some(html), Some(text)) => Ok(Body::Alternative(
                MultiPart::alternative()
                    .singlepart(SinglePart::plain(text.clone()))
                    .singlepart(SinglePart::html(html.clone())),
            )),
            (Some(html), None) => Ok(Body::Single(SinglePart::html(html.clone()))),
            (None, Some(text)) => Ok(Body::Single(SinglePart::plain(text.clone()))),
            (None, None) => Err(EmailError::NoContent),
        }
    }

    fn build_message(email: &Email, attachments: Vec<SinglePart>) -> Result<Message, EmailError> {
        email.validate()?;

        let mut builder = Message::builder().subject(email.subject.as_deref().unwrap_or_default());
        for address in &email.from {
            builder = builder.from(Self::mailbox(address)?);
        }
        // RFC 5322: several From mailboxes need exactly one Sender
        if let [first, _, ..] = email.from.as_slice() {
            builder = builder.sender(Self::mailbox(first)?);
        }
        for address in &email.to {
            builder = builder.to(Self::mailbox(address)?);
        }
        for address in &email.cc {
            builder = builder.cc(Self::mailbox(address)?);
        }
        for address in &email.bcc {
            builder = builder.bcc(Self::mailbox(address)?);
        }

        let body = Self::body(email)?;
        let message = if attachments.is_empty() {
            match body {
                Body::Single(part) => builder.singlepart(part),
                Body::Alternative(parts) => builder.multipart(parts),
            }
        } else {
            let mixed = match body {
                Body::Single(part) => MultiPart::mixed().singlepart(part),
                Body::Alternative(parts) => MultiPart::mixed().multipart(parts),
            };
            builder.multipart(attachments.into_iter().fold(mixed, MultiPart::singlepart))
        };

        message.map_err(|e| EmailError::smtp(e.to_string()))
    }

    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let credentials = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        let mut transport = if self.config.use_tls {
            let tls_parameters = TlsParameters::new(self.config.host.clone())
                .map_err(|e| EmailError::smtp(format!("cannot set up TLS for {}: {e}", self.config.host)))?;

            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
                .map_err(|e| EmailError::smtp(e.to_string()))?
                .credentials(credentials)
                .tls(Tls::Required(tls_parameters))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
                .credentials(credentials)
        };

        transport = transport.port(self.config.port);

        Ok(transport.build())
    }
}

#[async_trait]
impl EmailSender for SmtpBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        let attachments = Self::load_attachments(&email).await?;
        let message = Self::build_message(&email, attachments)?;
        let transport = self.create_transport()?;

        transport
            .send(message)
            .await
            .map_err(|e| EmailError::smtp(e.to_string()))?;

        Ok(())
    }
}
