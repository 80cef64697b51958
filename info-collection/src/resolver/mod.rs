//! Layered field resolution
//!
//! Every logical field of an outgoing message is resolved independently from
//! three ordered sources; the first one that yields a value wins:
//!
//! 1. a template block named after the field, rendered and trimmed
//! 2. a non-empty field of the same name on the owning content item
//! 3. the configured default variable for the field
//!
//! When all three come up empty the field fails with
//! [`InfoCollectionError::MissingValue`]. Nothing is cached between fields:
//! the same template may render differently for each block name.

mod address;
mod attachment;

use std::sync::Arc;

use tracing::debug;

use crate::config::FieldResolutionConfig;
use crate::content::{Content, FieldHelper, SubmissionEvent, ValueProperty};
use crate::error::{InfoCollectionError, Result};
use crate::template::{BlockTemplate, TemplateVariables};

pub use address::{is_valid_email, parse_address_list, EmailAddressResolver};
pub use attachment::AttachmentSelector;

/// Logical field and block names
pub mod fields {
    /// Recipient addresses
    pub const RECIPIENT: &str = "recipient";
    /// Carbon copy addresses
    pub const CC: &str = "cc";
    /// Blind carbon copy addresses
    pub const BCC: &str = "bcc";
    /// Sender addresses
    pub const SENDER: &str = "sender";
    /// Notification subject
    pub const SUBJECT: &str = "subject";
    /// Auto responder subject
    pub const AUTO_RESPONDER_SUBJECT: &str = "auto_responder_subject";
    /// Block holding the message body
    pub const EMAIL_BLOCK: &str = "email";
    /// Default variable naming the submitted field that holds the submitter's address
    pub const EMAIL_FIELD_IDENTIFIER: &str = "email_field_identifier";
}

/// Everything one message build reads
///
/// Created per submission and dropped once the message is assembled.
pub struct ResolutionContext<'a> {
    event: &'a SubmissionEvent,
    content: Content,
    template: Box<dyn BlockTemplate + 'a>,
}

impl<'a> ResolutionContext<'a> {
    /// Bundle a submission with its content item and loaded template
    #[must_use]
    pub fn new(
        event: &'a SubmissionEvent,
        content: Content,
        template: Box<dyn BlockTemplate + 'a>,
    ) -> Self {
        Self {
            event,
            content,
            template,
        }
    }

    /// The submission being processed
    #[must_use]
    pub const fn event(&self) -> &SubmissionEvent {
        self.event
    }

    /// The content item owning the form
    #[must_use]
    pub const fn content(&self) -> &Content {
        &self.content
    }

    /// The loaded template
    #[must_use]
    pub fn template(&self) -> &dyn BlockTemplate {
        self.template.as_ref()
    }

    /// Variables passed to field blocks
    #[must_use]
    pub const fn variables(&self) -> TemplateVariables<'_> {
        TemplateVariables::new(self.event, &self.content)
    }

    /// Render the block named after a field
    ///
    /// Returns `None` when the template has no such block or the block
    /// renders only whitespace.
    ///
    /// # Errors
    ///
    /// Returns a template error if rendering fails
    pub fn render_field_block(&self, field: &str) -> Result<Option<String>> {
        if !self.template.has_block(field) {
            return Ok(None);
        }

        let rendered = self.template.render_block(field, &self.variables())?;
        let trimmed = rendered.trim();

        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }
}

/// Resolves scalar text fields such as the subject
#[derive(Clone)]
pub struct FieldValueResolver {
    config: Arc<FieldResolutionConfig>,
    fields: Arc<dyn FieldHelper>,
}

impl FieldValueResolver {
    /// Create a resolver reading defaults from `config`
    #[must_use]
    pub fn new(config: Arc<FieldResolutionConfig>, fields: Arc<dyn FieldHelper>) -> Self {
        Self { config, fields }
    }

    /// Resolve a text field
    ///
    /// # Errors
    ///
    /// Returns `InfoCollectionError::MissingValue` when no source yields a
    /// value, or a template error if the block fails to render
    pub fn resolve(
        &self,
        ctx: &ResolutionContext<'_>,
        field: &str,
        property: ValueProperty,
    ) -> Result<String> {
        if let Some(rendered) = ctx.render_field_block(field)? {
            debug!(field, source = "block", "Resolved field");
            return Ok(rendered);
        }

        if let Some(value) = self.content_value(ctx.content(), field, property) {
            debug!(field, source = "content", "Resolved field");
            return Ok(value);
        }

        if let Some(default) = self.default_value(field) {
            debug!(field, source = "config", "Resolved field");
            return Ok(default.to_string());
        }

        Err(InfoCollectionError::missing_value(field))
    }

    /// Value of a non-empty content field, read through `property`
    #[must_use]
    pub fn content_value(
        &self,
        content: &Content,
        field: &str,
        property: ValueProperty,
    ) -> Option<String> {
        if !content.has_field(field) || self.fields.is_field_empty(content, field) {
            return None;
        }

        self.fields
            .translated_field(content, field)
            .and_then(|f| f.value.property(property))
    }

    /// Configured default for a field
    #[must_use]
    pub fn default_value(&self, field: &str) -> Option<&str> {
        self.config.default_variable(field)
    }

    /// Resolution settings this resolver reads
    #[must_use]
    pub fn config(&self) -> &FieldResolutionConfig {
        &self.config
    }
}
