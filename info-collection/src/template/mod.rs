//! Block-based email templates
//!
//! An email template is a single template file made of named blocks. Each
//! logical field of an outgoing message (`recipient`, `sender`, `subject`,
//! ...) may be overridden by a block of the same name, and the message body
//! is always the `email` block:
//!
//! ```jinja
//! {% block recipient %}owner@example.com, sales@example.com{% endblock %}
//! {% block subject %}New message from {{ collected_fields.name.value }}{% endblock %}
//! {% block email %}
//! <p>{{ collected_fields.message.value }}</p>
//! {% endblock %}
//! ```
//!
//! The resolvers only see the narrow [`BlockTemplate`] and [`TemplateLoader`]
//! traits; [`MiniJinjaTemplates`] is the bundled implementation.

mod engine;

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::content::{CollectedFields, Content, SubmissionEvent};

pub use engine::MiniJinjaTemplates;

/// Errors that can occur when loading or rendering templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template was not found by the loader
    #[error("template not found: {0}")]
    NotFound(String),

    /// Template failed to parse or render
    #[error("template render error: {0}")]
    Render(#[from] minijinja::Error),
}

/// Variables available to every rendered block
#[derive(Debug, Clone, Serialize)]
pub struct TemplateVariables<'a> {
    /// The submission being processed
    pub event: &'a SubmissionEvent,

    /// Submitted values, keyed by field identifier
    pub collected_fields: &'a CollectedFields,

    /// Content item that owns the form
    pub content: &'a Content,

    /// Configured default variables, only passed to the body block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_variables: Option<&'a HashMap<String, String>>,
}

impl<'a> TemplateVariables<'a> {
    /// Variables for a field block
    #[must_use]
    pub const fn new(event: &'a SubmissionEvent, content: &'a Content) -> Self {
        Self {
            event,
            collected_fields: &event.collected,
            content,
            default_variables: None,
        }
    }

    /// Add configured default variables
    #[must_use]
    pub fn with_default_variables(mut self, defaults: &'a HashMap<String, String>) -> Self {
        self.default_variables = Some(defaults);
        self
    }
}

/// A loaded template exposing independently renderable blocks
pub trait BlockTemplate: Send + Sync {
    /// Template name, as passed to the loader
    fn name(&self) -> &str;

    /// Whether the template declares a block with this name
    fn has_block(&self, block: &str) -> bool;

    /// Names of all blocks the template declares, in source order
    fn block_names(&self) -> Vec<String>;

    /// Render one block
    ///
    /// Callers check [`has_block`](Self::has_block) first.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Render` if rendering fails
    fn render_block(
        &self,
        block: &str,
        variables: &TemplateVariables<'_>,
    ) -> Result<String, TemplateError>;
}

/// Loads templates by name
pub trait TemplateLoader: Send + Sync {
    /// Load a template
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::NotFound` if no template has this name, or
    /// `TemplateError::Render` if it does not parse
    fn load(&self, name: &str) -> Result<Box<dyn BlockTemplate + '_>, TemplateError>;
}
