//! Error types and error handling

use thiserror::Error;

use crate::content::ContentError;
use crate::export::ExportError;
use crate::template::TemplateError;

/// Top-level error type
///
/// Resolution errors are raised as soon as one logical field cannot be
/// produced; nothing is retried and no partial message is returned.
#[derive(Debug, Error)]
pub enum InfoCollectionError {
    /// A logical field exhausted the template block, the content field and
    /// the configured default
    #[error("missing value for field '{0}'")]
    MissingValue(String),

    /// The template has no block for the message body
    #[error(
        "template '{template}' has no email block (available blocks: {})",
        available_blocks.join(", ")
    )]
    MissingEmailBlock {
        /// Template source name
        template: String,
        /// Blocks the template does declare
        available_blocks: Vec<String>,
    },

    /// An action could not complete, e.g. the mail transport failed
    #[error("action '{action}' failed: {reason}")]
    ActionFailed {
        /// Action name
        action: String,
        /// Message of the underlying failure
        reason: String,
    },

    /// No registered field handler accepts a value
    #[error("no handler registered for field value of kind '{0}'")]
    NoHandlerFound(String),

    /// Content loading failed
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Template loading or rendering failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl InfoCollectionError {
    /// Create a missing value error for a logical field
    #[must_use]
    pub fn missing_value<T: Into<String>>(field: T) -> Self {
        Self::MissingValue(field.into())
    }

    /// Create an action failure from any displayable cause
    #[must_use]
    pub fn action_failed<A: Into<String>, E: std::fmt::Display>(action: A, cause: &E) -> Self {
        Self::ActionFailed {
            action: action.into(),
            reason: cause.to_string(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = InfoCollectionError> = std::result::Result<T, E>;
