//! Content items, submission events and the repository seams to the CMS
//!
//! The CMS owns storage, translation and field types. This module models
//! the slice of it the email and export engines read:
//!
//! - [`Content`]: the content item that owns the form
//! - [`SubmissionEvent`]: one submitted form, immutable once created
//! - [`ContentRepository`]: loads content items
//! - [`FieldHelper`]: answers emptiness and translation questions about fields

mod memory;
mod value;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryContentRepository;
pub use value::{BinaryFile, CollectedFields, FieldValue, ValueProperty};

/// Identifier of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ContentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A translated field of a content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field definition identifier
    pub identifier: String,

    /// Language of this translation, e.g. `eng-GB`
    pub language_code: String,

    /// Field value
    pub value: FieldValue,
}

impl Field {
    /// Create a field in the given language
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        language_code: impl Into<String>,
        value: FieldValue,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            language_code: language_code.into(),
            value,
        }
    }
}

/// A content item as seen by the resolvers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Content identifier
    pub id: ContentId,

    /// Translated display name, used for export file names
    pub name: String,

    /// Content type identifier
    pub content_type: String,

    /// Main language of the item
    pub main_language: String,

    /// All field translations
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Content {
    /// Create a content item without fields
    #[must_use]
    pub fn new(
        id: ContentId,
        name: impl Into<String>,
        content_type: impl Into<String>,
        main_language: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            content_type: content_type.into(),
            main_language: main_language.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field in the main language
    #[must_use]
    pub fn with_field(mut self, identifier: impl Into<String>, value: FieldValue) -> Self {
        let field = Field::new(identifier, self.main_language.clone(), value);
        self.fields.push(field);
        self
    }

    /// Add a field translation
    #[must_use]
    pub fn with_translated_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Whether the item defines a field with this identifier in any language
    #[must_use]
    pub fn has_field(&self, identifier: &str) -> bool {
        self.fields.iter().any(|f| f.identifier == identifier)
    }

    /// The translation of a field in one language
    #[must_use]
    pub fn field_in(&self, identifier: &str, language: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.identifier == identifier && f.language_code == language)
    }
}

/// A submitted form, as handed over by the CMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionEvent {
    /// Content type identifier of the owning content item
    pub content_type: String,

    /// Owning content item
    pub content_id: ContentId,

    /// Submitted values
    #[serde(default)]
    pub collected: CollectedFields,
}

impl SubmissionEvent {
    /// Create a submission event
    #[must_use]
    pub fn new(
        content_type: impl Into<String>,
        content_id: ContentId,
        collected: CollectedFields,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            content_id,
            collected,
        }
    }
}

/// Errors raised by content repositories
#[derive(Debug, Error)]
pub enum ContentError {
    /// No content item with this identifier
    #[error("content with id {0} not found")]
    NotFound(ContentId),

    /// Repository backend failure
    #[error("content repository error: {0}")]
    Backend(String),
}

/// Loads content items from the CMS
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Load a content item by identifier
    ///
    /// # Errors
    ///
    /// Returns `ContentError::NotFound` when the item does not exist
    async fn load_content(&self, id: ContentId) -> Result<Content, ContentError>;
}

/// Field inspection helpers provided by the CMS
pub trait FieldHelper: Send + Sync {
    /// Whether the field is missing or holds an empty value
    fn is_field_empty(&self, content: &Content, identifier: &str) -> bool;

    /// The field translation to use for this request
    fn translated_field<'c>(&self, content: &'c Content, identifier: &str) -> Option<&'c Field>;
}

/// [`FieldHelper`] that picks translations by language priority
///
/// The first prioritized language that has the field wins, then the
/// content's main language, then any translation.
#[derive(Debug, Clone, Default)]
pub struct TranslationFieldHelper {
    prioritized_languages: Vec<String>,
}

impl TranslationFieldHelper {
    /// Create a helper with the given language priority list
    #[must_use]
    pub const fn new(prioritized_languages: Vec<String>) -> Self {
        Self {
            prioritized_languages,
        }
    }
}

impl FieldHelper for TranslationFieldHelper {
    fn is_field_empty(&self, content: &Content, identifier: &str) -> bool {
        self.translated_field(content, identifier)
            .is_none_or(|field| field.value.is_empty())
    }

    fn translated_field<'c>(&self, content: &'c Content, identifier: &str) -> Option<&'c Field> {
        self.prioritized_languages
            .iter()
            .find_map(|language| content.field_in(identifier, language))
            .or_else(|| content.field_in(identifier, &content.main_language))
            .or_else(|| content.fields.iter().find(|f| f.identifier == identifier))
    }
}
