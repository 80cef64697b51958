//! Map-backed content repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Content, ContentError, ContentId, ContentRepository};

/// Content repository holding items in memory
///
/// Used by the CLI, which reads content items from JSON fixtures, and by tests.
/// Clones share the same underlying store.
///
/// # Examples
///
/// ```rust
/// use info_collection::content::{Content, ContentId, InMemoryContentRepository};
///
/// let repository = InMemoryContentRepository::new();
/// repository.insert(Content::new(ContentId(42), "Contact", "contact_form", "eng-GB"));
/// assert_eq!(repository.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentRepository {
    items: Arc<RwLock<HashMap<ContentId, Content>>>,
}

impl InMemoryContentRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a content item, replacing any item with the same id
    pub fn insert(&self, content: Content) {
        self.items.write().insert(content.id, content);
    }

    /// Number of stored items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the repository is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl FromIterator<Content> for InMemoryContentRepository {
    fn from_iter<I: IntoIterator<Item = Content>>(iter: I) -> Self {
        let repository = Self::new();
        for content in iter {
            repository.insert(content);
        }
        repository
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn load_content(&self, id: ContentId) -> Result<Content, ContentError> {
        self.items
            .read()
            .get(&id)
            .cloned()
            .ok_or(ContentError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_existing_content() {
        let repository: InMemoryContentRepository =
            [Content::new(ContentId(7), "Feedback", "feedback_form", "eng-GB")]
                .into_iter()
                .collect();

        let content = repository.load_content(ContentId(7)).await.unwrap();
        assert_eq!(content.name, "Feedback");
    }

    #[tokio::test]
    async fn test_load_missing_content() {
        let repository = InMemoryContentRepository::new();

        let result = repository.load_content(ContentId(99)).await;
        assert!(matches!(result, Err(ContentError::NotFound(ContentId(99)))));
    }
}
