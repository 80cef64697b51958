//! Export of stored submissions
//!
//! The [`Exporter`] turns the collections stored for one content item into
//! a table: a `Created` column followed by one column per field identifier,
//! in the order the identifiers were first seen. [`CsvExportFormatter`]
//! writes that table as a downloadable CSV file.

mod formatter;
mod handler;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::content::{CollectedFields, ContentError, ContentId};
use crate::error::Result;

pub use formatter::{CsvExportFormatter, ExportFile, UTF8_BOM};
pub use handler::{
    BinaryFileHandler, CheckboxHandler, EmptyHandler, FieldHandler, FieldHandlerRegistry,
    NumberHandler, TextHandler,
};

/// Header of the creation date column
pub const CREATED_COLUMN: &str = "Created";

const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised while writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Formatter settings are invalid
    #[error("invalid export settings: {0}")]
    Settings(String),
}

/// One stored form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection identifier
    pub id: u64,

    /// Content item the form belongs to
    pub content_id: ContentId,

    /// Submission time
    pub created: DateTime<Utc>,

    /// Submitted values
    #[serde(default)]
    pub fields: CollectedFields,
}

/// Which collections to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportCriteria {
    /// Content item whose collections are exported
    pub content_id: ContentId,

    /// First day included
    pub from: Option<NaiveDate>,

    /// Last day included
    pub to: Option<NaiveDate>,
}

impl ExportCriteria {
    /// Export every collection of a content item
    #[must_use]
    pub const fn new(content_id: ContentId) -> Self {
        Self {
            content_id,
            from: None,
            to: None,
        }
    }

    /// Restrict to collections created on or after `date`
    #[must_use]
    pub const fn from(mut self, date: NaiveDate) -> Self {
        self.from = Some(date);
        self
    }

    /// Restrict to collections created on or before `date`
    #[must_use]
    pub const fn to(mut self, date: NaiveDate) -> Self {
        self.to = Some(date);
        self
    }

    /// Whether a collection falls within the criteria
    #[must_use]
    pub fn matches(&self, collection: &Collection) -> bool {
        let day = collection.created.date_naive();
        collection.content_id == self.content_id
            && self.from.is_none_or(|from| day >= from)
            && self.to.is_none_or(|to| day <= to)
    }
}

/// Tabular export of collections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Export {
    /// Column headers
    pub header: Vec<String>,

    /// One row per collection, aligned with the header
    pub rows: Vec<Vec<String>>,
}

/// Loads stored collections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// All collections stored for a content item
    ///
    /// # Errors
    ///
    /// Returns a `ContentError` if the backend fails
    async fn collections(&self, content_id: ContentId) -> Result<Vec<Collection>, ContentError>;
}

/// Collection source holding collections in memory
///
/// Clones share the same underlying store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollections {
    items: Arc<RwLock<Vec<Collection>>>,
}

impl InMemoryCollections {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a collection
    pub fn insert(&self, collection: Collection) {
        self.items.write().push(collection);
    }
}

impl FromIterator<Collection> for InMemoryCollections {
    fn from_iter<I: IntoIterator<Item = Collection>>(iter: I) -> Self {
        Self {
            items: Arc::new(RwLock::new(iter.into_iter().collect())),
        }
    }
}

#[async_trait]
impl CollectionSource for InMemoryCollections {
    async fn collections(&self, content_id: ContentId) -> Result<Vec<Collection>, ContentError> {
        Ok(self
            .items
            .read()
            .iter()
            .filter(|c| c.content_id == content_id)
            .cloned()
            .collect())
    }
}

/// Builds exports from a collection source
pub struct Exporter {
    source: Arc<dyn CollectionSource>,
    handlers: FieldHandlerRegistry,
}

impl Exporter {
    /// Create an exporter using the default field handlers
    #[must_use]
    pub fn new(source: Arc<dyn CollectionSource>) -> Self {
        Self::with_handlers(source, FieldHandlerRegistry::with_defaults())
    }

    /// Create an exporter with custom field handlers
    #[must_use]
    pub fn with_handlers(source: Arc<dyn CollectionSource>, handlers: FieldHandlerRegistry) -> Self {
        Self { source, handlers }
    }

    /// Export the collections matching `criteria`, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails or a value has no field handler
    #[instrument(skip(self), fields(content_id = %criteria.content_id))]
    pub async fn export(&self, criteria: &ExportCriteria) -> Result<Export> {
        let mut collections: Vec<Collection> = self
            .source
            .collections(criteria.content_id)
            .await?
            .into_iter()
            .filter(|c| criteria.matches(c))
            .collect();
        collections.sort_by_key(|c| c.created);

        let mut columns: Vec<String> = Vec::new();
        for collection in &collections {
            for (identifier, _) in collection.fields.iter() {
                if !columns.iter().any(|c| c == identifier) {
                    columns.push(identifier.to_string());
                }
            }
        }

        let mut rows = Vec::with_capacity(collections.len());
        for collection in &collections {
            let mut row = Vec::with_capacity(columns.len() + 1);
            row.push(collection.created.format(CREATED_FORMAT).to_string());
            for column in &columns {
                let cell = match collection.fields.get(column) {
                    Some(value) => self.handlers.to_string(value)?,
                    None => String::new(),
                };
                row.push(cell);
            }
            rows.push(row);
        }

        debug!(rows = rows.len(), columns = columns.len(), "Built export");

        let mut header = Vec::with_capacity(columns.len() + 1);
        header.push(CREATED_COLUMN.to_string());
        header.extend(columns);

        Ok(Export { header, rows })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::content::FieldValue;
    use crate::error::InfoCollectionError;

    fn collection(id: u64, content_id: u64, day: u32, fields: CollectedFields) -> Collection {
        Collection {
            id,
            content_id: ContentId(content_id),
            created: Utc.with_ymd_and_hms(2024, 3, day, 9, 30, 0).unwrap(),
            fields,
        }
    }

    fn source() -> InMemoryCollections {
        [
            collection(
                2,
                1,
                12,
                CollectedFields::new()
                    .with("email", FieldValue::Email("b@example.com".to_string()))
                    .with("newsletter", FieldValue::Checkbox(true)),
            ),
            collection(
                1,
                1,
                10,
                CollectedFields::new()
                    .with("name", FieldValue::TextLine("Alice".to_string()))
                    .with("email", FieldValue::Email("a@example.com".to_string())),
            ),
            collection(
                3,
                2,
                11,
                CollectedFields::new().with("other", FieldValue::TextLine("x".to_string())),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_export_header_and_rows() {
        let exporter = Exporter::new(Arc::new(source()));

        let export = exporter.export(&ExportCriteria::new(ContentId(1))).await.unwrap();

        assert_eq!(export.header, vec!["Created", "name", "email", "newsletter"]);
        assert_eq!(
            export.rows,
            vec![
                vec!["2024-03-10 09:30:00", "Alice", "a@example.com", ""],
                vec!["2024-03-12 09:30:00", "", "b@example.com", "1"],
            ]
        );
    }

    #[tokio::test]
    async fn test_export_date_range_is_inclusive() {
        let exporter = Exporter::new(Arc::new(source()));
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();

        let export = exporter
            .export(&ExportCriteria::new(ContentId(1)).from(day(12)).to(day(12)))
            .await
            .unwrap();
        assert_eq!(export.rows.len(), 1);

        let export = exporter
            .export(&ExportCriteria::new(ContentId(1)).to(day(9)))
            .await
            .unwrap();
        assert!(export.rows.is_empty());
        assert_eq!(export.header, vec!["Created"]);
    }

    #[tokio::test]
    async fn test_export_without_handler_fails() {
        let mut handlers = FieldHandlerRegistry::new();
        handlers.register(TextHandler);
        let exporter = Exporter::with_handlers(Arc::new(source()), handlers);

        let error = exporter
            .export(&ExportCriteria::new(ContentId(1)))
            .await
            .unwrap_err();
        assert!(matches!(error, InfoCollectionError::NoHandlerFound(kind) if kind == "checkbox"));
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let mut source = MockCollectionSource::new();
        source
            .expect_collections()
            .returning(|_| Err(ContentError::Backend("database unavailable".to_string())));
        let exporter = Exporter::new(Arc::new(source));

        let error = exporter
            .export(&ExportCriteria::new(ContentId(1)))
            .await
            .unwrap_err();
        assert!(matches!(error, InfoCollectionError::Content(ContentError::Backend(_))));
    }
}
