//! info-collection: email and export engine for CMS form submissions
//!
//! When a visitor submits a form ("information collection"), the CMS hands
//! a [`SubmissionEvent`](content::SubmissionEvent) to this crate, which:
//!
//! - assembles notification and auto-responder emails from block-based
//!   templates, resolving every logical field (recipient, sender, subject,
//!   ...) from a template block, then a content field, then a configured
//!   default
//! - dispatches them through a console or SMTP backend
//! - exports stored submissions as CSV
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use info_collection::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     observability::init()?;
//!
//!     let config = InfoCollectionConfig::load_for_service("my-site")?;
//!     let templates = Arc::new(MiniJinjaTemplates::from_dir(&config.templates.template_dir));
//!     let contents = Arc::new(InMemoryContentRepository::new());
//!     let sender = sender_from_settings(&config.mailer)?;
//!
//!     let registry = ActionRegistry::with_email_actions(&config, templates, contents, sender);
//!
//!     let event: SubmissionEvent = serde_json::from_str(&std::fs::read_to_string("event.json")?)?;
//!     let report = registry.run(&event).await?;
//!     println!("{} actions succeeded", report.succeeded.len());
//!     Ok(())
//! }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod action;
pub mod assembler;
pub mod config;
pub mod content;
pub mod email;
pub mod error;
pub mod export;
pub mod observability;
pub mod resolver;
pub mod template;

#[cfg(test)]
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use info_collection::prelude::*;
    //! ```

    pub use crate::action::{
        Action, ActionFailure, ActionRegistry, ActionReport, EmailAction, AUTO_RESPONDER_ACTION,
        EMAIL_ACTION,
    };
    pub use crate::assembler::{EmailContent, EmailContentAssembler, MessageKind};
    pub use crate::config::{FieldResolutionConfig, InfoCollectionConfig};
    pub use crate::content::{
        BinaryFile, CollectedFields, Content, ContentId, ContentRepository, FieldHelper,
        FieldValue, InMemoryContentRepository, SubmissionEvent, TranslationFieldHelper,
    };
    pub use crate::email::{
        sender_from_settings, ConsoleBackend, Email, EmailError, EmailSender, SmtpBackend,
    };
    pub use crate::error::InfoCollectionError;
    pub use crate::export::{
        Collection, CollectionSource, CsvExportFormatter, ExportCriteria, ExportFile, Exporter,
        InMemoryCollections,
    };
    pub use crate::observability;
    pub use crate::template::{BlockTemplate, MiniJinjaTemplates, TemplateLoader};
}
