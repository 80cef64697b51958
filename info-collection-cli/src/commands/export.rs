//! Export stored collections as CSV

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use console::{style, Emoji};
use info_collection::content::{ContentId, ContentRepository};
use info_collection::export::{CsvExportFormatter, ExportCriteria, Exporter};
use info_collection_cli_lib::{load_collections, load_config, load_contents};

static SUCCESS: Emoji = Emoji("✓", "√");

/// Write the collections of one content item to a CSV file
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Content item whose collections are exported
    content_id: u64,

    /// Configuration file (defaults to the standard config locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON array of content items
    #[arg(long)]
    contents: PathBuf,

    /// JSON array of stored collections
    #[arg(long)]
    collections: PathBuf,

    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Directory the CSV file is written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

impl ExportCommand {
    /// Execute the export command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration or fixtures cannot be loaded
    /// - The content item does not exist
    /// - A collected value has no field handler
    /// - The file cannot be written
    pub async fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let contents = load_contents(&self.contents)?;
        let collections = load_collections(&self.collections)?;

        let content_id = ContentId(self.content_id);
        let content = contents.load_content(content_id).await?;

        let mut criteria = ExportCriteria::new(content_id);
        if let Some(from) = self.from {
            criteria = criteria.from(from);
        }
        if let Some(to) = self.to {
            criteria = criteria.to(to);
        }

        let export = Exporter::new(Arc::new(collections)).export(&criteria).await?;
        let file = CsvExportFormatter::new(config.csv_export)?.format(&export, &content)?;
        let path = file
            .write_to(&self.output)
            .with_context(|| format!("Failed to write export to {}", self.output.display()))?;

        println!(
            "\n{} Exported {} collection(s) to {}\n",
            style(SUCCESS).green(),
            export.rows.len(),
            style(path.display()).cyan()
        );
        Ok(())
    }
}
