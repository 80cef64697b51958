//! CLI command implementations

pub mod export;
pub mod preview;
pub mod send;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use info_collection::config::InfoCollectionConfig;
use info_collection::template::MiniJinjaTemplates;

pub use export::ExportCommand;
pub use preview::PreviewCommand;
pub use send::SendCommand;

/// Inputs shared by the commands that process a submission
#[derive(Debug, Args)]
pub struct SubmissionArgs {
    /// Configuration file (defaults to the standard config locations)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Template directory, overriding `templates.template_dir`
    #[arg(short, long)]
    pub templates: Option<PathBuf>,

    /// JSON array of content items
    #[arg(long)]
    pub contents: PathBuf,

    /// JSON submission event
    #[arg(long)]
    pub event: PathBuf,
}

impl SubmissionArgs {
    fn template_loader(&self, config: &InfoCollectionConfig) -> Arc<MiniJinjaTemplates> {
        let dir = self
            .templates
            .as_deref()
            .unwrap_or(&config.templates.template_dir);
        Arc::new(MiniJinjaTemplates::from_dir(dir))
    }
}
