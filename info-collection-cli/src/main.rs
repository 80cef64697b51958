//! info-collection CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{ExportCommand, PreviewCommand, SendCommand};
use info_collection::observability;

#[derive(Parser)]
#[command(name = "infocollect")]
#[command(version)]
#[command(about = "Preview, send and export CMS form submissions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the email a submission would produce
    Preview(PreviewCommand),
    /// Run the configured actions for a submission
    Send(SendCommand),
    /// Export stored collections as CSV
    Export(ExportCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Preview(cmd) => cmd.execute().await?,
        Commands::Send(cmd) => cmd.execute().await?,
        Commands::Export(cmd) => cmd.execute().await?,
    }

    Ok(())
}
