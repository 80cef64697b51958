//! Run the configured actions for a submission

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use console::{style, Emoji};
use info_collection::action::{ActionRegistry, ActionReport};
use info_collection::email::sender_from_settings;
use info_collection_cli_lib::{load_config, load_contents, load_event};

use super::SubmissionArgs;

static SUCCESS: Emoji = Emoji("✓", "√");
static FAILURE: Emoji = Emoji("✗", "x");

/// Dispatch a submission through the configured actions
#[derive(Debug, Args)]
pub struct SendCommand {
    #[command(flatten)]
    submission: SubmissionArgs,

    /// Stop at the first failing action
    #[arg(long)]
    debug: bool,
}

impl SendCommand {
    /// Execute the send command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration or fixtures cannot be loaded
    /// - The mailer backend cannot be created
    /// - Any action fails
    pub async fn execute(&self) -> Result<()> {
        let mut config = load_config(self.submission.config.as_deref())?;
        config.actions.debug |= self.debug;

        let contents = load_contents(&self.submission.contents)?;
        let event = load_event(&self.submission.event)?;
        let sender = sender_from_settings(&config.mailer)?;

        let registry = ActionRegistry::with_email_actions(
            &config,
            self.submission.template_loader(&config),
            Arc::new(contents),
            sender,
        );

        let report = registry.run(&event).await?;
        print_report(&report);

        if !report.is_success() {
            bail!("{} action(s) failed", report.failures.len());
        }
        Ok(())
    }
}

fn print_report(report: &ActionReport) {
    println!();
    for action in &report.succeeded {
        println!("{} {}", style(SUCCESS).green(), action);
    }
    for failure in &report.failures {
        println!(
            "{} {}: {}",
            style(FAILURE).red(),
            failure.action,
            style(&failure.error).red()
        );
    }
    if report.succeeded.is_empty() && report.failures.is_empty() {
        println!("  {}", style("(No actions configured for this content type)").dim());
    }
    println!();
}
