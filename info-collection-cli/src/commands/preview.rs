//! Render the email a submission would produce, without sending it

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use console::{style, Emoji};
use info_collection::assembler::{EmailContent, EmailContentAssembler, MessageKind};
use info_collection_cli_lib::{load_config, load_contents, load_event};

use super::SubmissionArgs;

static INFO: Emoji = Emoji("ℹ", "i");

/// Preview an assembled email
#[derive(Debug, Args)]
pub struct PreviewCommand {
    #[command(flatten)]
    submission: SubmissionArgs,

    /// Preview the auto-responder reply instead of the notification
    #[arg(long)]
    auto_responder: bool,
}

impl PreviewCommand {
    /// Execute the preview command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration or fixtures cannot be loaded
    /// - A required field cannot be resolved
    /// - The template has no `email` block
    pub async fn execute(&self) -> Result<()> {
        let config = load_config(self.submission.config.as_deref())?;
        let contents = load_contents(&self.submission.contents)?;
        let event = load_event(&self.submission.event)?;

        let (settings, kind) = if self.auto_responder {
            (&config.action_config.auto_responder, MessageKind::AutoResponder)
        } else {
            (&config.action_config.email, MessageKind::Notification)
        };

        let assembler = EmailContentAssembler::new(
            Arc::new(settings.clone()),
            self.submission.template_loader(&config),
            Arc::new(contents),
        )
        .kind(kind);

        let email = assembler.build(&event).await?;
        print_email(&email);
        Ok(())
    }
}

fn print_email(email: &EmailContent) {
    println!("\n{INFO} {}", style("Email preview").bold());
    println!("{}", "─".repeat(60));
    println!("{:<9} {}", style("To:").cyan(), email.recipients().join(", "));
    if !email.cc().is_empty() {
        println!("{:<9} {}", style("Cc:").cyan(), email.cc().join(", "));
    }
    if !email.bcc().is_empty() {
        println!("{:<9} {}", style("Bcc:").cyan(), email.bcc().join(", "));
    }
    println!("{:<9} {}", style("From:").cyan(), email.sender().join(", "));
    println!("{:<9} {}", style("Subject:").cyan(), email.subject());
    for attachment in email.attachments() {
        println!(
            "{:<9} {} ({})",
            style("Attach:").cyan(),
            attachment.file_name,
            style(&attachment.mime_type).dim()
        );
    }
    println!("{}", "─".repeat(60));
    println!("{}", email.body());
    println!();
}
