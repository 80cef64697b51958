//! Actions run after a form is submitted
//!
//! Each content type enables a list of named actions (see
//! [`ActionsSettings`]). The bundled actions both send mail:
//!
//! - `email` notifies the site owner
//! - `auto_responder` replies to the person who submitted the form
//!
//! Action failures are logged. Whether they reach the caller depends on
//! `actions.debug`: in debug mode the first failure aborts the run,
//! otherwise every action runs and failures are collected in the
//! [`ActionReport`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument, warn};

use crate::assembler::{EmailContentAssembler, MessageKind};
use crate::config::{ActionsSettings, InfoCollectionConfig};
use crate::content::{ContentRepository, SubmissionEvent};
use crate::email::{Email, EmailSender};
use crate::error::{InfoCollectionError, Result};
use crate::template::TemplateLoader;

/// Name of the owner notification action
pub const EMAIL_ACTION: &str = "email";

/// Name of the submitter reply action
pub const AUTO_RESPONDER_ACTION: &str = "auto_responder";

/// Something done with a submission
#[async_trait]
pub trait Action: Send + Sync {
    /// Name used in the `actions` configuration
    fn name(&self) -> &str;

    /// Act on a submission
    ///
    /// # Errors
    ///
    /// Returns an error if the action could not complete
    async fn act(&self, event: &SubmissionEvent) -> Result<()>;
}

/// Assembles a message and hands it to a mail sender
pub struct EmailAction {
    name: String,
    assembler: EmailContentAssembler,
    sender: Arc<dyn EmailSender>,
}

impl EmailAction {
    /// Create an email action
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        assembler: EmailContentAssembler,
        sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            name: name.into(),
            assembler,
            sender,
        }
    }
}

#[async_trait]
impl Action for EmailAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn act(&self, event: &SubmissionEvent) -> Result<()> {
        let content = self.assembler.build(event).await?;

        self.sender
            .send(Email::from_content(&content))
            .await
            .map_err(|e| InfoCollectionError::action_failed(&self.name, &e))?;

        info!(
            action = %self.name,
            recipients = content.recipients().len(),
            "Email sent"
        );
        Ok(())
    }
}

/// A failed action
#[derive(Debug)]
pub struct ActionFailure {
    /// Action name
    pub action: String,

    /// What went wrong
    pub error: InfoCollectionError,
}

/// Outcome of running the actions for one submission
#[derive(Debug, Default)]
pub struct ActionReport {
    /// Actions that completed, in run order
    pub succeeded: Vec<String>,

    /// Actions that failed, in run order
    pub failures: Vec<ActionFailure>,
}

impl ActionReport {
    /// Whether every action completed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs the configured actions for each submission
pub struct ActionRegistry {
    settings: ActionsSettings,
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new(settings: ActionsSettings) -> Self {
        Self {
            settings,
            actions: HashMap::new(),
        }
    }

    /// Create a registry with the `email` and `auto_responder` actions
    ///
    /// Both actions share the template loader, content repository and
    /// sender, and read their own section of `action_config`.
    #[must_use]
    pub fn with_email_actions(
        config: &InfoCollectionConfig,
        templates: Arc<dyn TemplateLoader>,
        contents: Arc<dyn ContentRepository>,
        sender: Arc<dyn EmailSender>,
    ) -> Self {
        let notification = EmailContentAssembler::new(
            Arc::new(config.action_config.email.clone()),
            Arc::clone(&templates),
            Arc::clone(&contents),
        );
        let auto_responder = EmailContentAssembler::new(
            Arc::new(config.action_config.auto_responder.clone()),
            templates,
            contents,
        )
        .kind(MessageKind::AutoResponder);

        let mut registry = Self::new(config.actions.clone());
        registry.register(Arc::new(EmailAction::new(
            EMAIL_ACTION,
            notification,
            Arc::clone(&sender),
        )));
        registry.register(Arc::new(EmailAction::new(
            AUTO_RESPONDER_ACTION,
            auto_responder,
            sender,
        )));
        registry
    }

    /// Register an action under its name, replacing any previous one
    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.name().to_string(), action);
    }

    /// Names of the registered actions
    #[must_use]
    pub fn registered(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the actions enabled for the submission's content type
    ///
    /// # Errors
    ///
    /// In debug mode, returns the first action failure. Otherwise failures
    /// are reported in the returned [`ActionReport`].
    #[instrument(skip(self, event), fields(content_type = %event.content_type, content_id = %event.content_id))]
    pub async fn run(&self, event: &SubmissionEvent) -> Result<ActionReport> {
        let mut report = ActionReport::default();

        for name in self.settings.for_content_type(&event.content_type) {
            let outcome = match self.actions.get(name) {
                Some(action) => action.act(event).await,
                None => {
                    warn!(action = %name, "Action is enabled but not registered");
                    Err(InfoCollectionError::ActionFailed {
                        action: name.clone(),
                        reason: "action is not registered".to_string(),
                    })
                }
            };

            match outcome {
                Ok(()) => report.succeeded.push(name.clone()),
                Err(e) => {
                    error!(action = %name, error = %e, "Action failed");
                    if self.settings.debug {
                        return Err(e);
                    }
                    report.failures.push(ActionFailure {
                        action: name.clone(),
                        error: e,
                    });
                }
            }
        }

        Ok(report)
    }
}
