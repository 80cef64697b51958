//! Email content assembly
//!
//! [`EmailContentAssembler::build`] turns one submission into an
//! [`EmailContent`]. Fields are resolved in a fixed order (recipient,
//! sender, subject, body) and the first failure aborts the build, so the
//! reported error is deterministic. Optional `cc`/`bcc` and attachments are
//! resolved last and never fail on their own.

mod message;

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::FieldResolutionConfig;
use crate::content::{
    ContentRepository, FieldHelper, SubmissionEvent, TranslationFieldHelper, ValueProperty,
};
use crate::error::{InfoCollectionError, Result};
use crate::resolver::{
    fields, AttachmentSelector, EmailAddressResolver, FieldValueResolver, ResolutionContext,
};
use crate::template::TemplateLoader;

pub use message::EmailContent;

/// Submitted field holding the submitter's address when not configured
const DEFAULT_EMAIL_FIELD: &str = "email";

/// Who a message is addressed to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageKind {
    /// Notification to the site owner; recipients come from the usual tiers
    #[default]
    Notification,

    /// Reply to the submitter; recipients come from the submitted email field
    AutoResponder,
}

impl MessageKind {
    /// Logical field holding the subject for this kind
    #[must_use]
    pub const fn subject_field(self) -> &'static str {
        match self {
            Self::Notification => fields::SUBJECT,
            Self::AutoResponder => fields::AUTO_RESPONDER_SUBJECT,
        }
    }
}

/// Builds outbound messages from submissions
///
/// Holds only shared read-only state, so one assembler can serve any number
/// of concurrent builds.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use info_collection::assembler::EmailContentAssembler;
/// use info_collection::config::FieldResolutionConfig;
/// use info_collection::content::{
///     CollectedFields, Content, ContentId, FieldValue, InMemoryContentRepository, SubmissionEvent,
/// };
/// use info_collection::template::MiniJinjaTemplates;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let templates = MiniJinjaTemplates::from_sources([(
///     "email/default.html",
///     "{% block recipient %}owner@example.com{% endblock %}\
///      {% block sender %}site@example.com{% endblock %}\
///      {% block subject %}New message{% endblock %}\
///      {% block email %}<p>{{ collected_fields.message.value }}</p>{% endblock %}",
/// )])?;
/// let contents = InMemoryContentRepository::new();
/// contents.insert(Content::new(ContentId(1), "Contact", "contact_form", "eng-GB"));
///
/// let assembler = EmailContentAssembler::new(
///     Arc::new(FieldResolutionConfig::default()),
///     Arc::new(templates),
///     Arc::new(contents),
/// );
///
/// let event = SubmissionEvent::new(
///     "contact_form",
///     ContentId(1),
///     CollectedFields::new().with("message", FieldValue::TextBlock("Hi".to_string())),
/// );
/// let email = assembler.build(&event).await?;
/// assert_eq!(email.body(), "<p>Hi</p>");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EmailContentAssembler {
    kind: MessageKind,
    config: Arc<FieldResolutionConfig>,
    templates: Arc<dyn TemplateLoader>,
    contents: Arc<dyn ContentRepository>,
    values: FieldValueResolver,
    addresses: EmailAddressResolver,
    attachments: AttachmentSelector,
}

impl EmailContentAssembler {
    /// Create a notification assembler using [`TranslationFieldHelper`]
    #[must_use]
    pub fn new(
        config: Arc<FieldResolutionConfig>,
        templates: Arc<dyn TemplateLoader>,
        contents: Arc<dyn ContentRepository>,
    ) -> Self {
        Self::with_field_helper(
            config,
            templates,
            contents,
            Arc::new(TranslationFieldHelper::default()),
        )
    }

    /// Create a notification assembler with a custom field helper
    #[must_use]
    pub fn with_field_helper(
        config: Arc<FieldResolutionConfig>,
        templates: Arc<dyn TemplateLoader>,
        contents: Arc<dyn ContentRepository>,
        fields: Arc<dyn FieldHelper>,
    ) -> Self {
        let values = FieldValueResolver::new(Arc::clone(&config), fields);
        Self {
            kind: MessageKind::Notification,
            addresses: EmailAddressResolver::new(values.clone()),
            attachments: AttachmentSelector::new(Arc::clone(&config)),
            values,
            config,
            templates,
            contents,
        }
    }

    /// Switch the kind of message this assembler builds
    #[must_use]
    pub const fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Kind of message this assembler builds
    #[must_use]
    pub const fn message_kind(&self) -> MessageKind {
        self.kind
    }

    /// Build the message for a submission
    ///
    /// # Errors
    ///
    /// Returns the first failure in resolution order:
    /// - `TemplateError::NotFound` if the selected template does not exist
    /// - `ContentError::NotFound` if the owning content item does not exist
    /// - `MissingValue` for the recipient, sender or subject
    /// - `MissingEmailBlock` if the template has no body block
    #[instrument(skip(self, event), fields(content_type = %event.content_type, content_id = %event.content_id, kind = ?self.kind))]
    pub async fn build(&self, event: &SubmissionEvent) -> Result<EmailContent> {
        let template_name = self.config.template_for(&event.content_type);
        let template = self.templates.load(template_name)?;
        let content = self.contents.load_content(event.content_id).await?;
        let ctx = ResolutionContext::new(event, content, template);

        let recipients = self.recipients(&ctx)?;
        let sender = self.addresses.resolve(&ctx, fields::SENDER)?;
        let subject = self
            .values
            .resolve(&ctx, self.kind.subject_field(), ValueProperty::Text)?;
        let body = self.body(&ctx)?;

        let cc = self.addresses.resolve_optional(&ctx, fields::CC)?;
        let bcc = self.addresses.resolve_optional(&ctx, fields::BCC)?;
        let attachments = self
            .attachments
            .select(&event.content_type, &event.collected);

        debug!(
            template = template_name,
            recipients = recipients.len(),
            attachments = attachments.len(),
            "Assembled email content"
        );

        Ok(EmailContent::for_kind(self.kind, recipients, sender, subject, body)?
            .with_cc(cc)
            .with_bcc(bcc)
            .with_attachments(attachments))
    }

    fn recipients(&self, ctx: &ResolutionContext<'_>) -> Result<Vec<String>> {
        match self.kind {
            MessageKind::Notification => self.addresses.resolve(ctx, fields::RECIPIENT),
            MessageKind::AutoResponder => {
                let submitted_field = self
                    .config
                    .default_variable(fields::EMAIL_FIELD_IDENTIFIER)
                    .unwrap_or(DEFAULT_EMAIL_FIELD);
                self.addresses
                    .resolve_submitted(ctx, fields::RECIPIENT, submitted_field)
            }
        }
    }

    fn body(&self, ctx: &ResolutionContext<'_>) -> Result<String> {
        let template = ctx.template();
        if !template.has_block(fields::EMAIL_BLOCK) {
            return Err(InfoCollectionError::MissingEmailBlock {
                template: template.name().to_string(),
                available_blocks: template.block_names(),
            });
        }

        let variables = ctx
            .variables()
            .with_default_variables(&self.config.default_variables);
        let rendered = template.render_block(fields::EMAIL_BLOCK, &variables)?;

        Ok(rendered.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::AttachmentSettings;
    use crate::content::{
        BinaryFile, CollectedFields, Content, ContentError, ContentId, FieldValue,
        InMemoryContentRepository, MockContentRepository,
    };
    use crate::template::{MiniJinjaTemplates, TemplateError};

    const TEMPLATE: &str = "email/contact.html";

    fn config(defaults: &[(&str, &str)]) -> FieldResolutionConfig {
        let mut config = FieldResolutionConfig {
            default_variables: defaults
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<HashMap<_, _>>(),
            ..FieldResolutionConfig::default()
        };
        config
            .templates
            .content_types
            .insert("contact_form".to_string(), TEMPLATE.to_string());
        config
    }

    fn contents() -> InMemoryContentRepository {
        let contents = InMemoryContentRepository::new();
        contents.insert(
            Content::new(ContentId(7), "Contact", "contact_form", "eng-GB")
                .with_field("sender", FieldValue::Email("site@example.com".to_string())),
        );
        contents
    }

    fn event() -> SubmissionEvent {
        SubmissionEvent::new(
            "contact_form",
            ContentId(7),
            CollectedFields::new()
                .with("name", FieldValue::TextLine("Alice".to_string()))
                .with("email", FieldValue::Email("alice@example.com".to_string()))
                .with(
                    "cv",
                    FieldValue::BinaryFile(BinaryFile::new(
                        "/var/uploads/cv.pdf",
                        "cv.pdf",
                        "application/pdf",
                    )),
                ),
        )
    }

    fn assembler(source: &str, config: FieldResolutionConfig) -> EmailContentAssembler {
        let templates = MiniJinjaTemplates::from_sources([(TEMPLATE, source)]).unwrap();
        EmailContentAssembler::new(Arc::new(config), Arc::new(templates), Arc::new(contents()))
    }

    #[tokio::test]
    async fn test_build_resolves_every_tier() {
        let assembler = assembler(
            "{% block recipient %}owner@example.com{% endblock %}\
             {% block email %}<p>From {{ collected_fields.name.value }}</p>{% endblock %}",
            config(&[("subject", "New submission")]),
        );

        let email = assembler.build(&event()).await.unwrap();

        assert_eq!(email.recipients(), ["owner@example.com"]);
        assert_eq!(email.sender(), ["site@example.com"]);
        assert_eq!(email.subject(), "New submission");
        assert_eq!(email.body(), "<p>From Alice</p>");
        assert!(email.cc().is_empty());
        assert!(!email.has_attachments());
    }

    #[tokio::test]
    async fn test_recipient_failure_reported_before_subject() {
        let assembler = assembler("{% block email %}x{% endblock %}", config(&[]));

        let error = assembler.build(&event()).await.unwrap_err();
        assert!(matches!(error, InfoCollectionError::MissingValue(field) if field == "recipient"));
    }

    #[tokio::test]
    async fn test_missing_body_block_ignores_defaults() {
        let assembler = assembler(
            "{% block recipient %}owner@example.com{% endblock %}{% block subject %}Hi{% endblock %}",
            config(&[("email", "<p>default body</p>"), ("body", "<p>default body</p>")]),
        );

        let error = assembler.build(&event()).await.unwrap_err();
        match error {
            InfoCollectionError::MissingEmailBlock {
                template,
                available_blocks,
            } => {
                assert_eq!(template, TEMPLATE);
                assert_eq!(available_blocks, vec!["recipient", "subject"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_body_block_inherited_from_base_template() {
        let templates = MiniJinjaTemplates::from_sources([
            (
                "email/base.html",
                "{% block email %}<p>From {{ collected_fields.name.value }}</p>{% endblock %}",
            ),
            (
                TEMPLATE,
                "{% extends \"email/base.html\" %}\
                 {# {% block recipient %}old@example.com{% endblock %} #}\
                 {% block subject %}Contact{% endblock %}",
            ),
        ])
        .unwrap();
        let assembler = EmailContentAssembler::new(
            Arc::new(config(&[("recipient", "owner@example.com")])),
            Arc::new(templates),
            Arc::new(contents()),
        );

        let email = assembler.build(&event()).await.unwrap();

        assert_eq!(email.recipients(), ["owner@example.com"]);
        assert_eq!(email.subject(), "Contact");
        assert_eq!(email.body(), "<p>From Alice</p>");
    }

    #[tokio::test]
    async fn test_body_sees_default_variables() {
        let assembler = assembler(
            "{% block recipient %}owner@example.com{% endblock %}\
             {% block email %}{{ default_variables.signature }}{% endblock %}",
            config(&[("subject", "New submission"), ("signature", "The team")]),
        );

        let email = assembler.build(&event()).await.unwrap();
        assert_eq!(email.body(), "The team");
    }

    #[tokio::test]
    async fn test_cc_bcc_and_attachments() {
        let mut config = config(&[("subject", "New submission"), ("bcc", "audit@example.com")]);
        config.attachments = Some(AttachmentSettings {
            enabled: true,
            content_types: HashMap::new(),
        });
        let assembler = assembler(
            "{% block recipient %}owner@example.com{% endblock %}\
             {% block cc %}a@example.com, nope{% endblock %}\
             {% block email %}body{% endblock %}",
            config,
        );

        let email = assembler.build(&event()).await.unwrap();
        assert_eq!(email.cc(), ["a@example.com"]);
        assert_eq!(email.bcc(), ["audit@example.com"]);
        assert_eq!(email.attachments().len(), 1);
        assert_eq!(email.attachments()[0].file_name, "cv.pdf");
    }

    #[tokio::test]
    async fn test_auto_responder_replies_to_submitter() {
        let assembler = assembler(
            "{% block auto_responder_subject %}Thanks {{ collected_fields.name.value }}{% endblock %}\
             {% block email %}<p>We got your message</p>{% endblock %}",
            config(&[]),
        )
        .kind(MessageKind::AutoResponder);

        let email = assembler.build(&event()).await.unwrap();
        assert_eq!(email.recipients(), ["alice@example.com"]);
        assert_eq!(email.subject(), "Thanks Alice");
    }

    #[tokio::test]
    async fn test_auto_responder_uses_configured_email_field() {
        let assembler = assembler(
            "{% block email %}ok{% endblock %}",
            config(&[
                ("email_field_identifier", "name"),
                ("auto_responder_subject", "Thanks"),
            ]),
        )
        .kind(MessageKind::AutoResponder);

        let error = assembler.build(&event()).await.unwrap_err();
        assert!(matches!(error, InfoCollectionError::MissingValue(field) if field == "recipient"));
    }

    #[tokio::test]
    async fn test_missing_template_propagates() {
        let templates = MiniJinjaTemplates::from_sources::<_, String, String>([]).unwrap();
        let assembler = EmailContentAssembler::new(
            Arc::new(config(&[])),
            Arc::new(templates),
            Arc::new(contents()),
        );

        let error = assembler.build(&event()).await.unwrap_err();
        assert!(matches!(
            error,
            InfoCollectionError::Template(TemplateError::NotFound(name)) if name == TEMPLATE
        ));
    }

    #[tokio::test]
    async fn test_content_not_found_propagates() {
        let mut contents = MockContentRepository::new();
        contents
            .expect_load_content()
            .times(1)
            .returning(|id| Err(ContentError::NotFound(id)));

        let templates =
            MiniJinjaTemplates::from_sources([(TEMPLATE, "{% block email %}x{% endblock %}")])
                .unwrap();
        let assembler = EmailContentAssembler::new(
            Arc::new(config(&[])),
            Arc::new(templates),
            Arc::new(contents),
        );

        let error = assembler.build(&event()).await.unwrap_err();
        assert!(matches!(
            error,
            InfoCollectionError::Content(ContentError::NotFound(ContentId(7)))
        ));
    }
}
