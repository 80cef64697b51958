//! Integration tests for assembling and exporting contact form submissions

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use info_collection::config::{CsvExportSettings, FieldResolutionConfig};
use info_collection::content::{
    CollectedFields, Content, ContentId, FieldValue, InMemoryContentRepository, SubmissionEvent,
};
use info_collection::error::InfoCollectionError;
use info_collection::prelude::*;

const CONTACT_TEMPLATE: &str = "email/contact_form.html";

fn contact_templates() -> MiniJinjaTemplates {
    MiniJinjaTemplates::from_sources([(
        CONTACT_TEMPLATE,
        "{% block recipient %}user@example.com{% endblock %}\n\
         {% block email %}<p>{{ collected_fields.message.value }}</p>{% endblock %}\n",
    )])
    .unwrap()
}

fn contact_config() -> FieldResolutionConfig {
    let mut config = FieldResolutionConfig::default();
    config
        .templates
        .content_types
        .insert("contact_form".to_string(), CONTACT_TEMPLATE.to_string());
    config.default_variables = HashMap::from([("subject".to_string(), "New submission".to_string())]);
    config
}

fn contents() -> InMemoryContentRepository {
    [Content::new(ContentId(12), "Contact us", "contact_form", "eng-GB")
        .with_field("sender", FieldValue::Email("site@example.com".to_string()))]
    .into_iter()
    .collect()
}

fn submission() -> SubmissionEvent {
    SubmissionEvent::new(
        "contact_form",
        ContentId(12),
        CollectedFields::new()
            .with("name", FieldValue::TextLine("Alice".to_string()))
            .with("message", FieldValue::TextBlock("Please call me back".to_string())),
    )
}

#[tokio::test]
async fn contact_form_submission_assembles_complete_email() {
    let assembler = EmailContentAssembler::new(
        Arc::new(contact_config()),
        Arc::new(contact_templates()),
        Arc::new(contents()),
    );

    let email = assembler.build(&submission()).await.unwrap();

    assert_eq!(email.recipients(), ["user@example.com"]);
    assert_eq!(email.sender(), ["site@example.com"]);
    assert_eq!(email.subject(), "New submission");
    assert_eq!(email.body(), "<p>Please call me back</p>");
    assert!(email.attachments().is_empty());
}

#[tokio::test]
async fn unknown_content_item_is_reported_unchanged() {
    let assembler = EmailContentAssembler::new(
        Arc::new(contact_config()),
        Arc::new(contact_templates()),
        Arc::new(InMemoryContentRepository::new()),
    );

    let error = assembler.build(&submission()).await.unwrap_err();

    assert_eq!(error.to_string(), "content with id 12 not found");
}

#[tokio::test]
async fn template_without_body_block_names_its_blocks() {
    let templates = MiniJinjaTemplates::from_sources([(
        CONTACT_TEMPLATE,
        "{% block recipient %}user@example.com{% endblock %}",
    )])
    .unwrap();
    let assembler = EmailContentAssembler::new(
        Arc::new(contact_config()),
        Arc::new(templates),
        Arc::new(contents()),
    );

    let error = assembler.build(&submission()).await.unwrap_err();

    assert!(matches!(
        error,
        InfoCollectionError::MissingEmailBlock { ref available_blocks, .. }
            if available_blocks == &["recipient".to_string()]
    ));
}

#[tokio::test]
async fn stored_submissions_export_as_csv() {
    let collections: InMemoryCollections = [Collection {
        id: 1,
        content_id: ContentId(12),
        created: Utc.with_ymd_and_hms(2024, 5, 2, 14, 0, 0).unwrap(),
        fields: submission().collected,
    }]
    .into_iter()
    .collect();

    let export = Exporter::new(Arc::new(collections))
        .export(&ExportCriteria::new(ContentId(12)))
        .await
        .unwrap();
    let file = CsvExportFormatter::new(CsvExportSettings::default())
        .unwrap()
        .format(&export, &contents_item())
        .unwrap();

    let text = String::from_utf8(file.bytes).unwrap();
    assert_eq!(file.file_name, "Contact us.csv");
    assert_eq!(
        text,
        "\u{feff}Created,name,message\n2024-05-02 14:00:00,Alice,Please call me back\n"
    );
}

fn contents_item() -> Content {
    Content::new(ContentId(12), "Contact us", "contact_form", "eng-GB")
}
