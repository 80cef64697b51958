//! Tests for loading the JSON fixtures used by the CLI

use std::path::PathBuf;

use info_collection::content::{ContentId, ContentRepository, FieldValue};
use info_collection::export::{CollectionSource, ExportCriteria, Exporter};
use info_collection_cli_lib::{load_collections, load_config, load_contents, load_event};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

#[tokio::test]
async fn test_contents_fixture_loads() {
    let contents = load_contents(&fixture("contents.json")).unwrap();

    let content = contents.load_content(ContentId(12)).await.unwrap();
    assert_eq!(content.name, "Contact us");
    assert!(content.has_field("sender"));
}

#[test]
fn test_event_fixture_keeps_field_order() {
    let event = load_event(&fixture("event.json")).unwrap();

    assert_eq!(event.content_type, "contact_form");
    let ids: Vec<&str> = event.collected.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["name", "email", "message"]);
    assert_eq!(
        event.collected.get("email"),
        Some(&FieldValue::Email("alice@example.com".to_string()))
    );
}

#[tokio::test]
async fn test_collections_fixture_exports_oldest_first() {
    let collections = load_collections(&fixture("collections.json")).unwrap();
    assert_eq!(collections.collections(ContentId(12)).await.unwrap().len(), 2);

    let export = Exporter::new(std::sync::Arc::new(collections))
        .export(&ExportCriteria::new(ContentId(12)))
        .await
        .unwrap();

    assert_eq!(export.header, vec!["Created", "name", "newsletter", "email"]);
    assert_eq!(export.rows[0], vec!["2024-05-01 09:15:00", "Bob", "1", ""]);
}

#[test]
fn test_config_fixture_loads() {
    let config = load_config(Some(&fixture("config.toml"))).unwrap();

    assert_eq!(
        config.actions.for_content_type("contact_form"),
        ["email", "auto_responder"]
    );
    assert_eq!(
        config.action_config.email.template_for("contact_form"),
        "email/contact_form.html"
    );
    assert_eq!(
        config.action_config.email.default_variable("subject"),
        Some("New submission")
    );
}

#[test]
fn test_missing_fixture_names_the_path() {
    let error = load_event(&fixture("missing.json")).unwrap_err();

    assert!(error.to_string().contains("missing.json"));
}
