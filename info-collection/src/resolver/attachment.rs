//! Selection of uploaded files to attach to a message

use std::sync::Arc;

use crate::config::FieldResolutionConfig;
use crate::content::{BinaryFile, CollectedFields};

/// Picks submitted files to attach, per content type policy
#[derive(Debug, Clone)]
pub struct AttachmentSelector {
    config: Arc<FieldResolutionConfig>,
}

impl AttachmentSelector {
    /// Create a selector reading the attachment policy from `config`
    #[must_use]
    pub const fn new(config: Arc<FieldResolutionConfig>) -> Self {
        Self { config }
    }

    /// Binary files among the collected fields, in submission order
    ///
    /// Returns an empty list when no attachment policy is configured or the
    /// policy for `content_type` is off.
    #[must_use]
    pub fn select(&self, content_type: &str, collected: &CollectedFields) -> Vec<BinaryFile> {
        let Some(policy) = &self.config.attachments else {
            return Vec::new();
        };

        if !policy.send_for(content_type) {
            return Vec::new();
        }

        collected
            .iter()
            .filter_map(|(_, value)| value.as_binary_file())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::AttachmentSettings;
    use crate::content::FieldValue;

    fn collected() -> CollectedFields {
        CollectedFields::new()
            .with("text", FieldValue::TextLine("a".to_string()))
            .with(
                "cv",
                FieldValue::BinaryFile(BinaryFile::new("/var/uploads/f1.pdf", "f1.pdf", "application/pdf")),
            )
            .with("email", FieldValue::Email("x@example.com".to_string()))
            .with(
                "photo",
                FieldValue::BinaryFile(BinaryFile::new("/var/uploads/f2.png", "f2.png", "image/png")),
            )
    }

    fn selector(attachments: Option<AttachmentSettings>) -> AttachmentSelector {
        AttachmentSelector::new(Arc::new(FieldResolutionConfig {
            attachments,
            ..FieldResolutionConfig::default()
        }))
    }

    #[test]
    fn test_no_policy_selects_nothing() {
        assert!(selector(None).select("contact_form", &collected()).is_empty());
    }

    #[test]
    fn test_enabled_policy_keeps_submission_order() {
        let files = selector(Some(AttachmentSettings {
            enabled: true,
            content_types: HashMap::new(),
        }))
        .select("contact_form", &collected());

        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["f1.pdf", "f2.png"]);
    }

    #[test]
    fn test_content_type_override_disables() {
        let files = selector(Some(AttachmentSettings {
            enabled: true,
            content_types: HashMap::from([("contact_form".to_string(), false)]),
        }))
        .select("contact_form", &collected());

        assert!(files.is_empty());
    }

    #[test]
    fn test_no_files_submitted() {
        let files = selector(Some(AttachmentSettings {
            enabled: true,
            content_types: HashMap::new(),
        }))
        .select(
            "contact_form",
            &CollectedFields::new().with("text", FieldValue::TextLine("a".to_string())),
        );

        assert!(files.is_empty());
    }
}
