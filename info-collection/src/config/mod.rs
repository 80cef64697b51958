//! Configuration management for info-collection
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `INFOCOLLECT_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/info-collection/{service}/config.toml` (user config, XDG)
//! 4. `/etc/info-collection/{service}/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! Environment variable format: `INFOCOLLECT_SECTION__FIELD_NAME`
//! - Example: `INFOCOLLECT_ACTIONS__DEBUG=true`
//!
//! # Example Configuration
//!
//! ```toml
//! [actions]
//! default = ["email"]
//! debug = false
//!
//! [actions.content_types]
//! contact_form = ["email", "auto_responder"]
//!
//! [action_config.email.templates]
//! default = "email/default.html"
//!
//! [action_config.email.templates.content_types]
//! contact_form = "email/contact_form.html"
//!
//! [action_config.email.default_variables]
//! sender = "noreply@example.com"
//! subject = "New submission"
//!
//! [action_config.email.attachments]
//! enabled = true
//!
//! [action_config.email.attachments.content_types]
//! newsletter_signup = false
//!
//! [csv_export]
//! delimiter = ";"
//! enclosure = "\""
//! newline = "\r\n"
//!
//! [templates]
//! template_dir = "./templates"
//!
//! [mailer]
//! backend = "smtp"
//! ```
//!
//! The loaded configuration is read-only. Share it between concurrent
//! requests with an `Arc`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use validator::{Validate, ValidationError};

use crate::action::{AUTO_RESPONDER_ACTION, EMAIL_ACTION};
use crate::email::SmtpConfig;

/// Which actions run for which content type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsSettings {
    /// Actions run for content types without an explicit entry
    pub default: Vec<String>,

    /// Per content type action lists
    pub content_types: HashMap<String, Vec<String>>,

    /// Return the first action failure to the caller instead of logging it
    pub debug: bool,
}

impl Default for ActionsSettings {
    fn default() -> Self {
        Self {
            default: vec![EMAIL_ACTION.to_string()],
            content_types: HashMap::new(),
            debug: false,
        }
    }
}

impl ActionsSettings {
    /// Action names enabled for a content type
    #[must_use]
    pub fn for_content_type(&self, content_type: &str) -> &[String] {
        self.content_types
            .get(content_type)
            .map_or(self.default.as_slice(), Vec::as_slice)
    }
}

/// Template selection for one email action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailTemplateSettings {
    /// Template used when the content type has no override
    pub default: String,

    /// Per content type template overrides
    pub content_types: HashMap<String, String>,
}

impl Default for EmailTemplateSettings {
    fn default() -> Self {
        Self {
            default: "email/default.html".to_string(),
            content_types: HashMap::new(),
        }
    }
}

/// Attachment policy for one email action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentSettings {
    /// Whether uploaded files are attached when the content type has no override
    pub enabled: bool,

    /// Per content type overrides
    pub content_types: HashMap<String, bool>,
}

impl AttachmentSettings {
    /// Whether files submitted for this content type are attached
    #[must_use]
    pub fn send_for(&self, content_type: &str) -> bool {
        self.content_types
            .get(content_type)
            .copied()
            .unwrap_or(self.enabled)
    }
}

/// Field resolution settings for one email action
///
/// Consulted by every resolution of that action; never mutated after load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldResolutionConfig {
    /// Template selection
    pub templates: EmailTemplateSettings,

    /// Defaults for logical fields (`sender`, `subject`, ...)
    pub default_variables: HashMap<String, String>,

    /// Attachment policy; absent means never attach
    pub attachments: Option<AttachmentSettings>,
}

impl FieldResolutionConfig {
    /// Template name for a content type
    #[must_use]
    pub fn template_for(&self, content_type: &str) -> &str {
        self.templates
            .content_types
            .get(content_type)
            .map_or(self.templates.default.as_str(), String::as_str)
    }

    /// Configured default for a logical field, ignoring blank values
    #[must_use]
    pub fn default_variable(&self, field: &str) -> Option<&str> {
        self.default_variables
            .get(field)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Per-action configuration blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfigs {
    /// Notification email sent to the site owner
    pub email: FieldResolutionConfig,

    /// Reply sent to the person who submitted the form
    pub auto_responder: FieldResolutionConfig,
}

impl Default for ActionConfigs {
    fn default() -> Self {
        let auto_responder = FieldResolutionConfig {
            templates: EmailTemplateSettings {
                default: "email/auto_responder.html".to_string(),
                content_types: HashMap::new(),
            },
            ..FieldResolutionConfig::default()
        };

        Self {
            email: FieldResolutionConfig::default(),
            auto_responder,
        }
    }
}

impl ActionConfigs {
    /// Configuration block for an action name
    #[must_use]
    pub fn get(&self, action: &str) -> Option<&FieldResolutionConfig> {
        match action {
            EMAIL_ACTION => Some(&self.email),
            AUTO_RESPONDER_ACTION => Some(&self.auto_responder),
            _ => None,
        }
    }
}

/// CSV export formatting
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CsvExportSettings {
    /// Field delimiter, a single ASCII character
    #[validate(custom(function = "validate_single_ascii"))]
    pub delimiter: String,

    /// Field enclosure (quote) character, a single ASCII character
    #[validate(custom(function = "validate_single_ascii"))]
    pub enclosure: String,

    /// Record terminator, `\n` or `\r\n`
    #[validate(custom(function = "validate_newline"))]
    pub newline: String,
}

impl Default for CsvExportSettings {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            enclosure: "\"".to_string(),
            newline: "\n".to_string(),
        }
    }
}

fn validate_single_ascii(value: &str) -> Result<(), ValidationError> {
    if value.len() == 1 && value.is_ascii() {
        Ok(())
    } else {
        Err(ValidationError::new("single_ascii_character"))
    }
}

fn validate_newline(value: &str) -> Result<(), ValidationError> {
    match value {
        "\n" | "\r\n" => Ok(()),
        _ => Err(ValidationError::new("newline")),
    }
}

/// Template directory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directory containing email templates
    pub template_dir: PathBuf,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("./templates"),
        }
    }
}

/// Mail backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailerBackend {
    /// Log messages instead of sending them
    #[default]
    Console,
    /// Send through an SMTP relay
    Smtp,
}

/// Mail dispatch settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerSettings {
    /// Backend used by the action layer
    pub backend: MailerBackend,

    /// SMTP relay settings; read from `SMTP_*` environment variables when absent
    pub smtp: Option<SmtpConfig>,
}

/// Complete info-collection configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InfoCollectionConfig {
    /// Action selection
    #[serde(default)]
    pub actions: ActionsSettings,

    /// Per-action field resolution settings
    #[serde(default)]
    pub action_config: ActionConfigs,

    /// CSV export settings
    #[serde(default)]
    pub csv_export: CsvExportSettings,

    /// Template directory
    #[serde(default)]
    pub templates: TemplateSettings,

    /// Mail dispatch
    #[serde(default)]
    pub mailer: MailerSettings,
}

impl InfoCollectionConfig {
    /// Load configuration for a specific service
    ///
    /// Searches for configuration in XDG-compliant locations with precedence:
    /// 1. Environment variables (`INFOCOLLECT_*`)
    /// 2. `./config.toml`
    /// 3. `~/.config/info-collection/{service_name}/config.toml`
    /// 4. `/etc/info-collection/{service_name}/config.toml`
    /// 5. Defaults
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file cannot be read or parsed
    /// - Configuration values fail validation or type conversion
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?));

        let system_config = PathBuf::from("/etc/info-collection")
            .join(service_name)
            .join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path(service_name);
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed("INFOCOLLECT_").split("__").lowercase(true));

        let config: Self = figment.extract()?;
        config.csv_export.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - The file contains invalid TOML or values of the wrong type
    /// - CSV export settings fail validation
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config: Self = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path))
            .merge(Env::prefixed("INFOCOLLECT_").split("__").lowercase(true))
            .extract()?;

        config.csv_export.validate()?;
        Ok(config)
    }

    /// Get the recommended XDG config path for a service
    ///
    /// # Example
    ///
    /// ```rust
    /// use info_collection::config::InfoCollectionConfig;
    ///
    /// let path = InfoCollectionConfig::recommended_path("my-site");
    /// // Returns: ~/.config/info-collection/my-site/config.toml
    /// ```
    #[must_use]
    pub fn recommended_path(service_name: &str) -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| {
                config_dir
                    .join("info-collection")
                    .join(service_name)
                    .join("config.toml")
            },
        )
    }
}
