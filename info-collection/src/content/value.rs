//! Field values carried by content items and form submissions

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A stored or uploaded file referenced by a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryFile {
    /// Path or URI the file can be read from
    pub input_uri: String,

    /// File name presented to the recipient
    pub file_name: String,

    /// MIME type of the file
    pub mime_type: String,

    /// Size in bytes, when known
    #[serde(default)]
    pub file_size: Option<u64>,
}

impl BinaryFile {
    /// Create a new binary file descriptor
    #[must_use]
    pub fn new(
        input_uri: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            input_uri: input_uri.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            file_size: None,
        }
    }
}

/// Scalar property extracted from a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueProperty {
    /// Plain text representation
    Text,
    /// The single email address of an email field
    Email,
}

/// Value of a content field or of a submitted form field
///
/// Serialized with an explicit `type` tag so templates can switch on the
/// kind of value (`{% if field.type == "binary_file" %}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Single line of text
    TextLine(String),
    /// Multi-line text
    TextBlock(String),
    /// Email address
    Email(String),
    /// Integer number
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Boolean checkbox
    Checkbox(bool),
    /// Uploaded or stored file
    BinaryFile(BinaryFile),
    /// No value
    Empty,
}

impl FieldValue {
    /// Short name of the value kind, used in logs and errors
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TextLine(_) => "text_line",
            Self::TextBlock(_) => "text_block",
            Self::Email(_) => "email",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Checkbox(_) => "checkbox",
            Self::BinaryFile(_) => "binary_file",
            Self::Empty => "empty",
        }
    }

    /// Whether the value counts as empty
    ///
    /// Blank text and blank email addresses are empty. Numbers and
    /// checkboxes always hold a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::TextLine(text) | Self::TextBlock(text) | Self::Email(text) => {
                text.trim().is_empty()
            }
            Self::BinaryFile(file) => file.input_uri.is_empty(),
            Self::Integer(_) | Self::Float(_) | Self::Checkbox(_) => false,
            Self::Empty => true,
        }
    }

    /// Extract a scalar property from the value
    ///
    /// Returns `None` when the value kind has no such property, e.g. asking
    /// a text line for its email address.
    #[must_use]
    pub fn property(&self, property: ValueProperty) -> Option<String> {
        match (property, self) {
            (ValueProperty::Email, Self::Email(email)) => Some(email.clone()),
            (ValueProperty::Email, _) => None,
            (ValueProperty::Text, Self::TextLine(text) | Self::TextBlock(text) | Self::Email(text)) => {
                Some(text.clone())
            }
            (ValueProperty::Text, Self::Integer(number)) => Some(number.to_string()),
            (ValueProperty::Text, Self::Float(number)) => Some(number.to_string()),
            (ValueProperty::Text, Self::Checkbox(checked)) => Some(checked.to_string()),
            (ValueProperty::Text, Self::BinaryFile(file)) => Some(file.file_name.clone()),
            (ValueProperty::Text, Self::Empty) => None,
        }
    }

    /// The binary file held by the value, if any
    #[must_use]
    pub const fn as_binary_file(&self) -> Option<&BinaryFile> {
        match self {
            Self::BinaryFile(file) => Some(file),
            _ => None,
        }
    }
}

/// Submitted form values keyed by field identifier
///
/// Keeps submission order. Serializes as a map so templates can address
/// values as `collected_fields.email`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedFields(Vec<(String, FieldValue)>);

impl CollectedFields {
    /// Create an empty set of collected fields
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collected value, replacing an earlier value with the same identifier
    #[must_use]
    pub fn with(mut self, identifier: impl Into<String>, value: FieldValue) -> Self {
        self.insert(identifier, value);
        self
    }

    /// Insert a collected value, replacing an earlier value in place
    pub fn insert(&mut self, identifier: impl Into<String>, value: FieldValue) {
        let identifier = identifier.into();
        if let Some(slot) = self.0.iter_mut().find(|(id, _)| *id == identifier) {
            slot.1 = value;
        } else {
            self.0.push((identifier, value));
        }
    }

    /// Look up a value by field identifier
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&FieldValue> {
        self.0
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, value)| value)
    }

    /// Iterate over `(identifier, value)` pairs in submission order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(id, value)| (id.as_str(), value))
    }

    /// Number of collected fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<(String, FieldValue)>> for CollectedFields {
    fn from(pairs: Vec<(String, FieldValue)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |fields, (id, value)| fields.with(id, value))
    }
}

impl Serialize for CollectedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, value) in &self.0 {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}

struct CollectedFieldsVisitor;

impl<'de> Visitor<'de> for CollectedFieldsVisitor {
    type Value = CollectedFields;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of field identifiers to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut fields = CollectedFields::new();
        while let Some((identifier, value)) = access.next_entry::<String, FieldValue>()? {
            fields.insert(identifier, value);
        }
        Ok(fields)
    }
}

// Entries keep document order.
impl<'de> Deserialize<'de> for CollectedFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CollectedFieldsVisitor)
    }
}
