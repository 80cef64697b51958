//! Field handlers turn collected values into export cells

use crate::content::FieldValue;
use crate::error::{InfoCollectionError, Result};

/// Converts one kind of field value to text
pub trait FieldHandler: Send + Sync {
    /// Whether this handler can convert the value
    fn supports(&self, value: &FieldValue) -> bool;

    /// Convert a supported value
    fn to_string(&self, value: &FieldValue) -> String;
}

/// Text, text block and email values, exported verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct TextHandler;

impl FieldHandler for TextHandler {
    fn supports(&self, value: &FieldValue) -> bool {
        matches!(
            value,
            FieldValue::TextLine(_) | FieldValue::TextBlock(_) | FieldValue::Email(_)
        )
    }

    fn to_string(&self, value: &FieldValue) -> String {
        match value {
            FieldValue::TextLine(text) | FieldValue::TextBlock(text) | FieldValue::Email(text) => {
                text.clone()
            }
            _ => String::new(),
        }
    }
}

/// Integer and float values
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberHandler;

impl FieldHandler for NumberHandler {
    fn supports(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Integer(_) | FieldValue::Float(_))
    }

    fn to_string(&self, value: &FieldValue) -> String {
        match value {
            FieldValue::Integer(number) => number.to_string(),
            FieldValue::Float(number) => number.to_string(),
            _ => String::new(),
        }
    }
}

/// Checkboxes, exported as `1` or `0`
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckboxHandler;

impl FieldHandler for CheckboxHandler {
    fn supports(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Checkbox(_))
    }

    fn to_string(&self, value: &FieldValue) -> String {
        match value {
            FieldValue::Checkbox(true) => "1".to_string(),
            _ => "0".to_string(),
        }
    }
}

/// Uploaded files, exported by file name
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryFileHandler;

impl FieldHandler for BinaryFileHandler {
    fn supports(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::BinaryFile(_))
    }

    fn to_string(&self, value: &FieldValue) -> String {
        value
            .as_binary_file()
            .map(|file| file.file_name.clone())
            .unwrap_or_default()
    }
}

/// Empty values, exported as an empty cell
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyHandler;

impl FieldHandler for EmptyHandler {
    fn supports(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Empty)
    }

    fn to_string(&self, _value: &FieldValue) -> String {
        String::new()
    }
}

/// Ordered list of field handlers
///
/// Lookup is first-match: the earliest registered handler that supports a
/// value converts it. Register specialised handlers before general ones.
pub struct FieldHandlerRegistry {
    handlers: Vec<Box<dyn FieldHandler>>,
}

impl FieldHandlerRegistry {
    /// Create a registry without handlers
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Create a registry covering every built-in value kind
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TextHandler);
        registry.register(NumberHandler);
        registry.register(CheckboxHandler);
        registry.register(BinaryFileHandler);
        registry.register(EmptyHandler);
        registry
    }

    /// Append a handler
    pub fn register(&mut self, handler: impl FieldHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// The first handler supporting `value`
    ///
    /// # Errors
    ///
    /// Returns `InfoCollectionError::NoHandlerFound` naming the value kind
    pub fn handler_for(&self, value: &FieldValue) -> Result<&dyn FieldHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.supports(value))
            .map(|handler| &**handler)
            .ok_or_else(|| InfoCollectionError::NoHandlerFound(value.kind().to_string()))
    }

    /// Convert a value with the first supporting handler
    ///
    /// # Errors
    ///
    /// Returns `InfoCollectionError::NoHandlerFound` naming the value kind
    pub fn to_string(&self, value: &FieldValue) -> Result<String> {
        Ok(self.handler_for(value)?.to_string(value))
    }
}

impl Default for FieldHandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
