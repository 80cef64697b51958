//! CSV output for exports

use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use validator::Validate;

use super::{Export, ExportError};
use crate::config::CsvExportSettings;
use crate::content::Content;

/// UTF-8 byte order mark written before the first row
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A rendered export, ready to be offered as a download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFile {
    /// Suggested file name
    pub file_name: String,

    /// MIME type of the file
    pub content_type: String,

    /// File contents
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write the file into `dir` under its file name
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Io` if the file cannot be written
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Writes exports as CSV
///
/// # Examples
///
/// ```rust
/// use info_collection::config::CsvExportSettings;
/// use info_collection::content::{Content, ContentId};
/// use info_collection::export::{CsvExportFormatter, Export, UTF8_BOM};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let formatter = CsvExportFormatter::new(CsvExportSettings::default())?;
/// let export = Export {
///     header: vec!["Created".to_string(), "email".to_string()],
///     rows: vec![vec!["2024-03-10 09:30:00".to_string(), "a@example.com".to_string()]],
/// };
///
/// let file = formatter.format(&export, &Content::new(ContentId(1), "Contact", "contact_form", "eng-GB"))?;
/// assert_eq!(file.file_name, "Contact.csv");
/// assert!(file.bytes.starts_with(UTF8_BOM));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvExportFormatter {
    delimiter: u8,
    quote: u8,
    terminator: Terminator,
}

impl CsvExportFormatter {
    /// Create a formatter from validated settings
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Settings` if the delimiter or enclosure is not a
    /// single ASCII character, or the newline is neither `\n` nor `\r\n`
    pub fn new(settings: CsvExportSettings) -> Result<Self, ExportError> {
        settings
            .validate()
            .map_err(|e| ExportError::Settings(e.to_string()))?;

        let terminator = if settings.newline == "\r\n" {
            Terminator::CRLF
        } else {
            Terminator::Any(b'\n')
        };

        Ok(Self {
            delimiter: settings.delimiter.as_bytes()[0],
            quote: settings.enclosure.as_bytes()[0],
            terminator,
        })
    }

    /// Write an export as a CSV file named after the content item
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if writing a record fails
    pub fn format(&self, export: &Export, content: &Content) -> Result<ExportFile, ExportError> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .quote_style(QuoteStyle::Necessary)
            .terminator(self.terminator)
            .flexible(true)
            .from_writer(UTF8_BOM.to_vec());

        writer.write_record(&export.header)?;
        for row in &export.rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))?;

        Ok(ExportFile {
            file_name: format!("{}.csv", content.name),
            content_type: "text/csv".to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentId;

    fn export() -> Export {
        Export {
            header: vec!["Created".to_string(), "name".to_string(), "message".to_string()],
            rows: vec![vec![
                "2024-03-10 09:30:00".to_string(),
                "Alice".to_string(),
                "Hello; \"world\"".to_string(),
            ]],
        }
    }

    fn content() -> Content {
        Content::new(ContentId(1), "Contact us", "contact_form", "eng-GB")
    }

    #[test]
    fn test_default_settings() {
        let formatter = CsvExportFormatter::new(CsvExportSettings::default()).unwrap();
        let file = formatter.format(&export(), &content()).unwrap();

        assert_eq!(file.file_name, "Contact us.csv");
        assert_eq!(file.content_type, "text/csv");

        let text = String::from_utf8(file.bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(
            text,
            "Created,name,message\n2024-03-10 09:30:00,Alice,\"Hello; \"\"world\"\"\"\n"
        );
    }

    #[test]
    fn test_custom_delimiter_and_newline() {
        let formatter = CsvExportFormatter::new(CsvExportSettings {
            delimiter: ";".to_string(),
            enclosure: "'".to_string(),
            newline: "\r\n".to_string(),
        })
        .unwrap();
        let file = formatter.format(&export(), &content()).unwrap();

        let text = String::from_utf8(file.bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(
            text,
            "Created;name;message\r\n2024-03-10 09:30:00;Alice;'Hello; \"world\"'\r\n"
        );
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let result = CsvExportFormatter::new(CsvExportSettings {
            delimiter: "::".to_string(),
            ..CsvExportSettings::default()
        });

        assert!(matches!(result, Err(ExportError::Settings(_))));
    }

    #[test]
    fn test_write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let formatter = CsvExportFormatter::new(CsvExportSettings::default()).unwrap();
        let file = formatter.format(&export(), &content()).unwrap();

        let path = file.write_to(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("Contact us.csv"));
        assert!(std::fs::read(path).unwrap().starts_with(UTF8_BOM));
    }
}
