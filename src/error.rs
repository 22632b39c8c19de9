//! Error types for the docxdiag library.

use std::io;
use thiserror::Error;

/// Result type alias for docxdiag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised inside the diagnostic engine.
///
/// These never leave [`crate::analyze_bytes`] or [`crate::analyze_file`]:
/// each component turns them into an [`crate::Issue`] at its boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive could not be opened as a ZIP file.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// A member of the archive failed the integrity test.
    #[error("Corrupted file in archive: {name} ({reason})")]
    CorruptedEntry {
        /// Member name as stored in the central directory
        name: String,
        /// Underlying reader error
        reason: String,
    },

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A byte sequence could not be decoded as text.
    #[error("Invalid {encoding} byte sequence at offset {offset}")]
    Encoding {
        /// Encoding that was being decoded
        encoding: &'static str,
        /// Byte offset of the first invalid sequence
        offset: usize,
    },

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// A report could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encoding {
            encoding: "UTF-8",
            offset: 42,
        };
        assert_eq!(err.to_string(), "Invalid UTF-8 byte sequence at offset 42");

        let err = Error::MissingComponent("word/document.xml".to_string());
        assert_eq!(err.to_string(), "Missing component: word/document.xml");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
