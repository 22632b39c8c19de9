//! Diagnostic issue model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a finding is.
///
/// Ordering follows severity: `Error < Warning < Info`, so sorting
/// ascending puts the most severe findings first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// The document will break the pipeline
    Error,
    /// The document may cause processing problems
    Warning,
    /// Informational finding
    Info,
}

impl Severity {
    /// Returns the upper-case label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue category, one per kind of check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    FileAccess,
    FileSize,
    ZipStructure,
    #[serde(rename = "DOCXStructure")]
    DocxStructure,
    Encoding,
    InvalidCharacters,
    InvalidCharacterDetail,
    #[serde(rename = "XMLParsing")]
    XmlParsing,
    Analysis,
    TrackedChanges,
    NestedRevisions,
    SmartTags,
    ContentControls,
    FieldCodes,
    Equations,
    Hyperlinks,
    CustomNamespaces,
    Relationships,
    BrokenReferences,
    ExternalReferences,
    EmbeddedObjects,
    MediaFiles,
}

impl Category {
    /// Returns the stable identifier, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FileAccess => "FileAccess",
            Category::FileSize => "FileSize",
            Category::ZipStructure => "ZipStructure",
            Category::DocxStructure => "DOCXStructure",
            Category::Encoding => "Encoding",
            Category::InvalidCharacters => "InvalidCharacters",
            Category::InvalidCharacterDetail => "InvalidCharacterDetail",
            Category::XmlParsing => "XMLParsing",
            Category::Analysis => "Analysis",
            Category::TrackedChanges => "TrackedChanges",
            Category::NestedRevisions => "NestedRevisions",
            Category::SmartTags => "SmartTags",
            Category::ContentControls => "ContentControls",
            Category::FieldCodes => "FieldCodes",
            Category::Equations => "Equations",
            Category::Hyperlinks => "Hyperlinks",
            Category::CustomNamespaces => "CustomNamespaces",
            Category::Relationships => "Relationships",
            Category::BrokenReferences => "BrokenReferences",
            Category::ExternalReferences => "ExternalReferences",
            Category::EmbeddedObjects => "EmbeddedObjects",
            Category::MediaFiles => "MediaFiles",
        }
    }

    /// Returns a human-readable label for console output.
    pub fn label(&self) -> &'static str {
        match self {
            Category::FileAccess => "File Access",
            Category::FileSize => "File Size",
            Category::ZipStructure => "ZIP Structure",
            Category::DocxStructure => "DOCX Structure",
            Category::Encoding => "Encoding",
            Category::InvalidCharacters => "Invalid Characters",
            Category::InvalidCharacterDetail => "Invalid Character Detail",
            Category::XmlParsing => "XML Parsing",
            Category::Analysis => "Analysis",
            Category::TrackedChanges => "Tracked Changes",
            Category::NestedRevisions => "Nested Revisions",
            Category::SmartTags => "Smart Tags",
            Category::ContentControls => "Content Controls",
            Category::FieldCodes => "Field Codes",
            Category::Equations => "Equations",
            Category::Hyperlinks => "Hyperlinks",
            Category::CustomNamespaces => "Custom Namespaces",
            Category::Relationships => "Relationships",
            Category::BrokenReferences => "Broken References",
            Category::ExternalReferences => "External References",
            Category::EmbeddedObjects => "Embedded Objects",
            Category::MediaFiles => "Media Files",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single finding.
///
/// Built once with [`Issue::new`] and the `with_*` methods, then handed to
/// a report; there are no setters afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    severity: Severity,
    category: Category,
    message: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    context: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    suggestion: Option<String>,
}

impl Issue {
    /// Create an issue with the mandatory fields.
    pub fn new(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            location: None,
            context: None,
            suggestion: None,
        }
    }

    /// Shorthand for an [`Severity::Error`] issue.
    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    /// Shorthand for a [`Severity::Warning`] issue.
    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    /// Shorthand for an [`Severity::Info`] issue.
    pub fn info(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    /// Attach a location (part name, byte position, breakdown).
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attach a snippet of the offending content.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attach a remediation hint.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_builder() {
        let issue = Issue::warning(Category::SmartTags, "Document contains 2 smart tag(s)")
            .with_suggestion("Open in Word and save to remove them.");

        assert_eq!(issue.severity(), Severity::Warning);
        assert_eq!(issue.category(), Category::SmartTags);
        assert!(issue.location().is_none());
        assert!(issue.suggestion().is_some());
    }

    #[test]
    fn test_issue_serialization_skips_empty_fields() {
        let issue = Issue::error(Category::XmlParsing, "broken");
        let json = serde_json::to_string(&issue).unwrap();
        assert_eq!(
            json,
            r#"{"severity":"ERROR","category":"XMLParsing","message":"broken"}"#
        );
    }

    #[test]
    fn test_severity_ordering() {
        let mut severities = vec![Severity::Info, Severity::Error, Severity::Warning];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Error, Severity::Warning, Severity::Info]
        );
    }

    #[test]
    fn test_category_names() {
        assert_eq!(Category::DocxStructure.as_str(), "DOCXStructure");
        assert_eq!(Category::DocxStructure.to_string(), "DOCX Structure");
        assert_eq!(
            serde_json::to_string(&Category::DocxStructure).unwrap(),
            "\"DOCXStructure\""
        );
    }
}
