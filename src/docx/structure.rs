//! Presence checks for required and optional package parts.

use super::{CONTENT_TYPES_PART, MAIN_DOCUMENT_PART, PACKAGE_RELS_PART};
use crate::container::OoxmlContainer;
use crate::model::{Category, Findings, Issue};

/// Parts without which the package is not a usable DOCX.
pub const REQUIRED_PARTS: &[&str] = &[CONTENT_TYPES_PART, PACKAGE_RELS_PART, MAIN_DOCUMENT_PART];

/// Optional parts and the consequence of their absence.
pub const OPTIONAL_PARTS: &[(&str, &str)] = &[
    (
        "word/styles.xml",
        "Style definitions missing - default styles will be used",
    ),
    (
        "word/numbering.xml",
        "Numbering definitions missing - lists may not render correctly",
    ),
    (
        "word/settings.xml",
        "Settings missing - document settings may be lost",
    ),
];

/// Report missing required parts (errors) and optional parts (info).
///
/// Every part is checked; nothing here stops the pipeline.
pub fn check_structure(container: &OoxmlContainer) -> Findings {
    let mut findings = Findings::new();

    for part in REQUIRED_PARTS {
        if !container.exists(part) {
            findings.push(
                Issue::error(
                    Category::DocxStructure,
                    format!("Missing required file: {}", part),
                )
                .with_suggestion("Document structure is incomplete. May be corrupted."),
            );
        }
    }

    for (part, consequence) in OPTIONAL_PARTS {
        if !container.exists(part) {
            findings.push(Issue::info(Category::DocxStructure, *consequence).with_location(*part));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn container_with(names: &[&str]) -> OoxmlContainer {
        let mut buffer = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
            for name in names {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(b"<x/>").unwrap();
            }
            zip.finish().unwrap();
        }
        OoxmlContainer::from_bytes(buffer).unwrap()
    }

    #[test]
    fn test_complete_package_has_no_findings() {
        let container = container_with(&[
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/numbering.xml",
            "word/settings.xml",
        ]);
        assert!(check_structure(&container).issues.is_empty());
    }

    #[test]
    fn test_each_missing_required_part_reported() {
        let container = container_with(&["word/styles.xml"]);
        let findings = check_structure(&container);

        let errors: Vec<_> = findings
            .issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
            .map(|i| i.message().to_string())
            .collect();
        assert_eq!(
            errors,
            vec![
                "Missing required file: [Content_Types].xml",
                "Missing required file: _rels/.rels",
                "Missing required file: word/document.xml",
            ]
        );
    }

    #[test]
    fn test_missing_optional_parts_are_info() {
        let container = container_with(&["[Content_Types].xml", "_rels/.rels", "word/document.xml"]);
        let findings = check_structure(&container);

        assert_eq!(findings.issues.len(), 3);
        assert!(findings
            .issues
            .iter()
            .all(|i| i.severity() == Severity::Info && i.category() == Category::DocxStructure));
        assert_eq!(findings.issues[0].location(), Some("word/styles.xml"));
        assert!(findings.issues[0]
            .message()
            .contains("default styles will be used"));
    }
}
