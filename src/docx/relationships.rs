//! Relationship target validation for the main document.

use super::{DOCUMENT_RELS_PART, MAIN_DOCUMENT_PART};
use crate::container::{OoxmlContainer, Relationship, Relationships};
use crate::error::Error;
use crate::model::{Category, Findings, Issue, StatKey};

/// Relationships of a part sorted by target kind.
#[derive(Debug, Default)]
pub struct TargetSummary<'a> {
    pub external: Vec<&'a Relationship>,
    pub broken: Vec<&'a Relationship>,
}

impl TargetSummary<'_> {
    /// Distinct type names of the broken relationships, first-seen order.
    pub fn broken_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for rel in &self.broken {
            let name = rel.type_name();
            if !types.contains(&name) {
                types.push(name);
            }
        }
        types
    }
}

/// Whether an internal target names an existing part.
///
/// Falls back to the raw target without a leading `./` for producers that
/// write package-relative paths.
pub fn target_exists(container: &OoxmlContainer, target: &str) -> bool {
    let resolved = OoxmlContainer::resolve_path(MAIN_DOCUMENT_PART, target);
    container.exists(&resolved) || container.exists(target.trim_start_matches("./"))
}

/// Sort relationships into external and broken internal ones.
pub fn classify<'a>(container: &OoxmlContainer, rels: &'a Relationships) -> TargetSummary<'a> {
    let mut summary = TargetSummary::default();
    for rel in rels.iter() {
        if rel.is_external() {
            summary.external.push(rel);
        } else if !target_exists(container, &rel.target) {
            log::debug!("unresolved relationship {} -> {}", rel.id, rel.target);
            summary.broken.push(rel);
        }
    }
    summary
}

/// Validate `word/_rels/document.xml.rels`.
pub fn check_relationships(container: &OoxmlContainer) -> Findings {
    let mut findings = Findings::new();

    if !container.exists(DOCUMENT_RELS_PART) {
        findings.push(
            Issue::warning(Category::Relationships, "Document relationships file not found")
                .with_location(DOCUMENT_RELS_PART),
        );
        return findings;
    }

    let rels = match container.read_relationships(MAIN_DOCUMENT_PART) {
        Ok(rels) => rels,
        Err(Error::XmlParse(message)) => {
            findings.push(Issue::error(
                Category::Relationships,
                format!("Failed to parse relationships: {}", message),
            ));
            return findings;
        }
        Err(err) => {
            findings.push(Issue::warning(
                Category::Relationships,
                format!("Error checking relationships: {}", err),
            ));
            return findings;
        }
    };
    findings.stat(StatKey::Relationships, rels.len());

    let summary = classify(container, &rels);
    findings.stat(StatKey::BrokenReferences, summary.broken.len());

    if !summary.broken.is_empty() {
        findings.push(
            Issue::warning(
                Category::BrokenReferences,
                format!(
                    "Found {} broken internal reference(s)",
                    summary.broken.len()
                ),
            )
            .with_location(format!("Types: {}", summary.broken_types().join(", ")))
            .with_suggestion(
                "Some referenced files are missing. Document may have been edited externally.",
            ),
        );
    }

    if !summary.external.is_empty() {
        findings.stat(StatKey::ExternalRefs, summary.external.len());
        findings.push(Issue::info(
            Category::ExternalReferences,
            format!(
                "Document contains {} external reference(s) (URLs)",
                summary.external.len()
            ),
        ));
    }

    findings
}
