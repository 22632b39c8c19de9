//! Embedded object and media enumeration.

use super::{EMBEDDINGS_DIR, MEDIA_DIR};
use crate::container::OoxmlContainer;
use crate::model::{Category, Findings, Issue, StatKey};

/// Whether an embedding is an OLE compound file (`.bin`).
fn is_ole_object(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".bin")
}

/// Member files under `dir`, skipping directory entries.
fn parts_under<'a>(container: &'a OoxmlContainer, dir: &'a str) -> Vec<&'a str> {
    container
        .list_files_with_prefix(dir)
        .filter(|name| !name.ends_with('/'))
        .collect()
}

/// Count embedded objects and media parts.
pub fn scan_embedded(container: &OoxmlContainer) -> Findings {
    let mut findings = Findings::new();

    let embeddings = parts_under(container, EMBEDDINGS_DIR);
    findings.stat(StatKey::EmbeddedObjects, embeddings.len());

    if !embeddings.is_empty() {
        let ole = embeddings.iter().filter(|n| is_ole_object(n)).count();
        findings.push(
            Issue::warning(
                Category::EmbeddedObjects,
                format!("Document contains {} embedded object(s)", embeddings.len()),
            )
            .with_location(format!(
                "OLE objects: {}, Other: {}",
                ole,
                embeddings.len() - ole
            ))
            .with_suggestion(
                "Embedded OLE objects (Excel, PDF, etc.) may cause processing issues. \
                 Consider removing or converting them.",
            ),
        );
    }

    let media = parts_under(container, MEDIA_DIR);
    findings.stat(StatKey::MediaFiles, media.len());

    if !media.is_empty() {
        findings.push(Issue::info(
            Category::MediaFiles,
            format!(
                "Document contains {} media file(s) (images, etc.)",
                media.len()
            ),
        ));
    }

    findings
}
