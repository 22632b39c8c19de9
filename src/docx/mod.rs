//! DOCX package checks.
//!
//! Each submodule is one component of the diagnostic pipeline and returns
//! its findings as data; [`crate::diagnostic`] folds them into a report.

pub mod checks;
pub mod embedded;
pub mod part;
pub mod relationships;
pub mod structure;

/// WordprocessingML main namespace.
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Office document relationships namespace (`r:` attributes).
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// VML office namespace.
pub const O_NS: &str = "urn:schemas-microsoft-com:office:office";
/// Office Math Markup Language namespace.
pub const M_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";
pub const WP_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
/// `[Content_Types].xml` namespace.
pub const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
/// Package relationships (.rels) namespace.
pub const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Namespaces that are not reported as custom.
pub const KNOWN_NAMESPACES: &[&str] = &[
    W_NS, R_NS, O_NS, M_NS, WP_NS, A_NS, PIC_NS, CT_NS, REL_NS,
];

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const EMBEDDINGS_DIR: &str = "word/embeddings/";
pub const MEDIA_DIR: &str = "word/media/";
