//! Synthetic DOCX packages for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Wrap body XML in a `w:document` with the usual prefixes bound.
pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}" xmlns:r="{}" xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math">
  <w:body>{}</w:body>
</w:document>"#,
        W_NS, R_NS, body
    )
}

/// One relationship entry for [`DocxBuilder::relationship`].
pub struct Rel {
    pub id: String,
    pub kind: String,
    pub target: String,
    pub external: bool,
}

/// Builds a DOCX package part by part.
///
/// Starts as a minimal valid package with styles, numbering and settings
/// so that a default build produces no findings.
pub struct DocxBuilder {
    parts: Vec<(String, Vec<u8>)>,
    rels: Vec<Rel>,
    write_rels: bool,
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxBuilder {
    pub fn new() -> Self {
        let empty_part = |root: &str| format!(r#"<w:{} xmlns:w="{}"/>"#, root, W_NS).into_bytes();
        Self {
            parts: vec![
                ("[Content_Types].xml".to_string(), CONTENT_TYPES.as_bytes().to_vec()),
                ("_rels/.rels".to_string(), PACKAGE_RELS.as_bytes().to_vec()),
                ("word/document.xml".to_string(), document_xml("<w:p/>").into_bytes()),
                ("word/styles.xml".to_string(), empty_part("styles")),
                ("word/numbering.xml".to_string(), empty_part("numbering")),
                ("word/settings.xml".to_string(), empty_part("settings")),
            ],
            rels: Vec::new(),
            write_rels: true,
        }
    }

    /// Replace or add a part.
    pub fn part(mut self, name: &str, data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = data,
            None => self.parts.push((name.to_string(), data)),
        }
        self
    }

    /// Remove a part.
    pub fn without(mut self, name: &str) -> Self {
        self.parts.retain(|(n, _)| n != name);
        if name == "word/_rels/document.xml.rels" {
            self.write_rels = false;
        }
        self
    }

    /// Set the body of the main document.
    pub fn body(self, body: &str) -> Self {
        self.part("word/document.xml", document_xml(body))
    }

    /// Add a document relationship. `kind` is the last segment of the type URI.
    pub fn relationship(mut self, id: &str, kind: &str, target: &str, external: bool) -> Self {
        self.rels.push(Rel {
            id: id.to_string(),
            kind: kind.to_string(),
            target: target.to_string(),
            external,
        });
        self
    }

    fn rels_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.rels {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}/{}" Target="{}"{}/>"#,
                rel.id,
                R_NS,
                rel.kind,
                rel.target,
                if rel.external { r#" TargetMode="External""# } else { "" }
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    pub fn build(self) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

            let has_rels_part = self
                .parts
                .iter()
                .any(|(n, _)| n == "word/_rels/document.xml.rels");
            for (name, data) in &self.parts {
                zip.start_file(name.as_str(), options).unwrap();
                zip.write_all(data).unwrap();
            }
            if self.write_rels && !has_rels_part {
                zip.start_file("word/_rels/document.xml.rels", options).unwrap();
                zip.write_all(self.rels_xml().as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }
}

/// Byte offset of the first local file header signature after `from`.
pub fn local_header_offset(data: &[u8], from: usize) -> Option<usize> {
    data[from..]
        .windows(4)
        .position(|w| w == b"PK\x03\x04")
        .map(|p| p + from)
}
