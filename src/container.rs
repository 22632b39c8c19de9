//! ZIP container abstraction for OOXML packages.

use crate::docx::REL_NS;
use crate::error::{Error, Result};
use crate::xml::parse_xml;
use std::cell::RefCell;
use std::io::{self, Cursor, Read};

/// A relationship entry from a .rels part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute) or URL
    pub target: String,
    /// Whether TargetMode is "External"
    pub external: bool,
}

impl Relationship {
    /// Short type name: the last segment of the type URI, or "unknown".
    pub fn type_name(&self) -> &str {
        match self.rel_type.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => "unknown",
        }
    }

    /// Whether the target addresses something outside the package.
    pub fn is_external(&self) -> bool {
        self.external || has_url_scheme(&self.target)
    }
}

/// Whether `target` starts with a URL scheme such as `http:` or `mailto:`.
///
/// Single-letter schemes are rejected so Windows drive letters stay paths.
pub fn has_url_scheme(target: &str) -> bool {
    let Some((scheme, _)) = target.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    scheme.len() >= 2
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Relationships parsed from a .rels part, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the XML text of a .rels part.
    ///
    /// Only `Relationship` elements in the package relationships namespace
    /// are taken into account.
    pub fn parse(xml: &str) -> Result<Self> {
        let root = parse_xml(xml)?;
        let mut rels = Relationships::new();

        for element in root.iter().filter(|e| e.is(REL_NS, "Relationship")) {
            let attr = |name: &str| element.attr(None, name).unwrap_or_default().to_string();
            rels.add(Relationship {
                id: attr("Id"),
                rel_type: attr("Type"),
                target: attr("Target"),
                external: element
                    .attr(None, "TargetMode")
                    .is_some_and(|mode| mode.eq_ignore_ascii_case("external")),
            });
        }

        Ok(rels)
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.entries.push(rel);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// After UTF-16 content is decoded into a Rust `String` the declaration
/// still says `encoding="UTF-16"`, which no longer describes the text.
fn fix_xml_encoding_declaration(content: String) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content
}

/// Decode the bytes of an XML part.
///
/// UTF-8 (with or without BOM) and UTF-16 with a BOM are accepted. Unlike a
/// lossy conversion, any invalid sequence is an [`Error::Encoding`] carrying
/// the byte offset of the first bad sequence.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        return decode_utf8(rest, 3);
    }

    if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        let content = decode_utf16(rest, 2, u16::from_le_bytes, "UTF-16LE")?;
        return Ok(fix_xml_encoding_declaration(content));
    }

    if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        let content = decode_utf16(rest, 2, u16::from_be_bytes, "UTF-16BE")?;
        return Ok(fix_xml_encoding_declaration(content));
    }

    decode_utf8(bytes, 0)
}

fn decode_utf8(bytes: &[u8], base: usize) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::Encoding {
            encoding: "UTF-8",
            offset: base + e.valid_up_to(),
        })
}

fn decode_utf16(
    bytes: &[u8],
    base: usize,
    to_unit: fn([u8; 2]) -> u16,
    encoding: &'static str,
) -> Result<String> {
    let mut text = String::with_capacity(bytes.len() / 2);
    let mut offset = base;
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));

    for decoded in char::decode_utf16(units) {
        match decoded {
            Ok(c) => {
                text.push(c);
                offset += c.len_utf16() * 2;
            }
            Err(_) => return Err(Error::Encoding { encoding, offset }),
        }
    }

    // Odd trailing byte
    if bytes.len() % 2 != 0 {
        return Err(Error::Encoding {
            encoding,
            offset: base + bytes.len() - 1,
        });
    }

    Ok(text)
}

/// Normalize a part path: unify separators, resolve `.` and `..`.
///
/// `..` segments that would climb above the package root are kept, so
/// such a path never matches a part name.
pub fn normalize_part_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// OOXML package over a ZIP archive.
///
/// Owns the archive bytes for the duration of one analysis run; dropping
/// it releases the archive.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
    names: Vec<String>,
}

impl OoxmlContainer {
    /// Create an OOXML container from a byte vector.
    ///
    /// Only the central directory is read here; see
    /// [`verify_integrity`](Self::verify_integrity) for member checks.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = zip::ZipArchive::new(cursor)?;
        let names = archive.file_names().map(String::from).collect();
        Ok(Self {
            archive: RefCell::new(archive),
            names,
        })
    }

    /// Read every member through decompression and CRC verification.
    ///
    /// Fails with [`Error::CorruptedEntry`] naming the first bad member.
    pub fn verify_integrity(&self) -> Result<()> {
        let mut archive = self.archive.borrow_mut();
        for index in 0..archive.len() {
            let name = self
                .names
                .get(index)
                .map(String::as_str)
                .unwrap_or("<unnamed>")
                .to_string();
            let mut entry = archive.by_index(index).map_err(|e| Error::CorruptedEntry {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            io::copy(&mut entry, &mut io::sink()).map_err(|e| Error::CorruptedEntry {
                name,
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Read a part from the archive as raw bytes.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read an XML part from the archive as text.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        self.names.iter().any(|n| n == path)
    }

    /// Part names matching a prefix.
    pub fn list_files_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(move |n| n.starts_with(prefix))
    }

    /// Number of members in the archive.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Path of the .rels part that belongs to `part_path`.
    ///
    /// The package itself (empty path or `/`) maps to `_rels/.rels`.
    pub fn rels_path_for(part_path: &str) -> String {
        let part_path = part_path.trim_start_matches('/');
        if part_path.is_empty() {
            return "_rels/.rels".to_string();
        }
        match part_path.rsplit_once('/') {
            Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
            None => format!("_rels/{}.rels", part_path),
        }
    }

    /// Read and parse the relationships of a part.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let xml = self.read_xml(&Self::rels_path_for(part_path))?;
        Relationships::parse(&xml)
    }

    /// Resolve a relationship target against the part that owns it.
    ///
    /// A leading `/` is root-relative; anything else is relative to the
    /// directory of `base_part`.
    pub fn resolve_path(base_part: &str, target: &str) -> String {
        if let Some(stripped) = target.strip_prefix('/') {
            return normalize_part_path(stripped);
        }

        let base_dir = base_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        if base_dir.is_empty() {
            normalize_part_path(target)
        } else {
            normalize_part_path(&format!("{}/{}", base_dir, target))
        }
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.names.len())
            .finish()
    }
}
