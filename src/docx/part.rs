//! Decoding, invalid character scanning and parsing of one XML part.

use crate::container::decode_xml_bytes;
use crate::error::Error;
use crate::model::{Category, Findings, Issue};
use crate::options::AnalyzeOptions;
use crate::xml::{parse_xml, XmlElement};

/// Codepoint ranges (inclusive) that must not appear in part text.
pub const INVALID_CHAR_RANGES: &[(u32, u32)] = &[
    (0x00, 0x08),
    (0x0B, 0x0C),
    (0x0E, 0x1F),
    (0x7F, 0x7F),
    (0xFFFE, 0xFFFF),
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Characters of context kept on each side of an occurrence.
const CONTEXT_RADIUS: usize = 20;

/// Whether a codepoint falls in one of [`INVALID_CHAR_RANGES`].
pub fn is_invalid_char(c: char) -> bool {
    let code = c as u32;
    INVALID_CHAR_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&code))
}

/// One flagged codepoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidChar {
    /// Lower-case hex code, e.g. `0xb`
    pub code: String,
    /// Character offset in the decoded text
    pub position: usize,
    /// 1-based line number
    pub line: usize,
    /// Surrounding text with `\n` and `\r` escaped
    pub context: String,
}

/// Find every invalid codepoint in `text`, in order.
pub fn scan_invalid_chars(text: &str) -> Vec<InvalidChar> {
    let mut hits = Vec::new();
    let mut line = 1;
    for (position, c) in text.chars().enumerate() {
        if is_invalid_char(c) {
            hits.push((position, line, c));
        }
        if c == '\n' {
            line += 1;
        }
    }

    if hits.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    hits.into_iter()
        .map(|(position, line, c)| {
            let start = position.saturating_sub(CONTEXT_RADIUS);
            let end = (position + CONTEXT_RADIUS).min(chars.len());
            let context: String = chars[start..end].iter().collect();
            InvalidChar {
                code: format!("{:#x}", c as u32),
                position,
                line,
                context: context.replace('\n', "\\n").replace('\r', "\\r"),
            }
        })
        .collect()
}

/// Turn scan results into the aggregate issue plus optional details.
pub fn invalid_char_findings(
    part_name: &str,
    found: &[InvalidChar],
    options: &AnalyzeOptions,
) -> Findings {
    let mut findings = Findings::new();
    let Some(first) = found.first() else {
        return findings;
    };

    // Grouped by code, first-seen order.
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in found {
        match counts.iter_mut().find(|(code, _)| *code == item.code) {
            Some((_, count)) => *count += 1,
            None => counts.push((item.code.as_str(), 1)),
        }
    }
    let summary = counts
        .iter()
        .map(|(code, count)| format!("{}: {}x", code, count))
        .collect::<Vec<_>>()
        .join(", ");

    findings.push(
        Issue::error(
            Category::InvalidCharacters,
            format!(
                "Found {} invalid XML character(s) in {}",
                found.len(),
                part_name
            ),
        )
        .with_location(format!("Characters found: {}", summary))
        .with_context(first.context.clone())
        .with_suggestion(
            "Remove control characters. These often come from copy/paste operations.",
        ),
    );

    if options.verbose {
        for item in found.iter().take(options.max_character_details) {
            findings.push(
                Issue::info(
                    Category::InvalidCharacterDetail,
                    format!(
                        "Character {} at line {}, position {}",
                        item.code, item.line, item.position
                    ),
                )
                .with_context(item.context.clone()),
            );
        }
    }

    findings
}

/// How far analysis of a part got.
#[derive(Debug)]
pub enum PartOutcome {
    /// Parsed; the root element is ready for semantic checks.
    Parsed(XmlElement),
    /// The bytes could not be decoded; no parse was attempted.
    Undecodable,
    /// Decoded but not well-formed XML.
    Malformed,
}

/// Findings for one part plus its outcome.
#[derive(Debug)]
pub struct PartAnalysis {
    pub findings: Findings,
    pub outcome: PartOutcome,
}

/// Decode, scan and parse the bytes of an XML part.
pub fn analyze_part(part_name: &str, bytes: &[u8], options: &AnalyzeOptions) -> PartAnalysis {
    let text = match decode_xml_bytes(bytes) {
        Ok(text) => text,
        Err(err) => {
            log::debug!("{}: {}", part_name, err);
            let (encoding, offset) = match err {
                Error::Encoding { encoding, offset } => (encoding, offset),
                _ => ("UTF-8", 0),
            };
            return PartAnalysis {
                findings: Findings::from_issue(
                    Issue::error(
                        Category::Encoding,
                        format!("Invalid {} encoding in {}", encoding, part_name),
                    )
                    .with_location(format!("Byte position: {}", offset))
                    .with_suggestion(
                        "Document contains invalid byte sequences. May need manual repair.",
                    ),
                ),
                outcome: PartOutcome::Undecodable,
            };
        }
    };

    // A UTF-8 byte order mark counts as character 0 of the part.
    let found = if bytes.starts_with(UTF8_BOM) {
        scan_invalid_chars(&format!("\u{feff}{}", text))
    } else {
        scan_invalid_chars(&text)
    };
    let mut findings = invalid_char_findings(part_name, &found, options);

    let outcome = match parse_xml(&text) {
        Ok(root) => PartOutcome::Parsed(root),
        Err(err) => {
            findings.push(
                Issue::error(
                    Category::XmlParsing,
                    format!("Failed to parse {}: {}", short_name(part_name), reason(&err)),
                )
                .with_location(part_name)
                .with_suggestion(
                    "Document XML is malformed. Check for invalid characters or corrupted content.",
                ),
            );
            PartOutcome::Malformed
        }
    };

    PartAnalysis { findings, outcome }
}

fn short_name(part_name: &str) -> &str {
    part_name.rsplit('/').next().unwrap_or(part_name)
}

fn reason(err: &Error) -> String {
    match err {
        Error::XmlParse(message) => message.clone(),
        other => other.to_string(),
    }
}
