//! Semantic checks over the parsed main document.
//!
//! Every check is independent: it receives the root element, returns its
//! findings, and a failing check is turned into a single `Analysis` error
//! by [`run_checks`] without affecting the others.

use super::{KNOWN_NAMESPACES, M_NS, R_NS, W_NS};
use crate::error::Result;
use crate::model::{Category, Findings, Issue, StatKey, TrackedChangeCounts};
use crate::options::AnalyzeOptions;
use crate::xml::XmlElement;

/// Signature shared by all semantic checks.
pub type CheckFn = fn(&XmlElement, &AnalyzeOptions) -> Result<Findings>;

/// A named semantic check.
#[derive(Clone, Copy)]
pub struct SemanticCheck {
    pub name: &'static str,
    pub run: CheckFn,
}

impl std::fmt::Debug for SemanticCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticCheck").field("name", &self.name).finish()
    }
}

/// The checks run on every main document, in order.
pub const SEMANTIC_CHECKS: &[SemanticCheck] = &[
    SemanticCheck {
        name: "tracked changes",
        run: check_tracked_changes,
    },
    SemanticCheck {
        name: "smart tags",
        run: check_smart_tags,
    },
    SemanticCheck {
        name: "content controls",
        run: check_content_controls,
    },
    SemanticCheck {
        name: "field codes",
        run: check_field_codes,
    },
    SemanticCheck {
        name: "equations",
        run: check_equations,
    },
    SemanticCheck {
        name: "hyperlinks",
        run: check_hyperlinks,
    },
    SemanticCheck {
        name: "custom namespaces",
        run: check_namespaces,
    },
];

/// Run `checks` in order, isolating failures.
pub fn run_checks(root: &XmlElement, checks: &[SemanticCheck], options: &AnalyzeOptions) -> Findings {
    let mut findings = Findings::new();
    for check in checks {
        match (check.run)(root, options) {
            Ok(result) => {
                findings.issues.extend(result.issues);
                findings.stats.extend(result.stats);
            }
            Err(err) => {
                log::warn!("{} check failed: {}", check.name, err);
                findings.push(Issue::error(
                    Category::Analysis,
                    format!("Error running {} check: {}", check.name, err),
                ));
            }
        }
    }
    findings
}

fn count(root: &XmlElement, namespace: &str, local_name: &str) -> usize {
    root.find_all(namespace, local_name).count()
}

/// Insertions, deletions and property changes.
pub fn check_tracked_changes(root: &XmlElement, options: &AnalyzeOptions) -> Result<Findings> {
    let mut findings = Findings::new();

    let counts = TrackedChangeCounts::new(
        count(root, W_NS, "ins"),
        count(root, W_NS, "del"),
        count(root, W_NS, "pPrChange"),
        count(root, W_NS, "rPrChange"),
    );
    findings.stat(StatKey::TrackedChanges, counts);

    if counts.total == 0 {
        return Ok(findings);
    }

    let message = format!("Document contains {} tracked change(s)", counts.total);
    let issue = if counts.total < options.tracked_changes_error_threshold {
        Issue::warning(Category::TrackedChanges, message)
    } else {
        Issue::error(Category::TrackedChanges, message)
    };
    findings.push(
        issue
            .with_location(format!(
                "Insertions: {}, Deletions: {}, Paragraph changes: {}, Run changes: {}",
                counts.insertions, counts.deletions, counts.paragraph_changes, counts.run_changes
            ))
            .with_suggestion(
                "Accept or reject all tracked changes before processing to avoid issues.",
            ),
    );

    let nested = root
        .find_all(W_NS, "ins")
        .any(|ins| ins.find_all(W_NS, "del").next().is_some());
    if nested {
        findings.push(
            Issue::warning(
                Category::NestedRevisions,
                "Found deletions nested inside insertions (complex revision structure)",
            )
            .with_suggestion("This can cause processing issues. Accept all changes in Word first."),
        );
    }

    Ok(findings)
}

/// Deprecated smart tags.
pub fn check_smart_tags(root: &XmlElement, _options: &AnalyzeOptions) -> Result<Findings> {
    let mut findings = Findings::new();
    let smart_tags = count(root, W_NS, "smartTag");
    findings.stat(StatKey::SmartTags, smart_tags);

    if smart_tags > 0 {
        findings.push(
            Issue::warning(
                Category::SmartTags,
                format!("Document contains {} deprecated smart tag(s)", smart_tags),
            )
            .with_suggestion(
                "Smart tags are deprecated and may cause processing issues. \
                 Open in Word and save to remove them.",
            ),
        );
    }

    Ok(findings)
}

/// `w:lock` values that count as locked.
pub const LOCKED_STATES: &[&str] = &["sdtLocked", "contentLocked", "sdtContentLocked"];

fn is_locked(sdt: &XmlElement) -> bool {
    sdt.child(W_NS, "sdtPr")
        .and_then(|pr| pr.child(W_NS, "lock"))
        .and_then(|lock| lock.attr(Some(W_NS), "val"))
        .is_some_and(|val| LOCKED_STATES.contains(&val))
}

/// Structured document tags, locked or not.
pub fn check_content_controls(root: &XmlElement, _options: &AnalyzeOptions) -> Result<Findings> {
    let mut findings = Findings::new();

    let (total, locked) = root
        .find_all(W_NS, "sdt")
        .fold((0, 0), |(total, locked), sdt| {
            (total + 1, locked + usize::from(is_locked(sdt)))
        });
    findings.stat(StatKey::ContentControls, total);
    findings.stat(StatKey::LockedContentControls, locked);

    if locked > 0 {
        findings.push(
            Issue::warning(
                Category::ContentControls,
                format!("Document contains {} locked content control(s)", locked),
            )
            .with_location(format!("Total content controls: {}", total))
            .with_suggestion(
                "Locked content controls may prevent editing. Unlock them in Word if needed.",
            ),
        );
    } else if total > 0 {
        findings.push(Issue::info(
            Category::ContentControls,
            format!("Document contains {} content control(s)", total),
        ));
    }

    Ok(findings)
}

/// Field instruction markers and their labels.
///
/// Checked in order against the upper-cased instruction; the first match
/// wins, so `PAGEREF _Ref1` is a cross-reference while `PAGEREF _Toc1`
/// counts as a table of contents entry.
pub const FIELD_TYPE_MARKERS: &[(&[&str], &str)] = &[
    (&["TOC"], "Table of Contents"),
    (&["REF"], "Cross-reference"),
    (&["HYPERLINK"], "Hyperlink"),
    (&["MERGEFIELD"], "Mail Merge"),
    (&["PAGE"], "Page Number"),
    (&["DATE", "TIME"], "Date/Time"),
];

/// Label for a field instruction, if any marker matches.
pub fn classify_field(instruction: &str) -> Option<&'static str> {
    let upper = instruction.to_uppercase();
    FIELD_TYPE_MARKERS
        .iter()
        .find(|(markers, _)| markers.iter().any(|m| upper.contains(m)))
        .map(|(_, label)| *label)
}

/// Complex field characters and instructions.
pub fn check_field_codes(root: &XmlElement, _options: &AnalyzeOptions) -> Result<Findings> {
    let mut findings = Findings::new();

    let field_chars = count(root, W_NS, "fldChar");
    findings.stat(StatKey::FieldCodes, field_chars);

    let mut instructions = 0;
    let mut types: Vec<&'static str> = Vec::new();
    for instr in root.find_all(W_NS, "instrText") {
        instructions += 1;
        if let Some(label) = classify_field(&instr.text()) {
            if !types.contains(&label) {
                types.push(label);
            }
        }
    }

    if field_chars > 0 || instructions > 0 {
        let types = if types.is_empty() {
            "Unknown".to_string()
        } else {
            types.join(", ")
        };
        findings.push(
            Issue::info(
                Category::FieldCodes,
                format!(
                    "Document contains {} field code(s) ({} instruction(s))",
                    field_chars, instructions
                ),
            )
            .with_location(format!("Types found: {}", types))
            .with_suggestion("Field codes may need to be updated or unlinked before processing."),
        );
    }

    Ok(findings)
}

/// OMML equations.
pub fn check_equations(root: &XmlElement, _options: &AnalyzeOptions) -> Result<Findings> {
    let mut findings = Findings::new();
    let equations = count(root, M_NS, "oMath") + count(root, M_NS, "oMathPara");
    findings.stat(StatKey::Equations, equations);

    if equations > 0 {
        findings.push(
            Issue::info(
                Category::Equations,
                format!("Document contains {} equation(s)", equations),
            )
            .with_suggestion(
                "Equations (OMML) may cause processing issues. \
                 Consider converting to images if problems occur.",
            ),
        );
    }

    Ok(findings)
}

/// Target reference of a `w:hyperlink` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperlinkRef {
    /// `r:id`, pointing into the document relationships
    pub relationship_id: Option<String>,
    /// `w:anchor`, pointing at a bookmark
    pub anchor: Option<String>,
}

impl HyperlinkRef {
    /// A hyperlink with neither a relationship nor an anchor goes nowhere.
    pub fn is_broken(&self) -> bool {
        self.relationship_id.is_none() && self.anchor.is_none()
    }
}

/// All hyperlinks of a document, in document order.
///
/// Empty attribute values are treated as absent.
pub fn hyperlinks(root: &XmlElement) -> Vec<HyperlinkRef> {
    let non_empty = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(String::from);
    root.find_all(W_NS, "hyperlink")
        .map(|link| HyperlinkRef {
            relationship_id: non_empty(link.attr(Some(R_NS), "id")),
            anchor: non_empty(link.attr(Some(W_NS), "anchor")),
        })
        .collect()
}

/// Hyperlinks without a target.
pub fn check_hyperlinks(root: &XmlElement, _options: &AnalyzeOptions) -> Result<Findings> {
    let mut findings = Findings::new();

    let links = hyperlinks(root);
    let broken = links.iter().filter(|l| l.is_broken()).count();
    findings.stat(StatKey::Hyperlinks, links.len());
    findings.stat(StatKey::BrokenHyperlinks, broken);

    if broken > 0 {
        findings.push(
            Issue::warning(
                Category::Hyperlinks,
                format!("Found {} hyperlink(s) without target reference", broken),
            )
            .with_suggestion("Some hyperlinks may be broken. Check document relationships."),
        );
    } else if !links.is_empty() {
        findings.push(Issue::info(
            Category::Hyperlinks,
            format!("Document contains {} hyperlink(s)", links.len()),
        ));
    }

    Ok(findings)
}

/// Element namespaces not in [`KNOWN_NAMESPACES`], in first-seen order.
pub fn custom_namespaces(root: &XmlElement) -> Vec<&str> {
    let mut custom: Vec<&str> = Vec::new();
    for element in root.iter() {
        if let Some(ns) = element.namespace.as_deref() {
            if !KNOWN_NAMESPACES.contains(&ns) && !custom.contains(&ns) {
                custom.push(ns);
            }
        }
    }
    custom
}

/// Namespaces outside the core OOXML set.
pub fn check_namespaces(root: &XmlElement, _options: &AnalyzeOptions) -> Result<Findings> {
    let mut findings = Findings::new();

    let custom = custom_namespaces(root);
    findings.stat(StatKey::CustomNamespaces, custom.len());

    if !custom.is_empty() {
        let mut listed = custom.iter().take(3).copied().collect::<Vec<_>>().join(", ");
        if custom.len() > 3 {
            listed.push_str("...");
        }
        findings.push(
            Issue::info(
                Category::CustomNamespaces,
                format!("Document contains {} custom namespace(s)", custom.len()),
            )
            .with_location(listed)
            .with_suggestion(
                "Custom namespaces may indicate third-party extensions that could cause issues.",
            ),
        );
    }

    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{Severity, StatValue};
    use crate::xml::parse_xml;

    fn doc(body: &str) -> XmlElement {
        parse_xml(&format!(
            r#"<w:document xmlns:w="{}" xmlns:r="{}" xmlns:m="{}"><w:body>{}</w:body></w:document>"#,
            W_NS, R_NS, M_NS, body
        ))
        .unwrap()
    }

    fn run(check: CheckFn, body: &str) -> Findings {
        check(&doc(body), &AnalyzeOptions::default()).unwrap()
    }

    fn stat(findings: &Findings, key: StatKey) -> Option<StatValue> {
        findings
            .stats
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    #[test]
    fn test_tracked_changes_warning() {
        let findings = run(
            check_tracked_changes,
            "<w:ins/><w:ins/><w:del/><w:pPrChange/><w:rPrChange/>",
        );

        assert_eq!(
            stat(&findings, StatKey::TrackedChanges),
            Some(StatValue::TrackedChanges(TrackedChangeCounts::new(2, 1, 1, 1)))
        );
        assert_eq!(findings.issues.len(), 1);
        assert_eq!(findings.issues[0].severity(), Severity::Warning);
        assert_eq!(
            findings.issues[0].location(),
            Some("Insertions: 2, Deletions: 1, Paragraph changes: 1, Run changes: 1")
        );
    }

    #[test]
    fn test_tracked_changes_threshold() {
        let body = "<w:ins/>".repeat(60) + &"<w:del/>".repeat(40);
        let findings = run(check_tracked_changes, &body);
        assert_eq!(findings.issues[0].severity(), Severity::Error);

        let body = "<w:ins/>".repeat(60) + &"<w:del/>".repeat(39);
        let findings = run(check_tracked_changes, &body);
        assert_eq!(findings.issues[0].severity(), Severity::Warning);
    }

    #[test]
    fn test_tracked_changes_none() {
        let findings = run(check_tracked_changes, "<w:p/>");
        assert!(findings.issues.is_empty());
        assert_eq!(
            stat(&findings, StatKey::TrackedChanges).map(|v| v.total()),
            Some(0)
        );
    }

    #[test]
    fn test_nested_revisions_reported_once() {
        let findings = run(
            check_tracked_changes,
            "<w:ins><w:r><w:del/></w:r></w:ins><w:ins><w:del/></w:ins>",
        );
        let nested = findings
            .issues
            .iter()
            .filter(|i| i.category() == Category::NestedRevisions)
            .count();
        assert_eq!(nested, 1);
    }

    #[test]
    fn test_sibling_deletion_is_not_nested() {
        let findings = run(check_tracked_changes, "<w:ins/><w:del/>");
        assert!(findings
            .issues
            .iter()
            .all(|i| i.category() != Category::NestedRevisions));
    }

    #[test]
    fn test_smart_tags() {
        let findings = run(check_smart_tags, "<w:smartTag/><w:p><w:smartTag/></w:p>");
        assert_eq!(stat(&findings, StatKey::SmartTags), Some(StatValue::Count(2)));
        assert_eq!(findings.issues[0].severity(), Severity::Warning);
    }

    #[test]
    fn test_content_controls_locked() {
        let findings = run(
            check_content_controls,
            r#"<w:sdt><w:sdtPr><w:lock w:val="sdtContentLocked"/></w:sdtPr></w:sdt>
               <w:sdt><w:sdtPr><w:lock w:val="unlocked"/></w:sdtPr></w:sdt>
               <w:sdt/>"#,
        );
        assert_eq!(stat(&findings, StatKey::ContentControls), Some(StatValue::Count(3)));
        assert_eq!(findings.issues.len(), 1);
        assert_eq!(findings.issues[0].severity(), Severity::Warning);
        assert_eq!(
            findings.issues[0].message(),
            "Document contains 1 locked content control(s)"
        );
    }

    #[test]
    fn test_content_controls_unlocked_only() {
        let findings = run(check_content_controls, "<w:sdt/><w:sdt/>");
        assert_eq!(findings.issues[0].severity(), Severity::Info);
        assert_eq!(
            findings.issues[0].message(),
            "Document contains 2 content control(s)"
        );
    }

    #[test]
    fn test_lock_must_be_direct_property() {
        // A lock deep inside the content belongs to a nested control, not this one.
        let findings = run(
            check_content_controls,
            r#"<w:sdt><w:sdtContent><w:p><w:lock w:val="sdtLocked"/></w:p></w:sdtContent></w:sdt>"#,
        );
        assert_eq!(findings.issues[0].severity(), Severity::Info);
    }

    #[test]
    fn test_classify_field_order() {
        assert_eq!(classify_field(" TOC \\o \"1-3\" "), Some("Table of Contents"));
        assert_eq!(classify_field(" PAGEREF _Ref123 \\h "), Some("Cross-reference"));
        assert_eq!(classify_field(" HYPERLINK \"http://x\" "), Some("Hyperlink"));
        assert_eq!(classify_field(" MERGEFIELD Name "), Some("Mail Merge"));
        assert_eq!(classify_field(" page "), Some("Page Number"));
        assert_eq!(classify_field(" TIME \\@ \"HH:mm\" "), Some("Date/Time"));
        assert_eq!(classify_field(" AUTHOR "), None);
    }

    #[test]
    fn test_classify_field_toc_bookmark_wins() {
        // Bookmarks generated for a TOC carry the marker in their name.
        assert_eq!(classify_field(" PAGEREF _Toc1 \\h "), Some("Table of Contents"));
    }

    #[test]
    fn test_field_codes_types_deduplicated() {
        let findings = run(
            check_field_codes,
            r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>
               <w:r><w:instrText> PAGE </w:instrText></w:r>
               <w:r><w:fldChar w:fldCharType="end"/></w:r>
               <w:r><w:instrText> PAGE </w:instrText></w:r>
               <w:r><w:instrText> TOC </w:instrText></w:r>"#,
        );
        assert_eq!(stat(&findings, StatKey::FieldCodes), Some(StatValue::Count(2)));
        assert_eq!(
            findings.issues[0].location(),
            Some("Types found: Page Number, Table of Contents")
        );
    }

    #[test]
    fn test_field_codes_unknown_type() {
        let findings = run(check_field_codes, "<w:fldChar/><w:instrText> AUTHOR </w:instrText>");
        assert_eq!(findings.issues[0].location(), Some("Types found: Unknown"));
    }

    #[test]
    fn test_equations_summed() {
        let findings = run(check_equations, "<m:oMathPara><m:oMath/></m:oMathPara><m:oMath/>");
        assert_eq!(stat(&findings, StatKey::Equations), Some(StatValue::Count(3)));
        assert_eq!(findings.issues[0].severity(), Severity::Info);
    }

    #[test]
    fn test_hyperlinks_one_broken() {
        let findings = run(
            check_hyperlinks,
            r#"<w:hyperlink r:id="rId1"/><w:hyperlink w:anchor="_Toc1"/><w:hyperlink/><w:hyperlink r:id=""/>"#,
        );
        // Empty r:id counts as absent.
        assert_eq!(stat(&findings, StatKey::BrokenHyperlinks), Some(StatValue::Count(2)));
        assert_eq!(stat(&findings, StatKey::Hyperlinks), Some(StatValue::Count(4)));
        assert_eq!(findings.issues[0].severity(), Severity::Warning);
    }

    #[test]
    fn test_hyperlinks_all_resolved() {
        let findings = run(check_hyperlinks, r#"<w:hyperlink r:id="rId1"/>"#);
        assert_eq!(findings.issues[0].severity(), Severity::Info);
        assert_eq!(findings.issues[0].message(), "Document contains 1 hyperlink(s)");
    }

    #[test]
    fn test_hyperlink_refs_exposed() {
        let links = hyperlinks(&doc(r#"<w:hyperlink r:id="rId7" w:anchor="top"/>"#));
        assert_eq!(
            links,
            vec![HyperlinkRef {
                relationship_id: Some("rId7".to_string()),
                anchor: Some("top".to_string()),
            }]
        );
    }

    #[test]
    fn test_custom_namespaces() {
        let root = parse_xml(&format!(
            r#"<w:document xmlns:w="{}" xmlns:a="urn:a" xmlns:b="urn:b" xmlns:c="urn:c" xmlns:d="urn:d" xmlns:unused="urn:unused">
                 <a:x/><b:x/><a:y/><c:x/><d:x/>
               </w:document>"#,
            W_NS
        ))
        .unwrap();

        assert_eq!(custom_namespaces(&root), vec!["urn:a", "urn:b", "urn:c", "urn:d"]);

        let findings = check_namespaces(&root, &AnalyzeOptions::default()).unwrap();
        assert_eq!(findings.issues[0].location(), Some("urn:a, urn:b, urn:c..."));
        assert_eq!(
            findings.issues[0].message(),
            "Document contains 4 custom namespace(s)"
        );
    }

    #[test]
    fn test_known_namespaces_only() {
        let findings = run(check_namespaces, "<w:p/><m:oMath/>");
        assert!(findings.issues.is_empty());
    }

    fn always_fails(_: &XmlElement, _: &AnalyzeOptions) -> Result<Findings> {
        Err(Error::XmlParse("boom".to_string()))
    }

    #[test]
    fn test_failing_check_is_isolated() {
        let checks = [
            SemanticCheck {
                name: "smart tags",
                run: check_smart_tags,
            },
            SemanticCheck {
                name: "exploding",
                run: always_fails,
            },
            SemanticCheck {
                name: "equations",
                run: check_equations,
            },
        ];
        let findings = run_checks(
            &doc("<w:smartTag/><m:oMath/>"),
            &checks,
            &AnalyzeOptions::default(),
        );

        let categories: Vec<_> = findings.issues.iter().map(|i| i.category()).collect();
        assert_eq!(
            categories,
            vec![Category::SmartTags, Category::Analysis, Category::Equations]
        );
        assert!(findings.issues[1].message().contains("exploding"));
        assert_eq!(findings.issues[1].severity(), Severity::Error);
    }
}
