//! The diagnostic pipeline.
//!
//! One call analyzes one package and always returns a report: every
//! failure along the way is recorded as an issue. Loader failures stop the
//! run early. A main document that is not well-formed XML only skips the
//! semantic checks, and failures of the later checks are isolated.

use crate::container::OoxmlContainer;
use crate::docx::{checks, embedded, part, relationships, structure, MAIN_DOCUMENT_PART};
use crate::error::Error;
use crate::model::{Category, DiagnosticReport, Issue, ReportBuilder, StatKey, StatValue};
use crate::options::AnalyzeOptions;
use std::fs;
use std::path::Path;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Analyze a DOCX file on disk with default options.
///
/// # Example
///
/// ```no_run
/// let report = docxdiag::analyze_file("document.docx");
/// println!("{}: {}", report.file(), report.status());
/// ```
pub fn analyze_file(path: impl AsRef<Path>) -> DiagnosticReport {
    analyze_file_with_options(path, &AnalyzeOptions::default())
}

/// Analyze a DOCX file on disk.
pub fn analyze_file_with_options(path: impl AsRef<Path>, options: &AnalyzeOptions) -> DiagnosticReport {
    let path = path.as_ref();
    let name = path.display().to_string();

    match read_package_file(path) {
        Ok(data) => analyze_bytes_with_options(name, data, options),
        Err(issue) => {
            log::warn!("{}: {}", name, issue.message());
            let mut report = ReportBuilder::new(name);
            report.push(issue);
            report.finish()
        }
    }
}

/// Existence, type and read checks on the filesystem.
fn read_package_file(path: &Path) -> Result<Vec<u8>, Issue> {
    let access_error = |message: String| Issue::error(Category::FileAccess, message);

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(access_error(format!("File not found: {}", path.display())));
        }
        Err(err) => {
            return Err(access_error(format!(
                "Cannot access {}: {}",
                path.display(),
                err
            )));
        }
    };

    if !metadata.is_file() {
        return Err(access_error(format!(
            "Path is not a file: {}",
            path.display()
        )));
    }
    if metadata.len() == 0 {
        return Err(access_error("File is empty (0 bytes)".to_string()));
    }

    fs::read(path).map_err(|err| access_error(format!("Error reading file: {}", err)))
}

/// Analyze an in-memory package with default options.
///
/// `name` is only used as the file identity of the report.
pub fn analyze_bytes(name: impl Into<String>, data: Vec<u8>) -> DiagnosticReport {
    analyze_bytes_with_options(name, data, &AnalyzeOptions::default())
}

/// Analyze an in-memory package.
///
/// # Example
///
/// ```no_run
/// use docxdiag::{analyze_bytes_with_options, AnalyzeOptions};
///
/// let data = std::fs::read("document.docx")?;
/// let options = AnalyzeOptions::default().with_verbose(true);
/// let report = analyze_bytes_with_options("document.docx", data, &options);
/// for issue in report.issues() {
///     println!("[{}] {}", issue.severity(), issue.message());
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn analyze_bytes_with_options(
    name: impl Into<String>,
    data: Vec<u8>,
    options: &AnalyzeOptions,
) -> DiagnosticReport {
    let mut report = ReportBuilder::new(name);
    run_pipeline(&mut report, data, options);
    report.finish()
}

fn run_pipeline(report: &mut ReportBuilder, data: Vec<u8>, options: &AnalyzeOptions) {
    let size = data.len() as u64;
    if size == 0 {
        report.push(Issue::error(Category::FileAccess, "File is empty (0 bytes)"));
        return;
    }
    report.record(StatKey::FileSize, data.len());
    report.record(StatKey::FileSizeMb, StatValue::megabytes(size));

    if size > options.large_file_threshold {
        report.push(Issue::warning(
            Category::FileSize,
            format!(
                "File is very large ({:.2}MB), may cause performance issues",
                size as f64 / BYTES_PER_MB
            ),
        ));
    }

    // Dropped on every return below, releasing the archive.
    let Some(container) = open_package(report, data) else {
        return;
    };
    report.record(StatKey::ZipEntries, container.len());
    log::debug!("opened package with {} entries", container.len());

    report.absorb(structure::check_structure(&container));

    if container.exists(MAIN_DOCUMENT_PART) {
        analyze_main_document(report, &container, options);
    } else {
        log::debug!("{} missing, skipping document checks", MAIN_DOCUMENT_PART);
    }

    log::debug!("checking relationships");
    report.absorb(relationships::check_relationships(&container));

    log::debug!("scanning embedded objects");
    report.absorb(embedded::scan_embedded(&container));
}

/// Open the archive and test every member; `None` aborts the run.
fn open_package(report: &mut ReportBuilder, data: Vec<u8>) -> Option<OoxmlContainer> {
    let container = match OoxmlContainer::from_bytes(data) {
        Ok(container) => container,
        Err(err) => {
            log::warn!("not a zip archive: {}", err);
            let reason = match err {
                Error::ZipArchive(reason) => reason,
                other => other.to_string(),
            };
            report.push(
                Issue::error(Category::ZipStructure, format!("Invalid ZIP archive: {}", reason))
                    .with_suggestion(
                        "File is not a valid DOCX. May be corrupted or not a Word document.",
                    ),
            );
            return None;
        }
    };

    match container.verify_integrity() {
        Ok(()) => Some(container),
        Err(err) => {
            log::warn!("integrity test failed: {}", err);
            let message = match err {
                Error::CorruptedEntry { name, .. } => format!("Corrupted file in archive: {}", name),
                other => format!("Error reading file: {}", other),
            };
            report.push(
                Issue::error(Category::ZipStructure, message).with_suggestion(
                    "The DOCX archive is corrupted. Try opening and re-saving in Word.",
                ),
            );
            None
        }
    }
}

/// Decode, parse and check the main document.
///
/// Semantic checks run only when the part parses.
fn analyze_main_document(
    report: &mut ReportBuilder,
    container: &OoxmlContainer,
    options: &AnalyzeOptions,
) {
    let bytes = match container.read_binary(MAIN_DOCUMENT_PART) {
        Ok(bytes) => bytes,
        Err(err) => {
            report.push(Issue::error(
                Category::Analysis,
                format!("Error analyzing document.xml: {}", err),
            ));
            return;
        }
    };

    log::debug!("analyzing {} ({} bytes)", MAIN_DOCUMENT_PART, bytes.len());
    let analysis = part::analyze_part(MAIN_DOCUMENT_PART, &bytes, options);
    report.absorb(analysis.findings);

    match analysis.outcome {
        part::PartOutcome::Parsed(root) => {
            log::debug!("running {} semantic checks", checks::SEMANTIC_CHECKS.len());
            report.absorb(checks::run_checks(&root, checks::SEMANTIC_CHECKS, options));
        }
        part::PartOutcome::Undecodable => {
            log::debug!("{} could not be decoded, skipping semantic checks", MAIN_DOCUMENT_PART);
        }
        part::PartOutcome::Malformed => {
            log::warn!("{} is not well-formed, skipping semantic checks", MAIN_DOCUMENT_PART);
        }
    }
}
