//! # docxdiag
//!
//! Diagnostics for Word (DOCX) packages.
//!
//! This library inspects a DOCX file the way a processing pipeline would
//! see it: the ZIP container, the required package parts, the main
//! document XML, its relationships and embedded content. Everything it
//! finds is reported as data in a [`DiagnosticReport`]; the package is
//! never modified.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docxdiag::{analyze_file, Status};
//!
//! let report = analyze_file("document.docx");
//! if report.status() == Status::Fail {
//!     for issue in report.issues() {
//!         println!("[{}] {}: {}", issue.severity(), issue.category(), issue.message());
//!     }
//! }
//! ```
//!
//! ## Options and output
//!
//! ```no_run
//! use docxdiag::{analyze_file_with_options, AnalyzeOptions, render::{to_json, JsonFormat}};
//!
//! let options = AnalyzeOptions::default()
//!     .with_verbose(true)
//!     .with_tracked_changes_error_threshold(50);
//!
//! let report = analyze_file_with_options("document.docx", &options);
//! println!("{}", to_json(&report, JsonFormat::Pretty)?);
//! # Ok::<(), docxdiag::Error>(())
//! ```

pub mod container;
pub mod diagnostic;
pub mod docx;
pub mod error;
pub mod model;
pub mod options;
pub mod render;
pub mod xml;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use diagnostic::{analyze_bytes, analyze_bytes_with_options, analyze_file, analyze_file_with_options};
pub use error::{Error, Result};
pub use model::{
    any_failed, Category, DiagnosticReport, Issue, Severity, StatKey, StatValue, Statistics,
    Status, TrackedChangeCounts,
};
pub use options::AnalyzeOptions;
