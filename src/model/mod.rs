//! Report data model.
//!
//! Issues, statistics, and the report that aggregates them.

mod issue;
mod report;
mod statistics;

pub use issue::{Category, Issue, Severity};
pub use report::{any_failed, DiagnosticReport, Findings, ReportBuilder, Status};
pub use statistics::{StatKey, StatValue, Statistics, TrackedChangeCounts};
