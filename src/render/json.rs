//! JSON renderer implementation.

use crate::error::Result;
use crate::model::DiagnosticReport;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert a report to JSON.
pub fn to_json(report: &DiagnosticReport, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(report)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(report)?,
    };
    Ok(json)
}

/// Convert several reports to a JSON array.
pub fn to_json_batch(reports: &[DiagnosticReport], format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(reports)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(reports)?,
    };
    Ok(json)
}
