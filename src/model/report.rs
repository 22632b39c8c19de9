//! Report model and the issue aggregator.

use super::{Category, Issue, Severity, StatKey, StatValue, Statistics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Overall verdict for one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// No warnings or errors
    Pass,
    /// At least one warning, no errors
    Warn,
    /// At least one error
    Fail,
}

impl Status {
    /// Derive the status from a sequence of issues.
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut status = Status::Pass;
        for issue in issues {
            match issue.severity() {
                Severity::Error => return Status::Fail,
                Severity::Warning => status = Status::Warn,
                Severity::Info => {}
            }
        }
        status
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one component: issues in discovery order plus statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub issues: Vec<Issue>,
    pub stats: Vec<(StatKey, StatValue)>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Findings holding a single issue.
    pub fn from_issue(issue: Issue) -> Self {
        Self {
            issues: vec![issue],
            stats: Vec::new(),
        }
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn stat(&mut self, key: StatKey, value: impl Into<StatValue>) {
        self.stats.push((key, value.into()));
    }
}

/// Accumulates findings for one run and freezes them into a report.
#[derive(Debug)]
pub struct ReportBuilder {
    file: String,
    statistics: Statistics,
    issues: Vec<Issue>,
}

impl ReportBuilder {
    /// Start a report for the given file identity.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            statistics: Statistics::new(),
            issues: Vec::new(),
        }
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn record(&mut self, key: StatKey, value: impl Into<StatValue>) {
        self.statistics.record(key, value);
    }

    /// Fold a component's findings into the report.
    pub fn absorb(&mut self, findings: Findings) {
        for (key, value) in findings.stats {
            self.statistics.record(key, value);
        }
        self.issues.extend(findings.issues);
    }

    /// Freeze the run into a report, deriving the status.
    pub fn finish(self) -> DiagnosticReport {
        let count = |severity: Severity| {
            self.issues
                .iter()
                .filter(|i| i.severity() == severity)
                .count()
        };
        let errors = count(Severity::Error);
        let warnings = count(Severity::Warning);
        let info = count(Severity::Info);

        DiagnosticReport {
            status: Status::from_issues(&self.issues),
            file: self.file,
            errors,
            warnings,
            info,
            statistics: self.statistics,
            issues: self.issues,
        }
    }
}

/// Result of analyzing one package.
///
/// Only produced by [`ReportBuilder::finish`], so `status` and the
/// per-severity counts always agree with `issues`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    file: String,
    status: Status,
    errors: usize,
    warnings: usize,
    info: usize,
    statistics: Statistics,
    issues: Vec<Issue>,
}

impl DiagnosticReport {
    /// File identity (path or caller-supplied name).
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Issues in discovery order.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn info_count(&self) -> usize {
        self.info
    }

    /// Number of issues with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.errors,
            Severity::Warning => self.warnings,
            Severity::Info => self.info,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == Status::Fail
    }

    /// Issues of one category, in discovery order.
    pub fn issues_in(&self, category: Category) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.category() == category)
    }

    /// Issues grouped by category label, sorted by label.
    pub fn issues_by_category(&self) -> BTreeMap<&'static str, Vec<&Issue>> {
        let mut groups: BTreeMap<&'static str, Vec<&Issue>> = BTreeMap::new();
        for issue in &self.issues {
            groups.entry(issue.category().label()).or_default().push(issue);
        }
        groups
    }
}

/// Aggregate failure signal for a batch of reports.
pub fn any_failed<'a>(reports: impl IntoIterator<Item = &'a DiagnosticReport>) -> bool {
    reports.into_iter().any(DiagnosticReport::is_failure)
}
