//! docxdiag CLI - DOCX diagnostic tool
//!
//! Analyzes one or more Word documents and reports anything likely to
//! break a document processing pipeline.

use clap::Parser;
use colored::*;
use docxdiag::render::{to_json, to_json_batch, JsonFormat};
use docxdiag::{AnalyzeOptions, DiagnosticReport, Issue, Severity, StatKey, Status};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

/// Separator width for console reports.
const RULE_WIDTH: usize = 60;

/// Contexts longer than this are cut in console output.
const MAX_CONTEXT_CHARS: usize = 200;

/// Statistics shown in the console summary, in order.
const SUMMARY_STATS: &[(StatKey, &str)] = &[
    (StatKey::TrackedChanges, "Tracked Changes"),
    (StatKey::ContentControls, "Content Controls"),
    (StatKey::FieldCodes, "Field Codes"),
    (StatKey::Equations, "Equations"),
    (StatKey::Hyperlinks, "Hyperlinks"),
    (StatKey::EmbeddedObjects, "Embedded Objects"),
    (StatKey::MediaFiles, "Media Files"),
];

/// Diagnose DOCX files for potential processing issues
#[derive(Parser)]
#[command(
    name = "docxdiag",
    version,
    about = "Diagnose DOCX files for potential processing issues",
    after_help = "Exit codes:\n  \
                  0 - All files passed (no errors)\n  \
                  1 - One or more files had errors\n  \
                  2 - Invalid arguments"
)]
struct Cli {
    /// DOCX file(s) to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Output compact JSON (no indentation)
    #[arg(long, requires = "json")]
    compact: bool,

    /// Show detailed context for issues
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    match run(cli) {
        Ok(failed) => std::process::exit(i32::from(failed)),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Analyze every file; returns whether any report failed.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    if cli.no_color || cli.json || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let options = AnalyzeOptions::default().with_verbose(cli.verbose);
    let show_progress = !cli.json && cli.files.len() > 1 && io::stderr().is_terminal();

    let mut reports = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let spinner = show_progress.then(|| create_spinner(&format!("Analyzing {}...", path.display())));
        let report = docxdiag::analyze_file_with_options(path, &options);
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        if !cli.json {
            print_report(&report, cli.verbose)?;
        }
        reports.push(report);
    }

    if cli.json {
        let format = if cli.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        let json = match reports.as_slice() {
            [single] => to_json(single, format)?,
            many => to_json_batch(many, format)?,
        };
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", json)?;
    }

    Ok(docxdiag::any_failed(&reports))
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn severity_label(severity: Severity) -> ColoredString {
    let label = format!("[{}]", severity);
    match severity {
        Severity::Error => label.red(),
        Severity::Warning => label.yellow(),
        Severity::Info => label.blue(),
    }
}

fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Pass => status.as_str().green().bold(),
        Status::Warn => status.as_str().yellow().bold(),
        Status::Fail => status.as_str().red().bold(),
    }
}

/// Cut a context string to [`MAX_CONTEXT_CHARS`] characters.
fn truncate_context(context: &str) -> String {
    match context.char_indices().nth(MAX_CONTEXT_CHARS) {
        Some((cut, _)) => format!("{}...", &context[..cut]),
        None => context.to_string(),
    }
}

fn format_issue(issue: &Issue, verbose: bool) -> String {
    let mut lines = vec![format!(
        "{} {}: {}",
        severity_label(issue.severity()),
        issue.category().label().bold(),
        issue.message()
    )];

    if let Some(location) = issue.location() {
        lines.push(format!("  Location: {}", location));
    }
    if verbose {
        if let Some(context) = issue.context() {
            lines.push(format!("  Context: {}", truncate_context(context)));
        }
    }
    if let Some(suggestion) = issue.suggestion() {
        lines.push(format!("  {}", format!("Suggestion: {}", suggestion).cyan()));
    }

    lines.join("\n")
}

fn format_size(report: &DiagnosticReport) -> String {
    match report.statistics().count(StatKey::FileSize) {
        Some(bytes) => format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0)),
        None => "N/A".to_string(),
    }
}

fn print_report(report: &DiagnosticReport, verbose: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out, "{}", rule.bold())?;
    writeln!(out, "{}", "DOCX Diagnostic Report".bold())?;
    writeln!(out, "File: {}", report.file())?;
    writeln!(out, "Size: {}", format_size(report))?;
    writeln!(out, "{}", rule.bold())?;

    for (label, issues) in report.issues_by_category() {
        writeln!(out, "\n{}", format!("[{}]", label).bold())?;
        for issue in issues {
            writeln!(out, "{}\n", format_issue(issue, verbose))?;
        }
    }

    writeln!(out, "\n{}", rule.bold())?;
    writeln!(out, "Status: {}", status_label(report.status()))?;
    writeln!(out, "Errors: {}", report.error_count().to_string().red())?;
    writeln!(out, "Warnings: {}", report.warning_count().to_string().yellow())?;
    writeln!(out, "Info: {}", report.info_count().to_string().blue())?;

    let stats: Vec<_> = SUMMARY_STATS
        .iter()
        .filter_map(|(key, label)| {
            report
                .statistics()
                .count(*key)
                .filter(|n| *n > 0)
                .map(|n| (label, n))
        })
        .collect();
    if !stats.is_empty() {
        writeln!(out, "\n{}", "Statistics:".bold())?;
        for (label, n) in stats {
            writeln!(out, "  {}: {}", label, n)?;
        }
    }

    writeln!(out, "{}\n", rule.bold())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_requires_files() {
        assert!(Cli::try_parse_from(["docxdiag"]).is_err());
        let cli = Cli::try_parse_from(["docxdiag", "a.docx", "b.docx", "--json", "-v"]).unwrap();
        assert_eq!(cli.files.len(), 2);
        assert!(cli.json && cli.verbose);
    }

    #[test]
    fn test_compact_requires_json() {
        assert!(Cli::try_parse_from(["docxdiag", "a.docx", "--compact"]).is_err());
    }

    #[test]
    fn test_truncate_context() {
        assert_eq!(truncate_context("short"), "short");
        let long = "x".repeat(250);
        let cut = truncate_context(&long);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_format_issue_plain() {
        colored::control::set_override(false);
        let issue = Issue::warning(docxdiag::Category::Hyperlinks, "Found 1 hyperlink(s) without target reference")
            .with_location("word/document.xml")
            .with_context("ctx")
            .with_suggestion("Check relationships.");

        let text = format_issue(&issue, false);
        assert_eq!(
            text,
            "[WARNING] Hyperlinks: Found 1 hyperlink(s) without target reference\n  \
             Location: word/document.xml\n  Suggestion: Check relationships."
        );
        assert!(format_issue(&issue, true).contains("  Context: ctx"));
    }
}
