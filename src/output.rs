//! CLI output formatting for build summaries.
//!
//! Progress goes through `tracing` on stderr while the build runs. This
//! module renders the closing summary on stdout.
//!
//! # Output Format
//!
//! ## Book build
//!
//! ```text
//! ==> release build finished
//! 7 built, 2 up to date (9 total)
//! PDF: out/retro-book_release.pdf
//! ```
//!
//! With failures, each one is listed with the first lines of its diagnostic:
//!
//! ```text
//! ==> release build finished with errors
//! 6 built, 2 up to date, 1 failed (9 total)
//! Failed:
//!     illu/d/robot.svg
//!         exit status 1
//!         ** (inkscape): WARNING **: ...
//! ```
//!
//! ## Markdown
//!
//! ```text
//! ✓ Markdown generation complete!
//!     Successfully converted: 12 files
//!     Errors: 1 files
//!     Output directory: out/markdown/
//! ```
//!
//! # Architecture
//!
//! Each summary has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::config::BuildMode;
use crate::report::{BuildReport, Failure};
use std::path::Path;

/// Diagnostic lines shown per failure; the full text is in the log.
const DIAGNOSTIC_LINES: usize = 5;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Failure header plus at most [`DIAGNOSTIC_LINES`] of its diagnostic.
fn failure_lines(failure: &Failure) -> Vec<String> {
    let mut lines = vec![format!("{}{}", indent(1), failure.item)];
    let mut diagnostic = failure.diagnostic.lines().filter(|l| !l.trim().is_empty());
    lines.extend(
        diagnostic
            .by_ref()
            .take(DIAGNOSTIC_LINES)
            .map(|l| format!("{}{}", indent(2), l.trim_end())),
    );
    if diagnostic.next().is_some() {
        lines.push(format!("{}...", indent(2)));
    }
    lines
}

fn failures_section(report: &BuildReport) -> Vec<String> {
    if report.failures.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Failed:".to_string()];
    lines.extend(report.failures.iter().flat_map(failure_lines));
    lines
}

// ============================================================================
// Book build
// ============================================================================

/// Summary of a debug/release/print build.
///
/// `pdf` is shown only when the build succeeded.
pub fn format_build_summary(mode: BuildMode, report: &BuildReport, pdf: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    if report.is_success() {
        lines.push(format!("==> {mode} build finished"));
    } else {
        lines.push(format!("==> {mode} build finished with errors"));
    }
    lines.push(report.to_string());
    if report.is_success() {
        lines.push(format!("PDF: {}", pdf.display()));
    }
    lines.extend(failures_section(report));
    lines
}

pub fn print_build_summary(mode: BuildMode, report: &BuildReport, pdf: &Path) {
    for line in format_build_summary(mode, report, pdf) {
        println!("{}", line);
    }
}

// ============================================================================
// Markdown
// ============================================================================

/// Summary of a markdown export.
pub fn format_markdown_summary(report: &BuildReport, out_dir: &Path) -> Vec<String> {
    let mut lines = vec![
        "✓ Markdown generation complete!".to_string(),
        format!("{}Successfully converted: {} files", indent(1), report.built),
    ];
    if !report.failures.is_empty() {
        lines.push(format!("{}Errors: {} files", indent(1), report.failures.len()));
    }
    if report.skipped > 0 {
        lines.push(format!("{}Skipped: {} files", indent(1), report.skipped));
    }
    lines.push(format!("{}Output directory: {}/", indent(1), out_dir.display()));
    lines.extend(failures_section(report));
    lines
}

pub fn print_markdown_summary(report: &BuildReport, out_dir: &Path) {
    for line in format_markdown_summary(report, out_dir) {
        println!("{}", line);
    }
}
