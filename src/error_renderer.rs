//! Error rendering using ariadne
//!
//! Renders compile errors with the offending statement underlined, the error
//! code and any help text.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<statement>";

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use nanoseed::{compile, render_error};
///
/// let source = "rax = = 4";
/// if let Err(e) = compile(source) {
///     render_error(source, &e);
/// }
/// ```
pub fn render_error(source: &str, error: &Error) {
    render_error_to_writer(source, error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(
    source: &str,
    error: &Error,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_error_to_writer(source, error, writer, true)
}

/// Render an error to a String (useful for logs and UIs)
pub fn render_error_to_string(source: &str, error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(source, error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
///
/// This is the same as `render_error_to_string` but without ANSI color codes,
/// making the output easier to compare in tests.
pub fn render_error_to_string_no_color(source: &str, error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(source, error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    source: &str,
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    render_diagnostic(source, &error.to_diagnostic(source), writer, use_color)
}

fn render_diagnostic(
    source: &str,
    diag: &Diagnostic,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };

    let mut report = Report::build(kind, (SOURCE_ID, diag.span.0.clone()))
        .with_message(&diag.message)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    report = report.with_label(
        Label::new((SOURCE_ID, diag.span.0.clone()))
            .with_message(&diag.message)
            .with_color(colors.next()),
    );

    if let Some(help_msg) = &diag.help {
        report = report.with_help(help_msg);
    }

    // Reborrow the writer so it is not moved into `write`.
    report.finish().write((SOURCE_ID, Source::from(source)), &mut *writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    #[test]
    fn test_render_syntax_error() {
        let source = "rax = = 4";
        let err = compile(source).unwrap_err();
        let output = render_error_to_string_no_color(source, &err);

        assert!(output.contains("Error"));
        assert!(output.contains("P001"));
        assert!(output.contains("rax = = 4"));
    }

    #[test]
    fn test_render_compile_error_with_help() {
        let source = "0 < rax > 7";
        let err = compile(source).unwrap_err();
        let output = render_error_to_string_no_color(source, &err);

        assert!(output.contains("C003"));
        assert!(output.contains("inconsistent comparison direction"));
        assert!(output.contains("Help"));
    }

    #[test]
    fn test_render_to_string_captures_output() {
        let source = "rax = [0]";
        let err = compile(source).unwrap_err();
        let output = render_error_to_string_no_color(source, &err);

        assert!(!output.is_empty());
        // Should be multi-line (ariadne adds formatting)
        assert!(output.lines().count() > 1);
    }
}
