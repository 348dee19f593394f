//! Public error types for the nanoseed API.
//!
//! Internal errors are converted to [`Diagnostic`]s at the API boundary so
//! that callers can render them without knowing which stage failed.

use core::fmt;

use crate::emitter::CompileError;
use crate::parser::{ParseError, Span};

/// Public error type for all compile operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The statement does not match the grammar. No tree was produced.
    #[error(transparent)]
    Syntax(#[from] ParseError),

    /// The statement parsed but could not be lowered. Nothing it emitted is
    /// kept.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
}

impl Error {
    /// Convert to a Diagnostic against the statement that produced it.
    pub fn to_diagnostic(&self, source: &str) -> Diagnostic {
        match self {
            Error::Syntax(err) => err.to_diagnostic(),
            Error::Compile(err) => err.to_diagnostic(statement_span(source)),
        }
    }
}

/// The statement without surrounding whitespace.
fn statement_span(source: &str) -> Span {
    let start = source.len() - source.trim_start().len();
    let end = source.trim_end().len().max(start);
    Span::new(start, end)
}

/// A diagnostic message with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional error code (e.g., "C001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_diagnostic_covers_trimmed_statement() {
        let err = Error::from(CompileError::InvalidArraySize { size: 0 });
        let diagnostic = err.to_diagnostic("  rax = [0]  ");
        assert_eq!(diagnostic.span, Span(2..11));
        assert_eq!(diagnostic.code.as_deref(), Some("C007"));
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.message, "invalid array size: 0");
    }

    #[test]
    fn test_blank_statement_span_is_empty() {
        assert_eq!(statement_span("   "), Span(3..3));
        assert_eq!(statement_span(""), Span(0..0));
    }
}
