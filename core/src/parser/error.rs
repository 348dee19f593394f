use crate::api::{Diagnostic, Severity};
use crate::parser::{Rule, Span};

/// Parser error with the statement it was raised for.
#[derive(Debug, Clone, thiserror::Error)]
#[error("syntax error: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub input: String,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// Unexpected token
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    /// Integer literal that does not fit in 64 bits
    #[error("invalid integer literal '{text}'")]
    InvalidNumber { text: String },
    /// Other parse errors (catch-all for Pest errors we don't specifically handle)
    #[error("{message}")]
    Other { message: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, input: String, span: Span) -> Self {
        Self { kind, input, span }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ParseErrorKind::UnexpectedToken { .. } => (
                "P001",
                Some("statements are `reg = value` or a chain of at most two comparisons"),
            ),
            ParseErrorKind::InvalidNumber { .. } => (
                "P002",
                Some("integer literals must fit in a signed 64-bit register"),
            ),
            ParseErrorKind::Other { .. } => ("P999", None),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            span: self.span.clone(),
            help: help.map(str::to_string),
            code: Some(code.to_string()),
        }
    }
}

/// Convert Pest error to human-readable ParseError
pub fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    use pest::error::ErrorVariant;

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..pos),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError {
            positives,
            negatives,
        } => {
            let expected = format_expected_rules(&positives);
            let found = found_at(source, span.0.start).unwrap_or_else(|| {
                if negatives.is_empty() {
                    "end of input".to_string()
                } else {
                    format!("{:?}", negatives[0])
                }
            });
            ParseErrorKind::UnexpectedToken { expected, found }
        }
        ErrorVariant::CustomError { message } => {
            if message.contains("invalid integer literal") {
                ParseErrorKind::InvalidNumber {
                    text: span.str_of(source).to_string(),
                }
            } else {
                ParseErrorKind::Other { message }
            }
        }
    };

    ParseError::new(kind, source.to_string(), span)
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    let mut concepts: Vec<&str> = Vec::new();

    for rule in rules {
        let concept = match rule {
            Rule::integer => "integer",
            Rule::ident => "register",
            Rule::lt | Rule::le | Rule::gt | Rule::ge | Rule::eq | Rule::neq => {
                "comparison operator"
            }
            Rule::deref | Rule::array | Rule::array_repeat | Rule::typed_atom => "value",
            Rule::type_suffix => "element type",
            Rule::EOI => "end of input",
            _ => "statement",
        };
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        None => "something else".to_string(),
        Some((only, [])) => only.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

/// Describe the text at `pos`: the offending character, or `None` at the end.
fn found_at(source: &str, pos: usize) -> Option<String> {
    let c = source.get(pos..)?.chars().next()?;
    Some(format!("'{c}'"))
}
