mod parsed_expr;
pub mod parser;
mod syntax;
pub mod error;

// Re-export the parser and rule enum for external use
pub use parser::StatementParser;
pub use parser::Rule;
pub use parser::parse;

pub use parsed_expr::{Atom, ComparisonLink, Expr, ParsedStatement, TypedAtom};
pub use syntax::{ComparisonOp, Direction, ElementWidth, Span};
pub use error::{ParseError, ParseErrorKind};

#[cfg(test)]
mod parse_test;
