use crate::parser::error::convert_pest_error;
use crate::parser::{
    Atom, ComparisonLink, ComparisonOp, ElementWidth, Expr, ParseError, ParsedStatement, Span,
    TypedAtom,
};
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "parser/constraint.pest"]
pub struct StatementParser;

type PestError = pest::error::Error<Rule>;

fn custom_error(message: impl Into<String>, span: pest::Span<'_>) -> PestError {
    PestError::new_from_span(
        pest::error::ErrorVariant::CustomError {
            message: message.into(),
        },
        span,
    )
}

fn next_pair<'i>(
    pairs: &mut pest::iterators::Pairs<'i, Rule>,
    what: &str,
    span: pest::Span<'i>,
) -> Result<Pair<'i, Rule>, PestError> {
    pairs
        .next()
        .ok_or_else(|| custom_error(format!("missing {what}"), span))
}

pub fn parse_expr(pair: Pair<Rule>) -> Result<Expr, PestError> {
    let span = pair.as_span();
    match pair.as_rule() {
        Rule::main => parse_expr(next_pair(&mut pair.into_inner(), "statement", span)?),

        Rule::assign => {
            let mut inner = pair.into_inner();
            let target = next_pair(&mut inner, "assignment target", span)?
                .as_str()
                .to_string();
            let value = parse_expr(next_pair(&mut inner, "assignment value", span)?)?;
            Ok(Expr::Assignment {
                target,
                value: Box::new(value),
            })
        }

        Rule::comparison => {
            let mut inner = pair.into_inner();
            let mut left = parse_expr(next_pair(&mut inner, "comparison operand", span)?)?;
            let mut links = Vec::new();
            while let Some(op) = inner.next() {
                let op = parse_comparison_op(op)?;
                let right = parse_expr(next_pair(&mut inner, "comparison operand", span)?)?;
                links.push(ComparisonLink {
                    left,
                    op,
                    right: right.clone(),
                });
                left = right;
            }
            Ok(Expr::ComparisonChain(links))
        }

        Rule::deref => {
            let atom = next_pair(&mut pair.into_inner(), "dereferenced value", span)?;
            Ok(Expr::Dereference(parse_atom(atom)?))
        }

        Rule::array => {
            let size = next_pair(&mut pair.into_inner(), "array size", span)?;
            Ok(Expr::ArrayLiteral(parse_atom(size)?))
        }

        Rule::array_repeat => {
            let mut inner = pair.into_inner();
            let initializer =
                parse_typed_atom(next_pair(&mut inner, "array initializer", span)?)?;
            let count = parse_atom(next_pair(&mut inner, "array length", span)?)?;
            Ok(Expr::ArrayRepeat { initializer, count })
        }

        Rule::typed_atom => Ok(Expr::TypedAtom(parse_typed_atom(pair)?)),

        Rule::integer | Rule::ident => Ok(Expr::Atom(parse_atom(pair)?)),

        _ => Err(custom_error(
            format!("Unhandled rule: {:?}", pair.as_rule()),
            span,
        )),
    }
}

fn parse_comparison_op(pair: Pair<Rule>) -> Result<ComparisonOp, PestError> {
    match pair.as_rule() {
        Rule::lt => Ok(ComparisonOp::Lt),
        Rule::le => Ok(ComparisonOp::Le),
        Rule::gt => Ok(ComparisonOp::Gt),
        Rule::ge => Ok(ComparisonOp::Ge),
        Rule::eq => Ok(ComparisonOp::Eq),
        Rule::neq => Ok(ComparisonOp::Neq),
        rule => Err(custom_error(
            format!("expected comparison operator, found {rule:?}"),
            pair.as_span(),
        )),
    }
}

fn parse_typed_atom(pair: Pair<Rule>) -> Result<TypedAtom, PestError> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let value = parse_atom(next_pair(&mut inner, "array initializer", span)?)?;
    let width = match inner.next() {
        Some(suffix) => Some(ElementWidth::from_suffix(suffix.as_str()).ok_or_else(|| {
            custom_error(
                format!("unknown element type '{}'", suffix.as_str()),
                suffix.as_span(),
            )
        })?),
        None => None,
    };
    Ok(TypedAtom { value, width })
}

fn parse_atom(pair: Pair<Rule>) -> Result<Atom, PestError> {
    match pair.as_rule() {
        Rule::ident => Ok(Atom::Register(pair.as_str().to_string())),
        Rule::integer => parse_integer(pair.as_str())
            .map(Atom::Int)
            .ok_or_else(|| custom_error("invalid integer literal", pair.as_span())),
        rule => Err(custom_error(
            format!("expected register or integer, found {rule:?}"),
            pair.as_span(),
        )),
    }
}

/// Parses a signed decimal or `0x` hexadecimal literal that fits in an `i64`.
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = match body.strip_prefix("0x") {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => body.parse::<i128>().ok()?,
    };
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

/// Parses exactly one statement.
pub fn parse(source: &str) -> Result<ParsedStatement, ParseError> {
    let mut pairs = StatementParser::parse(Rule::main, source)
        .map_err(|e| convert_pest_error(e, source))?;
    let pair = pairs.next().ok_or_else(|| {
        let err = PestError::new_from_pos(
            pest::error::ErrorVariant::CustomError {
                message: "missing expected pair in rule".to_string(),
            },
            pest::Position::from_start(source),
        );
        convert_pest_error(err, source)
    })?;
    let span = Span::from(pair.as_span());
    let expr = parse_expr(pair).map_err(|e| convert_pest_error(e, source))?;
    Ok(ParsedStatement {
        source: source.to_string(),
        expr,
        span,
    })
}
