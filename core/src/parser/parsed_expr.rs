use crate::parser::{ComparisonOp, ElementWidth, Span};

/// A parsed statement together with the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub source: String,
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Assignment {
        target: String,
        value: Box<Expr>,
    },
    /// One link per comparison operator; consecutive links share their
    /// middle operand (`a < b <= c` is `[(a, <, b), (b, <=, c)]`).
    ComparisonChain(Vec<ComparisonLink>),
    Dereference(Atom),
    ArrayLiteral(Atom),
    ArrayRepeat {
        initializer: TypedAtom,
        count: Atom,
    },
    TypedAtom(TypedAtom),
    Atom(Atom),
}

impl Expr {
    /// Variant name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Assignment { .. } => "Assignment",
            Expr::ComparisonChain(_) => "ComparisonChain",
            Expr::Dereference(_) => "Dereference",
            Expr::ArrayLiteral(_) => "ArrayLiteral",
            Expr::ArrayRepeat { .. } => "ArrayRepeat",
            Expr::TypedAtom(_) => "TypedAtom",
            Expr::Atom(_) => "Atom",
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Expr::Atom(atom) => Some(atom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonLink {
    pub left: Expr,
    pub op: ComparisonOp,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Register(String),
    Int(i64),
}

impl Atom {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Atom::Int(value) => Some(*value),
            Atom::Register(_) => None,
        }
    }

    pub fn as_register(&self) -> Option<&str> {
        match self {
            Atom::Register(name) => Some(name),
            Atom::Int(_) => None,
        }
    }
}

impl core::fmt::Display for Atom {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Atom::Register(name) => f.write_str(name),
            Atom::Int(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedAtom {
    pub value: Atom,
    pub width: Option<ElementWidth>,
}

impl core::fmt::Display for TypedAtom {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.value)?;
        match self.width {
            Some(width) => f.write_str(width.suffix()),
            None => Ok(()),
        }
    }
}
