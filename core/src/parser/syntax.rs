// Common syntax structures shared by the parser, the visitors and the emitter.

use core::fmt;
use core::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::new(a.0.start, b.0.end)
    }
    pub fn str_of<'a>(&self, source: &'a str) -> &'a str {
        &source[self.0.start..self.0.end]
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(s: pest::Span<'_>) -> Self {
        Self(s.start()..s.end())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ComparisonOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Neq,
}

/// Which way an ordering comparison points.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    /// `<` and `<=`
    Ascending,
    /// `>` and `>=`
    Descending,
}

impl ComparisonOp {
    /// `None` for `==` and `!=`, which have no direction.
    pub fn direction(self) -> Option<Direction> {
        match self {
            ComparisonOp::Lt | ComparisonOp::Le => Some(Direction::Ascending),
            ComparisonOp::Gt | ComparisonOp::Ge => Some(Direction::Descending),
            ComparisonOp::Eq | ComparisonOp::Neq => None,
        }
    }

    pub fn is_strict(self) -> bool {
        matches!(self, ComparisonOp::Lt | ComparisonOp::Gt)
    }

    /// The operator that holds when both operands swap sides: `a < b` iff `b > a`.
    pub fn flipped(self) -> Self {
        match self {
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::Le => ComparisonOp::Ge,
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::Ge => ComparisonOp::Le,
            ComparisonOp::Eq => ComparisonOp::Eq,
            ComparisonOp::Neq => ComparisonOp::Neq,
        }
    }

    pub fn holds(self, left: i64, right: i64) -> bool {
        match self {
            ComparisonOp::Lt => left < right,
            ComparisonOp::Le => left <= right,
            ComparisonOp::Gt => left > right,
            ComparisonOp::Ge => left >= right,
            ComparisonOp::Eq => left == right,
            ComparisonOp::Neq => left != right,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Eq => "==",
            ComparisonOp::Neq => "!=",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element width of a typed array initializer (`0u8`, `7u32`, ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ElementWidth {
    U8,
    U16,
    U32,
    U64,
}

impl ElementWidth {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "u8" => Some(ElementWidth::U8),
            "u16" => Some(ElementWidth::U16),
            "u32" => Some(ElementWidth::U32),
            "u64" => Some(ElementWidth::U64),
            _ => None,
        }
    }

    pub fn bytes(self) -> u64 {
        match self {
            ElementWidth::U8 => 1,
            ElementWidth::U16 => 2,
            ElementWidth::U32 => 4,
            ElementWidth::U64 => 8,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            ElementWidth::U8 => "u8",
            ElementWidth::U16 => "u16",
            ElementWidth::U32 => "u32",
            ElementWidth::U64 => "u64",
        }
    }
}
