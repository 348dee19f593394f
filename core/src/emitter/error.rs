//! Errors raised while lowering a statement into instructions.

use crate::api::{Diagnostic, Severity};
use crate::parser::{ComparisonOp, ElementWidth, Span};

/// A statement that parsed but cannot be compiled.
///
/// Any of these aborts the statement; nothing it emitted is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Target register already assigned in this session, reserved, or not a
    /// register at all.
    #[error("register not free: '{register}'")]
    RegisterNotFree { register: String },

    /// Source operand names something that is not a register.
    #[error("unknown register '{register}'")]
    UnknownRegister { register: String },

    #[error("inconsistent comparison direction: '{first}' and '{second}'")]
    InconsistentDirection {
        first: ComparisonOp,
        second: ComparisonOp,
    },

    #[error("comparison register mismatch: '{first}' and '{second}'")]
    RegisterMismatch { first: String, second: String },

    #[error("empty range: [{low}, {high}]")]
    EmptyRange { low: i128, high: i128 },

    #[error("unsupported node: {kind}")]
    UnsupportedNode { kind: &'static str },

    #[error("invalid array size: {size}")]
    InvalidArraySize { size: i64 },

    #[error("unsupported comparison shape: {shape}")]
    UnsupportedShape { shape: String },

    #[error(
        "scratch region exhausted: {requested} more bytes requested, {cursor} of {capacity} in use"
    )]
    ScratchExhausted {
        requested: u64,
        cursor: u64,
        capacity: u64,
    },

    #[error("initializer {value} does not fit in {}", .width.suffix())]
    InitializerOutOfRange { value: i64, width: ElementWidth },
}

impl CompileError {
    pub fn unsupported_shape(shape: impl Into<String>) -> Self {
        CompileError::UnsupportedShape {
            shape: shape.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CompileError::RegisterNotFree { .. } => "C001",
            CompileError::UnknownRegister { .. } => "C002",
            CompileError::InconsistentDirection { .. } => "C003",
            CompileError::RegisterMismatch { .. } => "C004",
            CompileError::EmptyRange { .. } => "C005",
            CompileError::UnsupportedNode { .. } => "C006",
            CompileError::InvalidArraySize { .. } => "C007",
            CompileError::UnsupportedShape { .. } => "C008",
            CompileError::ScratchExhausted { .. } => "C009",
            CompileError::InitializerOutOfRange { .. } => "C010",
        }
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            CompileError::RegisterNotFree { .. } => {
                Some("each register can be assigned once per session; the base register is reserved")
            }
            CompileError::InconsistentDirection { .. } => {
                Some("use `low < reg < high` or `high > reg > low`")
            }
            CompileError::EmptyRange { .. } => Some("no integer satisfies both comparisons"),
            CompileError::UnsupportedShape { .. } => Some(
                "comparisons relate one register to integer literals, with at most two operators",
            ),
            CompileError::ScratchExhausted { .. } => {
                Some("increase the scratch region size or allocate less memory")
            }
            _ => None,
        }
    }

    /// Convert to a Diagnostic for API boundary.
    ///
    /// Compile errors are attributed to the whole statement.
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            message: self.to_string(),
            span,
            help: self.help().map(str::to_string),
            code: Some(self.code().to_string()),
        }
    }
}
