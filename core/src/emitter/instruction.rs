//! Textual x86-64 instructions in Intel syntax.
//!
//! Each [`Instruction`] renders as one line terminated by `;`, ready to be
//! spliced into a larger `.intel_syntax noprefix` listing.

use core::fmt;

use crate::emitter::registers::Register;
use crate::parser::ElementWidth;

/// Size keyword for a memory operand (`byte ptr`, ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PtrWidth {
    Byte,
    Word,
    Dword,
    Qword,
}

impl PtrWidth {
    pub fn as_str(self) -> &'static str {
        match self {
            PtrWidth::Byte => "byte",
            PtrWidth::Word => "word",
            PtrWidth::Dword => "dword",
            PtrWidth::Qword => "qword",
        }
    }
}

impl From<ElementWidth> for PtrWidth {
    fn from(width: ElementWidth) -> Self {
        match width {
            ElementWidth::U8 => PtrWidth::Byte,
            ElementWidth::U16 => PtrWidth::Word,
            ElementWidth::U32 => PtrWidth::Dword,
            ElementWidth::U64 => PtrWidth::Qword,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    Immediate(i64),
    Memory {
        base: Register,
        offset: u64,
        /// `None` leaves the size to the assembler.
        width: Option<PtrWidth>,
    },
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(register) => write!(f, "{register}"),
            Operand::Immediate(value) => write!(f, "{value}"),
            Operand::Memory {
                base,
                offset,
                width,
            } => {
                if let Some(width) = width {
                    write!(f, "{} ptr ", width.as_str())?;
                }
                match offset {
                    0 => write!(f, "[{base}]"),
                    offset => write!(f, "[{base} + {offset}]"),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Mov { dst: Operand, src: Operand },
    Sub { dst: Operand, src: Operand },
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Mov { .. } => "mov",
            Instruction::Sub { .. } => "sub",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Mov { dst, src } | Instruction::Sub { dst, src } => {
                write!(f, "{} {}, {};", self.mnemonic(), dst, src)
            }
        }
    }
}
