//! Compiler for the register and scratch-memory constraint language.
//!
//! A statement such as `0 <= rax < 7` or `rdi = [0u8; 64]` describes part of
//! the machine state a benchmarked snippet should start from. Compiling it
//! yields Intel-syntax instructions that establish that state:
//!
//! ```
//! let program = nanoseed_core::compile("rax = 4").unwrap();
//! assert_eq!(program[0].to_string(), "mov rax, 4;");
//! ```
//!
//! The pipeline is parse ([`parser`]) → lower ([`visitor::Lowering`]) →
//! emit ([`emitter::Emitter`]), wired together by [`api::Session`].

pub mod api;
pub mod emitter;
pub mod parser;
pub mod visitor;

pub use api::{
    CompileOptions, Diagnostic, EmitterOptions, Error, Session, Severity, compile, compile_all,
    compile_with,
};
pub use emitter::{CompileError, Instruction};
pub use parser::ParseError;
