//! nanoseed - initial machine state for micro-benchmarks
//!
//! # Overview
//!
//! nanoseed compiles short constraint statements into the x86-64 instructions
//! that put registers and scratch memory into a requested state right before
//! a benchmarked snippet runs:
//!
//! | statement          | effect                                              |
//! |--------------------|-----------------------------------------------------|
//! | `rax = 4`          | `mov rax, 4;`                                       |
//! | `0 <= rcx < 64`    | `rcx` holds a random value in `[0, 63]`             |
//! | `rdi = *7`         | `rdi` points at a scratch cell holding `7`          |
//! | `rsi = [0u8; 64]`  | `rsi` points at 64 zeroed bytes                     |
//!
//! # Quick Start
//!
//! ```
//! use nanoseed::{CompileOptions, Session};
//!
//! let options = CompileOptions { seed: Some(7), ..CompileOptions::default() };
//! let mut session = Session::new(&options).unwrap();
//! for statement in ["rax = 4", "0 <= rcx < 64", "rsi = [0u8; 64]"] {
//!     session.compile(statement).unwrap();
//! }
//! let prelude = session.finish();
//! assert_eq!(prelude[0].to_string(), "mov rax, 4;");
//! ```
//!
//! Scratch memory lives below the base register (`r14` by default), which
//! the measurement harness points at a pre-reserved region.

// Re-export public API from nanoseed_core
pub use nanoseed_core::api::{
    CompileOptions, Diagnostic, EmitterOptions, Error, Session, Severity, compile, compile_all,
    compile_with,
};

// Re-export the building blocks for callers that drive the emitter directly
pub use nanoseed_core::emitter::{self, CompileError, Emitter, Instruction};
pub use nanoseed_core::parser::{self, ParseError};
pub use nanoseed_core::visitor;

mod error_renderer;
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
