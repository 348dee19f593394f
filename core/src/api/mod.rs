//! Public API for compiling constraint statements.
//!
//! # Example
//!
//! ```
//! use nanoseed_core::api::{CompileOptions, compile_with};
//!
//! let options = CompileOptions {
//!     seed: Some(1),
//!     ..CompileOptions::default()
//! };
//! let program = compile_with(&options, "0 <= rax < 7").unwrap();
//! assert_eq!(program.len(), 1);
//! ```

pub mod error;
pub mod options;
pub mod session;

pub use error::{Diagnostic, Error, Severity};
pub use options::{CompileOptions, EmitterOptions};
pub use session::{Session, compile, compile_all, compile_with};
