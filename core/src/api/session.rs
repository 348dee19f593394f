//! Compile sessions: one emitter shared by a block of statements.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{CompileOptions, EmitterOptions, Error};
use crate::emitter::{Emitter, Instruction};
use crate::parser;
use crate::visitor::{Lowering, TreeTransformer};

/// A run of statements compiled against one register pool and one scratch
/// cursor.
///
/// Each [`Session::compile`] is atomic: a statement that fails leaves the
/// session exactly as it was before the statement, so callers may report the
/// error and keep going.
///
/// # Example
///
/// ```
/// use nanoseed_core::api::{CompileOptions, Session};
///
/// let mut session = Session::new(&CompileOptions::default()).unwrap();
/// session.compile("rax = 4").unwrap();
/// assert!(session.compile("rax = 5").is_err());
/// session.compile("rbx = *rax").unwrap();
///
/// let lines: Vec<String> = session.finish().iter().map(|i| i.to_string()).collect();
/// assert_eq!(lines, ["mov rax, 4;", "mov rbx, r14;", "sub rbx, 8;", "mov [rbx], rax;"]);
/// ```
pub struct Session<R = StdRng> {
    emitter: Emitter<R>,
}

impl Session<StdRng> {
    /// Create a session whose random source follows `options.seed`.
    pub fn new(options: &CompileOptions) -> Result<Self, Error> {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(&options.emitter, rng)
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(options: &EmitterOptions, rng: R) -> Result<Self, Error> {
        Ok(Self {
            emitter: Emitter::new(options, rng)?,
        })
    }

    /// Compile one statement and return the instructions it added.
    pub fn compile(&mut self, statement: &str) -> Result<&[Instruction], Error> {
        let parsed = parser::parse(statement)?;
        tracing::debug!(statement = parsed.source.trim(), "compile");

        let checkpoint = self.emitter.checkpoint();
        let start = self.emitter.instructions().len();
        if let Err(err) = Lowering::new(&mut self.emitter).transform(&parsed.expr) {
            tracing::debug!(%err, "statement rolled back");
            self.emitter.rollback(checkpoint);
            return Err(err.into());
        }
        Ok(&self.emitter.instructions()[start..])
    }

    pub fn emitter(&self) -> &Emitter<R> {
        &self.emitter
    }

    /// Everything emitted so far, in order.
    pub fn instructions(&self) -> &[Instruction] {
        self.emitter.instructions()
    }

    pub fn finish(self) -> Vec<Instruction> {
        self.emitter.finish()
    }
}

/// Compile one statement with default options.
pub fn compile(statement: &str) -> Result<Vec<Instruction>, Error> {
    compile_with(&CompileOptions::default(), statement)
}

/// Compile one statement in a fresh session.
pub fn compile_with(options: &CompileOptions, statement: &str) -> Result<Vec<Instruction>, Error> {
    compile_all(options, [statement])
}

/// Compile a block of statements in one session, stopping at the first error.
pub fn compile_all<I>(options: &CompileOptions, statements: I) -> Result<Vec<Instruction>, Error>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut session = Session::new(options)?;
    for statement in statements {
        session.compile(statement.as_ref())?;
    }
    Ok(session.finish())
}
