//! Tree visitors over parsed statements.
//!
//! A [`TreeTransformer`] walks one [`Expr`](crate::parser::Expr) tree and
//! produces an arbitrary output. Two transformers live here:
//!
//! - [`Lowering`] drives an [`Emitter`](crate::emitter::Emitter) and is the
//!   only path from a parsed statement to instructions.
//! - [`Formatter`] renders a tree back to canonical source text.

mod formatter;
mod lowering;

pub use formatter::Formatter;
pub use lowering::Lowering;

/// Generic transformer for tree structures.
///
/// The transformer can be stateful (uses `&mut self`) to accumulate results
/// or drive a backend during traversal.
pub trait TreeTransformer<Tree: ?Sized> {
    /// The type of value produced by the transformation.
    ///
    /// Examples:
    /// - `Result<(), CompileError>` for lowering into an emitter
    /// - `String` for pretty printing
    type Output;

    /// Transform a tree node.
    ///
    /// The transformer is responsible for recursing into children as needed.
    fn transform(&mut self, tree: &Tree) -> Self::Output;
}

#[cfg(test)]
mod tests;
