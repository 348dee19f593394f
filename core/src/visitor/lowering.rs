use rand::Rng;

use super::TreeTransformer;
use crate::emitter::{CompileError, Emitter, RangeLink};
use crate::parser::{Atom, ComparisonLink, ElementWidth, Expr};

/// Lowers a statement into emitter calls.
///
/// Holds no state of its own: every allocation decision is made, and every
/// invariant checked, by the emitter.
pub struct Lowering<'e, R> {
    emitter: &'e mut Emitter<R>,
}

impl<'e, R: Rng> Lowering<'e, R> {
    pub fn new(emitter: &'e mut Emitter<R>) -> Self {
        Self { emitter }
    }

    fn assignment(&mut self, target: &str, value: &Expr) -> Result<(), CompileError> {
        match value {
            Expr::Atom(atom) => self.emitter.assign(target, atom),
            Expr::Dereference(atom) => self.emitter.dereference_store(target, atom),
            // `[N]` is N bytes, left uninitialized.
            Expr::ArrayLiteral(Atom::Int(size)) => {
                self.emitter.array_allocate(target, ElementWidth::U8, *size, None)?;
                Ok(())
            }
            Expr::ArrayLiteral(Atom::Register(_)) => Err(CompileError::UnsupportedNode {
                kind: "ArrayLiteral sized by a register",
            }),
            Expr::ArrayRepeat {
                initializer,
                count: Atom::Int(count),
            } => {
                // Without a suffix each element is a full register wide.
                let width = initializer.width.unwrap_or(ElementWidth::U64);
                self.emitter
                    .array_allocate(target, width, *count, Some(&initializer.value))?;
                Ok(())
            }
            Expr::ArrayRepeat {
                count: Atom::Register(_),
                ..
            } => Err(CompileError::UnsupportedNode {
                kind: "ArrayRepeat counted by a register",
            }),
            Expr::Assignment { .. } | Expr::ComparisonChain(_) | Expr::TypedAtom(_) => {
                Err(CompileError::UnsupportedNode { kind: value.kind() })
            }
        }
    }

    fn comparison(&mut self, links: &[ComparisonLink]) -> Result<(), CompileError> {
        let links = links.iter().map(range_link).collect::<Result<Vec<_>, _>>()?;
        self.emitter.constrain(&links)?;
        Ok(())
    }
}

fn range_link(link: &ComparisonLink) -> Result<RangeLink<'_>, CompileError> {
    match (link.left.as_atom(), link.right.as_atom()) {
        (Some(left), Some(right)) => Ok(RangeLink {
            left,
            op: link.op,
            right,
        }),
        (None, _) => Err(non_atom_operand(&link.left)),
        (_, None) => Err(non_atom_operand(&link.right)),
    }
}

fn non_atom_operand(operand: &Expr) -> CompileError {
    CompileError::unsupported_shape(format!("{} operand in a comparison", operand.kind()))
}

impl<R: Rng> TreeTransformer<Expr> for Lowering<'_, R> {
    type Output = Result<(), CompileError>;

    fn transform(&mut self, tree: &Expr) -> Self::Output {
        match tree {
            Expr::Assignment { target, value } => self.assignment(target, value),
            Expr::ComparisonChain(links) => self.comparison(links),
            Expr::Dereference(_)
            | Expr::ArrayLiteral(_)
            | Expr::ArrayRepeat { .. }
            | Expr::TypedAtom(_)
            | Expr::Atom(_) => Err(CompileError::UnsupportedNode { kind: tree.kind() }),
        }
    }
}
