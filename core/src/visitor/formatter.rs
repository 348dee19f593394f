use core::fmt::{self, Write};

use super::TreeTransformer;
use crate::parser::Expr;

/// Renders a statement in canonical form: single spaces around operators,
/// `; ` inside repeated arrays, lower-case suffixes.
#[derive(Debug, Default)]
pub struct Formatter {
    out: String,
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format one tree.
    pub fn format(tree: &Expr) -> String {
        Formatter::new().transform(tree)
    }

    fn write_expr(&mut self, expr: &Expr) -> fmt::Result {
        match expr {
            Expr::Assignment { target, value } => {
                write!(self.out, "{target} = ")?;
                self.write_expr(value)
            }
            Expr::ComparisonChain(links) => {
                if let Some(first) = links.first() {
                    self.write_expr(&first.left)?;
                }
                for link in links {
                    write!(self.out, " {} ", link.op)?;
                    self.write_expr(&link.right)?;
                }
                Ok(())
            }
            Expr::Dereference(atom) => write!(self.out, "*{atom}"),
            Expr::ArrayLiteral(atom) => write!(self.out, "[{atom}]"),
            Expr::ArrayRepeat { initializer, count } => {
                write!(self.out, "[{initializer}; {count}]")
            }
            Expr::TypedAtom(typed) => write!(self.out, "{typed}"),
            Expr::Atom(atom) => write!(self.out, "{atom}"),
        }
    }
}

impl TreeTransformer<Expr> for Formatter {
    type Output = String;

    fn transform(&mut self, tree: &Expr) -> Self::Output {
        self.out.clear();
        // Writing into a String cannot fail.
        let _ = self.write_expr(tree);
        core::mem::take(&mut self.out)
    }
}
