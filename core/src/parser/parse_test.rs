use pretty_assertions::assert_eq;

use crate::parser::{
    Atom, ComparisonLink, ComparisonOp, ElementWidth, Expr, ParseErrorKind, TypedAtom, parse,
};

fn ast(source: &str) -> Expr {
    parse(source)
        .unwrap_or_else(|e| panic!("Statement parsing failed: {}\n{}", source, e))
        .expr
}

fn reg(name: &str) -> Expr {
    Expr::Atom(Atom::Register(name.to_string()))
}

fn int(value: i64) -> Expr {
    Expr::Atom(Atom::Int(value))
}

fn link(left: Expr, op: ComparisonOp, right: Expr) -> ComparisonLink {
    ComparisonLink { left, op, right }
}

#[test]
fn test_assignment() {
    assert_eq!(
        ast("rax = 4"),
        Expr::Assignment {
            target: "rax".to_string(),
            value: Box::new(int(4)),
        }
    );
    assert_eq!(
        ast("rdx=rbx"),
        Expr::Assignment {
            target: "rdx".to_string(),
            value: Box::new(reg("rbx")),
        }
    );
}

#[test]
fn test_single_comparison() {
    assert_eq!(
        ast("rax < 12"),
        Expr::ComparisonChain(vec![link(reg("rax"), ComparisonOp::Lt, int(12))])
    );
    assert_eq!(
        ast("-3 != rcx"),
        Expr::ComparisonChain(vec![link(int(-3), ComparisonOp::Neq, reg("rcx"))])
    );
}

#[test]
fn test_chained_comparison_shares_middle_operand() {
    assert_eq!(
        ast("0 <= rax < 7"),
        Expr::ComparisonChain(vec![
            link(int(0), ComparisonOp::Le, reg("rax")),
            link(reg("rax"), ComparisonOp::Lt, int(7)),
        ])
    );
    assert_eq!(
        ast("7 > rax >= 0"),
        Expr::ComparisonChain(vec![
            link(int(7), ComparisonOp::Gt, reg("rax")),
            link(reg("rax"), ComparisonOp::Ge, int(0)),
        ])
    );
}

#[test]
fn test_long_chain_is_still_parsed() {
    // Rejected later by the visitor, not by the grammar.
    let Expr::ComparisonChain(links) = ast("0 < rax < 5 < 9") else {
        panic!("expected a comparison chain");
    };
    assert_eq!(links.len(), 3);
}

#[test]
fn test_dereference() {
    assert_eq!(
        ast("rax = *4"),
        Expr::Assignment {
            target: "rax".to_string(),
            value: Box::new(Expr::Dereference(Atom::Int(4))),
        }
    );
}

#[test]
fn test_arrays() {
    assert_eq!(
        ast("rax = [17]"),
        Expr::Assignment {
            target: "rax".to_string(),
            value: Box::new(Expr::ArrayLiteral(Atom::Int(17))),
        }
    );
    assert_eq!(
        ast("rax = [0;17]"),
        Expr::Assignment {
            target: "rax".to_string(),
            value: Box::new(Expr::ArrayRepeat {
                initializer: TypedAtom {
                    value: Atom::Int(0),
                    width: None,
                },
                count: Atom::Int(17),
            }),
        }
    );
    assert_eq!(
        ast("rax = [0u8;17]"),
        Expr::Assignment {
            target: "rax".to_string(),
            value: Box::new(Expr::ArrayRepeat {
                initializer: TypedAtom {
                    value: Atom::Int(0),
                    width: Some(ElementWidth::U8),
                },
                count: Atom::Int(17),
            }),
        }
    );
}

#[test]
fn test_whitespace_is_insignificant() {
    assert_eq!(ast("rax=[0u32;17]"), ast("  rax = [ 0u32 ; 17 ]  "));
    assert_eq!(ast("0<=rax<7"), ast("0 <= rax < 7"));
    assert_eq!(ast("rax\t=\n*4"), ast("rax = *4"));
}

#[test]
fn test_hex_literals() {
    assert_eq!(ast("rax = 0x10"), ast("rax = 16"));
    assert_eq!(ast("rax < -0x1"), ast("rax < -1"));
}

#[test]
fn test_syntax_errors() {
    let err = parse("rax = ").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    assert_eq!(err.input, "rax = ");

    let err = parse("rax = 99999999999999999999").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::InvalidNumber {
            text: "99999999999999999999".to_string()
        }
    );
}
