use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::api::EmitterOptions;
use crate::emitter::{CompileError, Emitter};
use crate::parser::parse;

fn lower(source: &str) -> Result<Vec<String>, CompileError> {
    let mut emitter = Emitter::new(&EmitterOptions::default(), StdRng::seed_from_u64(5))?;
    let statement = parse(source).unwrap();
    Lowering::new(&mut emitter).transform(&statement.expr)?;
    Ok(emitter
        .instructions()
        .iter()
        .map(ToString::to_string)
        .collect())
}

fn canonical(source: &str) -> String {
    Formatter::format(&parse(source).unwrap().expr)
}

#[test]
fn test_lower_assignment() {
    assert_eq!(lower("rax = 4").unwrap(), vec!["mov rax, 4;"]);
    assert_eq!(lower("rax = rbx").unwrap(), vec!["mov rax, rbx;"]);
    assert_eq!(lower("R8 = 0x10").unwrap(), vec!["mov r8, 16;"]);
}

#[test]
fn test_lower_dereference() {
    assert_eq!(
        lower("rax = *4").unwrap(),
        vec!["mov rax, r14;", "sub rax, 8;", "mov [rax], 4;"]
    );
}

#[test]
fn test_lower_byte_array() {
    assert_eq!(
        lower("rdi = [32]").unwrap(),
        vec!["mov rdi, r14;", "sub rdi, 32;"]
    );
}

#[test]
fn test_lower_repeat_defaults_to_full_width() {
    assert_eq!(
        lower("rsi = [7; 2]").unwrap(),
        vec![
            "mov rsi, r14;",
            "sub rsi, 16;",
            "mov qword ptr [rsi], 7;",
            "mov qword ptr [rsi + 8], 7;",
        ]
    );
}

#[test]
fn test_lower_repeat_with_suffix() {
    let lines = lower("rax = [0u8;17]").unwrap();
    assert_eq!(lines.len(), 19);
    assert_eq!(lines[18], "mov byte ptr [rax + 16], 0;");
}

#[test]
fn test_lower_comparisons() {
    for source in ["rax < 12", "12 > rax", "0 <= rax < 12", "11 >= rax >= 0"] {
        let lines = lower(source).unwrap();
        assert_eq!(lines.len(), 1, "{source}");
        let value: i64 = lines[0]
            .strip_prefix("mov rax, ")
            .and_then(|rest| rest.strip_suffix(';'))
            .unwrap()
            .parse()
            .unwrap();
        assert!((0..=11).contains(&value), "{source} gave {value}");
    }
    assert_eq!(lower("rcx == -9").unwrap(), vec!["mov rcx, -9;"]);
}

#[test]
fn test_lower_rejects_unsupported_nodes() {
    assert_eq!(
        lower("rax = [rbx]"),
        Err(CompileError::UnsupportedNode {
            kind: "ArrayLiteral sized by a register"
        })
    );
    assert_eq!(
        lower("rax = [1; rcx]"),
        Err(CompileError::UnsupportedNode {
            kind: "ArrayRepeat counted by a register"
        })
    );
}

#[test]
fn test_lower_rejects_non_atom_comparison_operands() {
    assert!(matches!(
        lower("*rax < 4"),
        Err(CompileError::UnsupportedShape { shape }) if shape.contains("Dereference")
    ));
    assert!(matches!(
        lower("rax < [4]"),
        Err(CompileError::UnsupportedShape { shape }) if shape.contains("ArrayLiteral")
    ));
}

#[test]
fn test_lower_comparison_errors() {
    assert!(matches!(
        lower("0 < rax > 7"),
        Err(CompileError::InconsistentDirection { .. })
    ));
    assert!(matches!(
        lower("5 < rax < 5"),
        Err(CompileError::EmptyRange { .. })
    ));
    assert!(matches!(
        lower("0 < rax < rbx"),
        Err(CompileError::UnsupportedShape { .. })
    ));
    assert!(matches!(
        lower("0 < rax < 4 < 9"),
        Err(CompileError::UnsupportedShape { .. })
    ));
}

#[test]
fn test_lowering_standalone_values_is_unsupported() {
    let mut emitter = Emitter::new(&EmitterOptions::default(), StdRng::seed_from_u64(0)).unwrap();
    let mut lowering = Lowering::new(&mut emitter);
    let atom = crate::parser::Expr::Atom(crate::parser::Atom::Int(1));
    assert_eq!(
        lowering.transform(&atom),
        Err(CompileError::UnsupportedNode { kind: "Atom" })
    );
}

#[test]
fn test_formatter_canonical_text() {
    assert_eq!(canonical("rax=4"), "rax = 4");
    assert_eq!(canonical("rax   =  *  rbx"), "rax = *rbx");
    assert_eq!(canonical("rax=[0u8;17]"), "rax = [0u8; 17]");
    assert_eq!(canonical("rax = [ 0x20 ]"), "rax = [32]");
    assert_eq!(canonical("7>rax>=0"), "7 > rax >= 0");
    assert_eq!(canonical("rax!=-3"), "rax != -3");
}

#[test]
fn test_formatter_output_reparses_to_same_tree() {
    for source in ["rbx = [5u32; 3]", "0 <= rax < 7", "rcx = *-1"] {
        let tree = parse(source).unwrap().expr;
        let text = Formatter::format(&tree);
        assert_eq!(parse(&text).unwrap().expr, tree, "{text}");
    }
}
