#![allow(dead_code)]

use nanoseed::{CompileOptions, Instruction};
use once_cell::sync::Lazy;

/// What a statement must compile to.
pub enum Expected {
    /// Exactly these lines.
    Exact(Vec<&'static str>),
    /// A single `mov register, v;` with `v` in `[low, high]`.
    MovInRange {
        register: &'static str,
        low: i64,
        high: i64,
    },
    /// `mov reg, base; sub reg, bytes;` followed by these stores.
    Allocation {
        register: &'static str,
        bytes: u64,
        stores: Vec<String>,
    },
}

pub struct TestCase {
    pub name: &'static str,
    pub statement: &'static str,
    pub expected: Expected,
}

pub static SCENARIOS: Lazy<Vec<TestCase>> = Lazy::new(|| {
    vec![
        TestCase {
            name: "plain_assignment",
            statement: "rax = 4",
            expected: Expected::Exact(vec!["mov rax, 4;"]),
        },
        TestCase {
            name: "single_upper_bound",
            statement: "rax < 12",
            expected: Expected::MovInRange {
                register: "rax",
                low: 0,
                high: 11,
            },
        },
        TestCase {
            name: "ascending_chain",
            statement: "0 <= rax < 7",
            expected: Expected::MovInRange {
                register: "rax",
                low: 0,
                high: 6,
            },
        },
        TestCase {
            name: "descending_chain",
            statement: "7 > rax >= 0",
            expected: Expected::MovInRange {
                register: "rax",
                low: 0,
                high: 6,
            },
        },
        TestCase {
            name: "dereference",
            statement: "rax = *4",
            expected: Expected::Allocation {
                register: "rax",
                bytes: 8,
                stores: vec!["mov [rax], 4;".to_string()],
            },
        },
        TestCase {
            name: "byte_array",
            statement: "rax = [0u8;17]",
            expected: Expected::Allocation {
                register: "rax",
                bytes: 17,
                stores: (0..17)
                    .map(|i| match i {
                        0 => "mov byte ptr [rax], 0;".to_string(),
                        i => format!("mov byte ptr [rax + {i}], 0;"),
                    })
                    .collect(),
            },
        },
        TestCase {
            name: "hex_assignment",
            statement: "RBX = 0xff",
            expected: Expected::Exact(vec!["mov rbx, 255;"]),
        },
        TestCase {
            name: "register_copy",
            statement: "rcx = rdx",
            expected: Expected::Exact(vec!["mov rcx, rdx;"]),
        },
        TestCase {
            name: "equality",
            statement: "r9 == -3",
            expected: Expected::Exact(vec!["mov r9, -3;"]),
        },
        TestCase {
            name: "negative_lower_bound",
            statement: "rsi > -5",
            expected: Expected::MovInRange {
                register: "rsi",
                low: -4,
                high: 0,
            },
        },
        TestCase {
            name: "uninitialized_bytes",
            statement: "rdi = [3]",
            expected: Expected::Allocation {
                register: "rdi",
                bytes: 8,
                stores: vec![],
            },
        },
        TestCase {
            name: "dword_array",
            statement: "r8 = [7u32; 2]",
            expected: Expected::Allocation {
                register: "r8",
                bytes: 8,
                stores: vec![
                    "mov dword ptr [r8], 7;".to_string(),
                    "mov dword ptr [r8 + 4], 7;".to_string(),
                ],
            },
        },
    ]
});

pub fn seeded(seed: u64) -> CompileOptions {
    CompileOptions {
        seed: Some(seed),
        ..CompileOptions::default()
    }
}

pub fn render(instructions: &[Instruction]) -> Vec<String> {
    instructions.iter().map(ToString::to_string).collect()
}

/// The immediate of a `mov register, v;` line.
pub fn mov_value(line: &str, register: &str) -> i64 {
    line.strip_prefix(&format!("mov {register}, "))
        .and_then(|rest| rest.strip_suffix(';'))
        .and_then(|value| value.parse().ok())
        .unwrap_or_else(|| panic!("not a mov of an immediate into {register}: {line}"))
}
