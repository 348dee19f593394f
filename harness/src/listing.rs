//! Assembly listings handed to the assembler.
//!
//! A listing is the compiled prelude followed by the snippet under
//! measurement, wrapped in Intel-syntax directives. Snippets may use two
//! shorthands:
//!
//! - `|1` .. `|15`: a single nop instruction of that many bytes.
//! - `K*|instr|`: `instr;` repeated `K` times.

use core::fmt;

use nanoseed_core::Instruction;

/// Magic marker that starts the performance counters.
pub const PFC_START_ASM: &str = ".quad 0xE0B513B1C2813F04";
/// Magic marker that stops the performance counters.
pub const PFC_STOP_ASM: &str = ".quad 0xF0B513B1C2813F04";

/// Canonical multi-byte nop encodings, indexed by length - 1.
const NOPS: [&str; 15] = [
    "nop;",
    ".byte 0x66,0x90;",
    ".byte 0x0f,0x1f,0x00;",
    ".byte 0x0f,0x1f,0x40,0x00;",
    ".byte 0x0f,0x1f,0x44,0x00,0x00;",
    ".byte 0x66,0x0f,0x1f,0x44,0x00,0x00;",
    ".byte 0x0f,0x1f,0x80,0x00,0x00,0x00,0x00;",
    ".byte 0x0f,0x1f,0x84,0x00,0x00,0x00,0x00,0x00;",
    ".byte 0x66,0x0f,0x1f,0x84,0x00,0x00,0x00,0x00,0x00;",
    ".byte 0x66,0x2e,0x0f,0x1f,0x84,0x00,0x00,0x00,0x00,0x00;",
    ".byte 0x66,0x66,0x2e,0x0f,0x1f,0x84,0x00,0x00,0x00,0x00,0x00;",
    ".byte 0x66,0x66,0x66,0x2e,0x0f,0x1f,0x84,0x00,0x00,0x00,0x00,0x00;",
    ".byte 0x66,0x66,0x66,0x66,0x2e,0x0f,0x1f,0x84,0x00,0x00,0x00,0x00,0x00;",
    ".byte 0x66,0x66,0x66,0x66,0x66,0x2e,0x0f,0x1f,0x84,0x00,0x00,0x00,0x00,0x00;",
    ".byte 0x66,0x66,0x66,0x66,0x66,0x66,0x2e,0x0f,0x1f,0x84,0x00,0x00,0x00,0x00,0x00;",
];

/// Builder for a complete listing.
///
/// # Example
///
/// ```
/// use nanoseed_harness::Listing;
///
/// let prelude = nanoseed_core::compile("rax = 4").unwrap();
/// let listing = Listing::new().prelude(&prelude).body("add rax, rax");
/// assert_eq!(
///     listing.to_string(),
///     ".intel_syntax noprefix;mov rax, 4;add rax, rax;1:;.att_syntax prefix\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Listing {
    prelude: String,
    body: String,
    counters: bool,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends compiled instructions to the prelude.
    pub fn prelude<'a>(mut self, instructions: impl IntoIterator<Item = &'a Instruction>) -> Self {
        for instruction in instructions {
            self.prelude.push_str(&instruction.to_string());
        }
        self
    }

    /// Sets the snippet under measurement, expanding nop and repeat
    /// shorthands.
    pub fn body(mut self, code: &str) -> Self {
        self.body = expand_shorthands(code);
        self
    }

    /// Brackets the snippet with the counter start and stop markers.
    pub fn counters(mut self, enabled: bool) -> Self {
        self.counters = enabled;
        self
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(".intel_syntax noprefix;")?;
        f.write_str(&self.prelude)?;
        if self.counters {
            write!(f, "{PFC_START_ASM};{};{PFC_STOP_ASM}", self.body)?;
        } else {
            f.write_str(&self.body)?;
        }
        f.write_str(";1:;.att_syntax prefix\n")
    }
}

/// Expands `|N` nops, then `K*|instr|` repetitions.
pub fn expand_shorthands(code: &str) -> String {
    if !code.contains('|') {
        return code.to_string();
    }
    expand_repeats(&expand_nops(code))
}

fn expand_repeats(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut rest = code;
    while let Some(star) = rest.find("*|") {
        let digits = rest[..star]
            .bytes()
            .rev()
            .take_while(u8::is_ascii_digit)
            .count();
        let body_start = star + 2;
        let repeat = rest[body_start..].find('|').and_then(|len| {
            let count: usize = rest[star - digits..star].parse().ok()?;
            Some((count, &rest[body_start..body_start + len], body_start + len + 1))
        });
        match repeat {
            Some((count, instr, end)) => {
                out.push_str(&rest[..star - digits]);
                for _ in 0..count {
                    out.push_str(instr);
                    out.push(';');
                }
                rest = &rest[end..];
            }
            None => {
                // Not a repetition; keep the text and look further on.
                out.push_str(&rest[..body_start]);
                rest = &rest[body_start..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn expand_nops(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut rest = code;
    while let Some(bar) = rest.find('|') {
        out.push_str(&rest[..bar]);
        let after = &rest[bar + 1..];
        match nop_length(after) {
            Some((len, digits)) => {
                out.push_str(NOPS[len - 1]);
                rest = &after[digits..];
            }
            None => {
                out.push('|');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The nop length at the start of `text` and how many digits it spans,
/// preferring two digits when they form 10..=15.
fn nop_length(text: &str) -> Option<(usize, usize)> {
    let digits: Vec<u32> = text.chars().take(2).map_while(|c| c.to_digit(10)).collect();
    match digits.as_slice() {
        [1, second @ 0..=5, ..] => Some((10 + *second as usize, 2)),
        [first @ 1..=9, ..] => Some((*first as usize, 1)),
        _ => None,
    }
}
