//! Register names and the per-session pool of assignable registers.

use core::fmt;

use hashbrown::{HashMap, HashSet};
use lazy_static::lazy_static;

use crate::emitter::CompileError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RegisterClass {
    /// 64-bit general purpose registers.
    GeneralPurpose,
    /// 128-bit SSE registers.
    Xmm,
    /// 256-bit AVX registers.
    Ymm,
    /// 512-bit AVX-512 registers.
    Zmm,
}

impl RegisterClass {
    pub fn bits(self) -> u32 {
        match self {
            RegisterClass::GeneralPurpose => 64,
            RegisterClass::Xmm => 128,
            RegisterClass::Ymm => 256,
            RegisterClass::Zmm => 512,
        }
    }
}

const GENERAL_PURPOSE: &[&str] = &[
    "rax", "rbx", "rcx", "rdx", "rsi", "rdi", "rbp", "rsp", "r8", "r9", "r10", "r11", "r12",
    "r13", "r14", "r15",
];

const XMM: &[&str] = &[
    "xmm0", "xmm1", "xmm2", "xmm3", "xmm4", "xmm5", "xmm6", "xmm7", "xmm8", "xmm9", "xmm10",
    "xmm11", "xmm12", "xmm13", "xmm14", "xmm15",
];

const YMM: &[&str] = &[
    "ymm0", "ymm1", "ymm2", "ymm3", "ymm4", "ymm5", "ymm6", "ymm7", "ymm8", "ymm9", "ymm10",
    "ymm11", "ymm12", "ymm13", "ymm14", "ymm15",
];

const ZMM: &[&str] = &[
    "zmm0", "zmm1", "zmm2", "zmm3", "zmm4", "zmm5", "zmm6", "zmm7", "zmm8", "zmm9", "zmm10",
    "zmm11", "zmm12", "zmm13", "zmm14", "zmm15", "zmm16", "zmm17", "zmm18", "zmm19", "zmm20",
    "zmm21", "zmm22", "zmm23", "zmm24", "zmm25", "zmm26", "zmm27", "zmm28", "zmm29", "zmm30",
    "zmm31",
];

/// The stack pointer is a valid operand but never handed out.
const NEVER_ALLOCATABLE: &[&str] = &["rsp"];

lazy_static! {
    static ref REGISTERS: HashMap<&'static str, RegisterClass> = {
        let mut table = HashMap::new();
        for (names, class) in [
            (GENERAL_PURPOSE, RegisterClass::GeneralPurpose),
            (XMM, RegisterClass::Xmm),
            (YMM, RegisterClass::Ymm),
            (ZMM, RegisterClass::Zmm),
        ] {
            for &name in names {
                table.insert(name, class);
            }
        }
        table
    };
}

/// A recognized machine register.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Register {
    pub name: &'static str,
    pub class: RegisterClass,
}

impl Register {
    /// Looks up a register by name, ignoring ASCII case.
    pub fn lookup(name: &str) -> Option<Register> {
        let lowered = name.to_ascii_lowercase();
        REGISTERS
            .get_key_value(lowered.as_str())
            .map(|(&name, &class)| Register { name, class })
    }

    /// Every recognized register name, general purpose first.
    pub fn names() -> impl Iterator<Item = &'static str> {
        [GENERAL_PURPOSE, XMM, YMM, ZMM].into_iter().flatten().copied()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Registers still free in the current session.
///
/// Registers leave the pool when assigned and never come back: there is no
/// spilling, renaming or reuse.
#[derive(Debug, Clone)]
pub struct RegisterPool {
    free: HashSet<&'static str>,
}

impl RegisterPool {
    /// A full pool minus `reserved` (the memory base register).
    pub fn new(reserved: Register) -> Self {
        let free = REGISTERS
            .keys()
            .copied()
            .filter(|name| *name != reserved.name && !NEVER_ALLOCATABLE.contains(name))
            .collect();
        Self { free }
    }

    pub fn is_free(&self, register: Register) -> bool {
        self.free.contains(register.name)
    }

    /// Resolves `name` to a register that is still free, without taking it.
    pub fn check_free(&self, name: &str) -> Result<Register, CompileError> {
        match Register::lookup(name) {
            Some(register) if self.is_free(register) => Ok(register),
            _ => Err(CompileError::RegisterNotFree {
                register: name.to_string(),
            }),
        }
    }

    /// Removes `register` from the pool.
    pub fn take(&mut self, register: Register) -> Result<(), CompileError> {
        if self.free.remove(register.name) {
            Ok(())
        } else {
            Err(CompileError::RegisterNotFree {
                register: register.name.to_string(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Number of free registers in `class`.
    pub fn free_in(&self, class: RegisterClass) -> usize {
        self.free
            .iter()
            .filter(|name| REGISTERS.get(*name) == Some(&class))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r14() -> Register {
        Register::lookup("r14").unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let rax = Register::lookup("RAX").unwrap();
        assert_eq!(rax.name, "rax");
        assert_eq!(rax.class, RegisterClass::GeneralPurpose);
        assert_eq!(Register::lookup("Ymm7").unwrap().class, RegisterClass::Ymm);
        assert_eq!(Register::lookup("zmm31").unwrap().class.bits(), 512);
        assert!(Register::lookup("zmm32").is_none());
        assert!(Register::lookup("foo").is_none());
    }

    #[test]
    fn test_names_cover_every_register() {
        let names: Vec<_> = Register::names().collect();
        assert_eq!(names.len(), REGISTERS.len());
        assert_eq!(names[0], "rax");
        assert!(names.iter().all(|name| Register::lookup(name).is_some()));
    }

    #[test]
    fn test_pool_excludes_base_and_stack_pointer() {
        let pool = RegisterPool::new(r14());
        assert!(!pool.is_free(r14()));
        assert!(!pool.is_free(Register::lookup("rsp").unwrap()));
        assert!(pool.is_free(Register::lookup("r15").unwrap()));
        assert_eq!(pool.free_in(RegisterClass::GeneralPurpose), 14);
        assert_eq!(pool.free_in(RegisterClass::Xmm), 16);
        assert_eq!(pool.free_in(RegisterClass::Ymm), 16);
        assert_eq!(pool.free_in(RegisterClass::Zmm), 32);
        assert_eq!(pool.len(), 14 + 16 + 16 + 32);
    }

    #[test]
    fn test_take_twice_fails() {
        let mut pool = RegisterPool::new(r14());
        let rax = pool.check_free("rax").unwrap();
        pool.take(rax).unwrap();
        assert!(!pool.is_free(rax));
        assert_eq!(
            pool.take(rax),
            Err(CompileError::RegisterNotFree {
                register: "rax".to_string()
            })
        );
        assert!(matches!(
            pool.check_free("rax"),
            Err(CompileError::RegisterNotFree { .. })
        ));
    }

    #[test]
    fn test_unknown_names_are_not_free() {
        let pool = RegisterPool::new(r14());
        assert!(matches!(
            pool.check_free("eax"),
            Err(CompileError::RegisterNotFree { .. })
        ));
        assert!(matches!(
            pool.check_free("r14"),
            Err(CompileError::RegisterNotFree { .. })
        ));
    }
}
