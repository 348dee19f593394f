//! Assembly emitter for constraint statements.
//!
//! The [`Emitter`] is the single owner of all mutable compile state: the pool
//! of free registers, the scratch-memory cursor and the instruction log. The
//! visitor in [`crate::visitor`] only decides *which* operation to call; every
//! allocation invariant is checked here.
//!
//! ## Design
//!
//! - Each operation validates everything before it mutates anything, so a
//!   failing call leaves the emitter exactly as it was.
//! - The random source used by the range solver is a type parameter, so tests
//!   and reproducible runs can inject a seeded generator.
//! - [`Checkpoint`]s let a [`crate::api::Session`] undo a whole statement.

mod error;
pub mod instruction;
pub mod memory;
pub mod range;
pub mod registers;


pub use error::CompileError;
pub use instruction::{Instruction, Operand, PtrWidth};
pub use memory::{MAX_CAPACITY, MemoryAllocator, Region};
pub use range::{Interval, RangeLink, Solution};
pub use registers::{Register, RegisterClass, RegisterPool};

use rand::Rng;
use rand::rngs::StdRng;

use crate::api::EmitterOptions;
use crate::parser::{Atom, ElementWidth};

/// Stateful backend for one compile session.
pub struct Emitter<R = StdRng> {
    registers: RegisterPool,
    memory: MemoryAllocator,
    instructions: Vec<Instruction>,
    rng: R,
}

/// Saved emitter state, restored when a statement fails half way.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    registers: RegisterPool,
    cursor: u64,
    instructions: usize,
}

impl<R: Rng> Emitter<R> {
    /// Creates an emitter with a full register pool and an empty scratch area.
    ///
    /// Fails if the configured base register is not a register.
    pub fn new(options: &EmitterOptions, rng: R) -> Result<Self, CompileError> {
        let base = Register::lookup(&options.base_register).ok_or_else(|| {
            CompileError::UnknownRegister {
                register: options.base_register.clone(),
            }
        })?;
        Ok(Self {
            registers: RegisterPool::new(base),
            memory: MemoryAllocator::new(base, options.granularity, options.scratch_size),
            instructions: Vec::new(),
            rng,
        })
    }

    pub fn registers(&self) -> &RegisterPool {
        &self.registers
    }

    pub fn memory(&self) -> &MemoryAllocator {
        &self.memory
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Finalize the session and return the emitted program.
    pub fn finish(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            registers: self.registers.clone(),
            cursor: self.memory.cursor(),
            instructions: self.instructions.len(),
        }
    }

    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.registers = checkpoint.registers;
        self.memory.rewind(checkpoint.cursor);
        self.instructions.truncate(checkpoint.instructions);
    }

    fn emit(&mut self, instruction: Instruction) {
        tracing::trace!(%instruction, "emit");
        self.instructions.push(instruction);
    }

    /// Resolves a source operand; registers must exist but are not consumed.
    fn source_operand(&self, value: &Atom) -> Result<Operand, CompileError> {
        match value {
            Atom::Int(value) => Ok(Operand::Immediate(*value)),
            Atom::Register(name) => Register::lookup(name)
                .map(Operand::Register)
                .ok_or_else(|| CompileError::UnknownRegister {
                    register: name.clone(),
                }),
        }
    }

    // === Register Allocation ===

    /// `register = value`: takes `register` out of the pool and emits
    /// `mov register, value`.
    pub fn assign(&mut self, register: &str, value: &Atom) -> Result<(), CompileError> {
        let target = self.registers.check_free(register)?;
        let src = self.source_operand(value)?;
        self.registers.take(target)?;
        tracing::debug!(register = target.name, value = %src, "assign");
        self.emit(Instruction::Mov {
            dst: Operand::Register(target),
            src,
        });
        Ok(())
    }

    // === Memory Allocation ===

    /// Points `register` at a fresh block of at least `bytes` bytes:
    /// `mov register, base` then `sub register, cursor`.
    pub fn allocate(&mut self, register: &str, bytes: u64) -> Result<Region, CompileError> {
        self.allocate_pointer(register, bytes).map(|(_, region)| region)
    }

    fn allocate_pointer(
        &mut self,
        register: &str,
        bytes: u64,
    ) -> Result<(Register, Region), CompileError> {
        let target = self.registers.check_free(register)?;
        if target.class != RegisterClass::GeneralPurpose {
            return Err(CompileError::unsupported_shape(format!(
                "'{target}' cannot hold a scratch pointer"
            )));
        }
        let region = self.memory.allocate(bytes)?;
        self.registers.take(target)?;

        let base = self.memory.base();
        self.emit(Instruction::Mov {
            dst: Operand::Register(target),
            src: Operand::Register(base),
        });
        self.emit(Instruction::Sub {
            dst: Operand::Register(target),
            // The allocator never hands out offsets beyond i32::MAX.
            src: Operand::Immediate(region.offset as i64),
        });
        Ok((target, region))
    }

    /// `register = *value`: one granularity-sized block holding `value`.
    pub fn dereference_store(&mut self, register: &str, value: &Atom) -> Result<(), CompileError> {
        let src = self.source_operand(value)?;
        let granularity = self.memory.granularity();
        let (base, region) = self.allocate_pointer(register, granularity)?;
        tracing::debug!(register, offset = region.offset, value = %src, "dereference store");
        self.emit(Instruction::Mov {
            dst: Operand::Memory {
                base,
                offset: 0,
                width: None,
            },
            src,
        });
        Ok(())
    }

    /// Allocates `count` elements of `width` bytes, storing `initializer` into
    /// each one when given.
    pub fn array_allocate(
        &mut self,
        register: &str,
        width: ElementWidth,
        count: i64,
        initializer: Option<&Atom>,
    ) -> Result<Region, CompileError> {
        if count <= 0 {
            return Err(CompileError::InvalidArraySize { size: count });
        }
        let count = count as u64;
        let element = width.bytes();

        let src = initializer
            .map(|value| self.initializer_operand(value, width))
            .transpose()?;

        let bytes = count
            .checked_mul(element)
            .ok_or(CompileError::ScratchExhausted {
                requested: u64::MAX,
                cursor: self.memory.cursor(),
                capacity: self.memory.capacity(),
            })?;
        let (base, region) = self.allocate_pointer(register, bytes)?;
        tracing::debug!(register, count, element, offset = region.offset, "array");

        if let Some(src) = src {
            for i in 0..count {
                self.emit(Instruction::Mov {
                    dst: Operand::Memory {
                        base,
                        offset: i * element,
                        width: Some(PtrWidth::from(width)),
                    },
                    src: src.clone(),
                });
            }
        }
        Ok(region)
    }

    /// Source operand for an array element store of the given width.
    fn initializer_operand(
        &self,
        value: &Atom,
        width: ElementWidth,
    ) -> Result<Operand, CompileError> {
        match self.source_operand(value)? {
            Operand::Immediate(v) if fits_element(v, width) => Ok(Operand::Immediate(v)),
            Operand::Immediate(v) => Err(CompileError::InitializerOutOfRange { value: v, width }),
            Operand::Register(register)
                if width == ElementWidth::U64
                    && register.class == RegisterClass::GeneralPurpose =>
            {
                Ok(Operand::Register(register))
            }
            _ => Err(CompileError::unsupported_shape(format!(
                "register initializer '{value}' for {} elements",
                width.suffix()
            ))),
        }
    }

    // === Range Constraints ===

    /// Solves a 1-2 link comparison chain, picks a value uniformly from the
    /// admissible interval and assigns it to the constrained register.
    pub fn constrain(&mut self, links: &[RangeLink<'_>]) -> Result<i64, CompileError> {
        let solution = range::solve(links)?;
        // Check the register before drawing so a failure leaves the rng untouched.
        self.registers.check_free(solution.register)?;
        let value = solution.interval.sample(&mut self.rng);
        tracing::debug!(
            register = solution.register,
            low = solution.interval.low(),
            high = solution.interval.high(),
            value,
            "solved range"
        );
        self.assign(solution.register, &Atom::Int(value))?;
        Ok(value)
    }
}

/// Whether `value` fits an element of `width`, read either signed or unsigned.
fn fits_element(value: i64, width: ElementWidth) -> bool {
    if width == ElementWidth::U64 {
        return true;
    }
    let bits = width.bytes() * 8;
    let min = -(1i128 << (bits - 1));
    let max = (1i128 << bits) - 1;
    (min..=max).contains(&i128::from(value))
}
