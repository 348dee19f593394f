//! Bump allocation inside the pre-reserved scratch region.
//!
//! The region sits below the base register's address. Every request moves the
//! cursor further away from the base and nothing is ever freed, so regions
//! handed out within one session never overlap.

use crate::emitter::CompileError;
use crate::emitter::registers::Register;

/// A block of scratch memory at `[base - offset, base - offset + len)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Region {
    /// Distance below the base address where the block starts.
    pub offset: u64,
    pub len: u64,
}

impl Region {
    /// Distance below the base of the first byte past the block.
    pub fn end_offset(&self) -> u64 {
        self.offset - self.len
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.end_offset() < other.offset && other.end_offset() < self.offset
    }
}

/// Largest offset `sub r64, imm32` can encode.
pub const MAX_CAPACITY: u64 = i32::MAX as u64;

#[derive(Debug, Clone)]
pub struct MemoryAllocator {
    base: Register,
    cursor: u64,
    granularity: u64,
    capacity: u64,
}

impl MemoryAllocator {
    /// `capacity` is clamped to `i32::MAX`: offsets are encoded as sign-extended
    /// 32-bit immediates and displacements.
    pub fn new(base: Register, granularity: u64, capacity: u64) -> Self {
        Self {
            base,
            cursor: 0,
            granularity: granularity.max(1),
            capacity: capacity.min(MAX_CAPACITY),
        }
    }

    pub fn base(&self) -> Register {
        self.base
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn granularity(&self) -> u64 {
        self.granularity
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Reserves `max(requested, granularity)` bytes below everything handed
    /// out so far. The cursor is left untouched on failure.
    pub fn allocate(&mut self, requested: u64) -> Result<Region, CompileError> {
        let len = requested.max(self.granularity);
        let cursor = self
            .cursor
            .checked_add(len)
            .filter(|&cursor| cursor <= self.capacity)
            .ok_or(CompileError::ScratchExhausted {
                requested: len,
                cursor: self.cursor,
                capacity: self.capacity,
            })?;
        self.cursor = cursor;
        tracing::debug!(base = self.base.name, offset = cursor, len, "allocate");
        Ok(Region {
            offset: cursor,
            len,
        })
    }

    /// Rewinds to an earlier cursor; used only to undo a failed statement.
    pub(crate) fn rewind(&mut self, cursor: u64) {
        debug_assert!(cursor <= self.cursor, "rewind must not move forward");
        self.cursor = cursor;
    }
}
