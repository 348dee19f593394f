//! Host-side plumbing around compiled preludes.
//!
//! This crate turns a prelude and a snippet into an assembly [`Listing`],
//! drives the assembler through a [`Toolchain`], reads the scratch region
//! layout the benchmark kernel module publishes ([`HostConfig`]) and puts
//! the kernel into measurement mode with a [`KernelGuard`].
//!
//! External programs are always started through a [`CommandRunner`], and
//! host files are accessed through [`HostFs`], so everything here can be
//! tested without root or a real machine.

mod error;
pub mod host;
pub mod kernel;
pub mod listing;
pub mod tools;

pub use error::HarnessError;
pub use host::{HostConfig, HostFs, SysFs};
pub use kernel::{KernelGuard, set_smt, smt_active};
pub use listing::{Listing, PFC_START_ASM, PFC_STOP_ASM, expand_shorthands};
pub use tools::{CommandRunner, Invocation, ProcessRunner, REQUIRED_TOOLS, ToolOutput, Toolchain};
