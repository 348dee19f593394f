//! Host filesystem access and the configuration the benchmark kernel module
//! exposes under `/sys/nb`.

use std::path::Path;

use hashbrown::HashMap;
use nanoseed_core::EmitterOptions;

use crate::HarnessError;
use crate::tools::{CommandRunner, Invocation};

pub const SCRATCH_SIZE_PATH: &str = "/sys/nb/r14_size";
pub const ADDRESSES_PATH: &str = "/sys/nb/addresses";

/// Reads and writes host files, optionally with elevated rights.
pub trait HostFs {
    fn read(&self, path: &Path, elevated: bool) -> Result<String, HarnessError>;
    fn write(&self, path: &Path, contents: &str, elevated: bool) -> Result<(), HarnessError>;
}

/// The real filesystem. Elevated access goes through `cat` and `tee` run by
/// the command runner.
#[derive(Debug, Clone)]
pub struct SysFs<R> {
    runner: R,
}

impl<R: CommandRunner> SysFs<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> HostFs for SysFs<R> {
    fn read(&self, path: &Path, elevated: bool) -> Result<String, HarnessError> {
        if !elevated {
            return std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e));
        }
        let cat = Invocation::new(["cat".to_string(), path.to_string_lossy().into_owned()]);
        Ok(self.runner.run(&cat.elevated())?.check("cat")?.output)
    }

    fn write(&self, path: &Path, contents: &str, elevated: bool) -> Result<(), HarnessError> {
        tracing::debug!(path = %path.display(), contents, elevated, "write");
        if !elevated {
            return std::fs::write(path, contents).map_err(|e| HarnessError::io(path, e));
        }
        // tee echoes its input; only the exit status matters.
        let tee = Invocation::new(["tee".to_string(), path.to_string_lossy().into_owned()]);
        self.runner
            .run(&tee.elevated().input(contents))?
            .check("tee")?;
        Ok(())
    }
}

/// Scratch region size and register addresses published by the kernel
/// module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostConfig {
    /// Size of the region below `r14`, in bytes.
    pub scratch_size: u64,
    /// Address held by each register the module sets up, keyed by upper-case
    /// register name.
    pub addresses: HashMap<String, u64>,
}

impl HostConfig {
    pub fn discover(fs: &impl HostFs) -> Result<Self, HarnessError> {
        let scratch_size =
            parse_scratch_size(&fs.read(Path::new(SCRATCH_SIZE_PATH), false)?)?;
        let addresses = parse_addresses(&fs.read(Path::new(ADDRESSES_PATH), false)?)?;
        tracing::debug!(scratch_size, registers = addresses.len(), "host config");
        Ok(Self {
            scratch_size,
            addresses,
        })
    }

    /// Address stored in `register` (`r14`, `rdi`, `rsi`, `rbp` or `rsp`).
    pub fn address(&self, register: &str) -> Option<u64> {
        self.addresses.get(&register.to_ascii_uppercase()).copied()
    }

    /// Emitter settings matching the host's scratch region.
    pub fn emitter_options(&self) -> EmitterOptions {
        EmitterOptions {
            base_register: "r14".to_string(),
            scratch_size: self.scratch_size,
            ..EmitterOptions::default()
        }
    }
}

/// `r14_size` reads like `R14 size: 128 MB`; the third field is the size in
/// megabytes.
fn parse_scratch_size(text: &str) -> Result<u64, HarnessError> {
    let malformed = |message: &str| HarnessError::malformed(SCRATCH_SIZE_PATH, message);
    let megabytes: u64 = text
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(2))
        .ok_or_else(|| malformed("missing size field"))?
        .parse()
        .map_err(|_| malformed("size is not a number"))?;
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| malformed("size overflows"))
}

/// One `REG: 0xADDRESS` pair per line.
fn parse_addresses(text: &str) -> Result<HashMap<String, u64>, HarnessError> {
    let mut addresses = HashMap::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let (register, address) = line
            .split_once(": ")
            .ok_or_else(|| HarnessError::malformed(ADDRESSES_PATH, format!("bad line '{line}'")))?;
        let hex = address.trim_start_matches("0x");
        let address = u64::from_str_radix(hex, 16).map_err(|_| {
            HarnessError::malformed(ADDRESSES_PATH, format!("bad address '{address}'"))
        })?;
        addresses.insert(register.to_ascii_uppercase(), address);
    }
    Ok(addresses)
}
