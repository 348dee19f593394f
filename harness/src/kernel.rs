//! Kernel settings that must be adjusted while measuring.
//!
//! Acquiring a [`KernelGuard`] enables user-space `rdpmc`, loads the `msr`
//! module, unloads the iTCO watchdog modules and turns off the NMI watchdog.
//! The previous `rdpmc` and NMI watchdog values are written back on
//! [`KernelGuard::release`] or when the guard is dropped.

use std::path::Path;

use crate::HarnessError;
use crate::host::HostFs;
use crate::tools::{CommandRunner, Invocation};

pub const RDPMC_PATH: &str = "/sys/bus/event_source/devices/cpu/rdpmc";
pub const NMI_WATCHDOG_PATH: &str = "/proc/sys/kernel/nmi_watchdog";
pub const SMT_ACTIVE_PATH: &str = "/sys/devices/system/cpu/smt/active";
pub const SMT_CONTROL_PATH: &str = "/sys/devices/system/cpu/smt/control";

/// Holds the kernel in measurement mode until released.
pub struct KernelGuard<'a, F: HostFs, R: CommandRunner> {
    fs: &'a F,
    runner: &'a R,
    saved: Vec<(&'static str, String)>,
}

impl<'a, F: HostFs, R: CommandRunner> KernelGuard<'a, F, R> {
    pub fn acquire(fs: &'a F, runner: &'a R) -> Result<Self, HarnessError> {
        let mut guard = Self {
            fs,
            runner,
            saved: Vec::new(),
        };

        guard.set(RDPMC_PATH, "2")?;
        guard.modprobe(&["msr"]);
        guard.modprobe(&["-r", "iTCO_wdt"]);
        guard.modprobe(&["-r", "iTCO_vendor_support"]);
        guard.set(NMI_WATCHDOG_PATH, "0")?;
        Ok(guard)
    }

    /// Restores every saved setting, reporting the first failure.
    pub fn release(mut self) -> Result<(), HarnessError> {
        self.restore()
    }

    fn set(&mut self, path: &'static str, value: &str) -> Result<(), HarnessError> {
        let previous = self.fs.read(Path::new(path), false)?;
        self.fs.write(Path::new(path), value, true)?;
        self.saved.push((path, previous.trim().to_string()));
        Ok(())
    }

    // Module changes are not fatal; the module may be built in or absent.
    fn modprobe(&self, args: &[&str]) {
        let argv = ["modprobe", "--first-time"].into_iter().chain(args.iter().copied());
        let result = self.runner.run(&Invocation::new(argv).elevated());
        match result {
            Ok(output) if output.success() => {}
            Ok(output) => {
                tracing::warn!(?args, output = output.output.trim(), "modprobe failed")
            }
            Err(err) => tracing::warn!(?args, %err, "modprobe failed"),
        }
    }

    fn restore(&mut self) -> Result<(), HarnessError> {
        let mut first_error = None;
        // Last in, first out.
        while let Some((path, value)) = self.saved.pop() {
            if let Err(err) = self.fs.write(Path::new(path), &value, true) {
                tracing::warn!(path, %err, "restore failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl<F: HostFs, R: CommandRunner> Drop for KernelGuard<'_, F, R> {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Whether simultaneous multithreading is currently active.
pub fn smt_active(fs: &impl HostFs) -> Result<bool, HarnessError> {
    let text = fs.read(Path::new(SMT_ACTIVE_PATH), false)?;
    match text.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(HarnessError::malformed(
            SMT_ACTIVE_PATH,
            format!("unexpected value '{other}'"),
        )),
    }
}

/// Turns simultaneous multithreading on or off.
pub fn set_smt(fs: &impl HostFs, on: bool) -> Result<(), HarnessError> {
    let value = if on { "on" } else { "off" };
    tracing::debug!(value, "set smt");
    fs.write(Path::new(SMT_CONTROL_PATH), value, true)
}
