//! External programs: the assembler, the section extractor, kernel module
//! tools and the measurement executable.
//!
//! Everything goes through a [`CommandRunner`] so the kernel and host code can
//! be exercised without spawning anything.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::HarnessError;

/// One program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    /// Run through the elevation prefix (`sudo` by default).
    pub elevated: bool,
    /// Written to the program's stdin, which is otherwise closed.
    pub input: Option<String>,
}

impl Invocation {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            elevated: false,
            input: None,
        }
    }

    pub fn elevated(mut self) -> Self {
        self.elevated = true;
        self
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }
}

/// Exit status and merged stdout/stderr of a finished program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the program was killed by a signal.
    pub status: Option<i32>,
    pub output: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Turn a non-zero exit into [`HarnessError::ToolFailed`].
    pub fn check(self, program: &str) -> Result<ToolOutput, HarnessError> {
        if self.success() {
            Ok(self)
        } else {
            Err(HarnessError::ToolFailed {
                program: program.to_string(),
                status: self.status,
                output: self.output,
            })
        }
    }
}

pub trait CommandRunner {
    /// Runs the program to completion. A non-zero exit is not an error here;
    /// only failing to start it is.
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, HarnessError>;
}

/// Runs programs with [`std::process::Command`].
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    elevation: Vec<String>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            elevation: vec!["sudo".to_string()],
        }
    }
}

impl ProcessRunner {
    /// Use `prefix` (e.g. `["doas"]`) to elevate. An empty prefix runs
    /// elevated commands as is.
    pub fn with_elevation(prefix: Vec<String>) -> Self {
        Self { elevation: prefix }
    }

    /// Skips the elevation prefix when already running as root.
    pub fn detect() -> Self {
        if is_root() {
            Self::with_elevation(Vec::new())
        } else {
            Self::default()
        }
    }

    fn command_line<'a>(&'a self, invocation: &'a Invocation) -> Vec<&'a str> {
        let prefix = if invocation.elevated {
            self.elevation.as_slice()
        } else {
            &[]
        };
        prefix
            .iter()
            .chain(&invocation.argv)
            .map(String::as_str)
            .collect()
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, HarnessError> {
        let argv = self.command_line(invocation);
        let Some((program, args)) = argv.split_first() else {
            return Err(HarnessError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };
        tracing::debug!(command = %argv.join(" "), "run");

        let spawn_error = |source| HarnessError::Spawn {
            program: program.to_string(),
            source,
        };
        let mut child = Command::new(program)
            .args(args)
            .stdin(if invocation.input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let (Some(input), Some(mut stdin)) = (&invocation.input, child.stdin.take()) {
            stdin.write_all(input.as_bytes()).map_err(spawn_error)?;
        }
        let output = child.wait_with_output().map_err(spawn_error)?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        tracing::debug!(program, status = ?output.status.code(), "finished");
        Ok(ToolOutput {
            status: output.status.code(),
            output: text,
        })
    }
}

/// Whether the effective user id is 0, read from `/proc/self/status`.
fn is_root() -> bool {
    std::fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| {
            status
                .lines()
                .find_map(|line| line.strip_prefix("Uid:"))
                .and_then(|ids| ids.split_whitespace().nth(1).map(|euid| euid == "0"))
        })
        .unwrap_or(false)
}

/// Programs every measurement needs.
pub const REQUIRED_TOOLS: [&str; 3] = ["as", "objcopy", "modprobe"];

/// The assembler pipeline and measurement executable.
#[derive(Debug, Clone)]
pub struct Toolchain<R> {
    runner: R,
}

impl<R: CommandRunner> Toolchain<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Probes each required tool with `--version`.
    pub fn available(&self) -> Result<(), HarnessError> {
        let missing: Vec<&'static str> = REQUIRED_TOOLS
            .into_iter()
            .filter(|tool| {
                !self
                    .runner
                    .run(&Invocation::new([*tool, "--version"]))
                    .is_ok_and(|output| output.success())
            })
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::MissingTools(missing))
        }
    }

    /// Writes `listing` to `asm_path` and assembles it into `obj_path`.
    pub fn assemble(
        &self,
        listing: &str,
        asm_path: &Path,
        obj_path: &Path,
    ) -> Result<(), HarnessError> {
        std::fs::write(asm_path, listing).map_err(|e| HarnessError::io(asm_path, e))?;
        self.checked(Invocation::new([
            "as".to_string(),
            path_arg(asm_path),
            "-o".to_string(),
            path_arg(obj_path),
        ]))?;
        Ok(())
    }

    /// Extracts the raw `.text` section of `obj_path` into `bin_path`.
    pub fn objcopy(&self, obj_path: &Path, bin_path: &Path) -> Result<(), HarnessError> {
        self.checked(Invocation::new([
            "objcopy".to_string(),
            "-j".to_string(),
            ".text".to_string(),
            "-O".to_string(),
            "binary".to_string(),
            path_arg(obj_path),
            path_arg(bin_path),
        ]))?;
        Ok(())
    }

    /// Assembles `listing` inside `workdir` and returns the raw code file.
    pub fn create_binary(&self, listing: &str, workdir: &Path) -> Result<PathBuf, HarnessError> {
        let asm_path = workdir.join("asm.s");
        let obj_path = workdir.join("asm.o");
        let bin_path = workdir.join("asm.bin");
        self.assemble(listing, &asm_path, &obj_path)?;
        self.objcopy(&obj_path, &bin_path)?;
        Ok(bin_path)
    }

    /// Runs the measurement executable elevated and returns its report.
    pub fn measure(&self, executable: &Path, args: &[&str]) -> Result<ToolOutput, HarnessError> {
        let argv = std::iter::once(path_arg(executable)).chain(args.iter().map(|a| a.to_string()));
        self.checked(Invocation::new(argv).elevated())
    }

    fn checked(&self, invocation: Invocation) -> Result<ToolOutput, HarnessError> {
        let output = self.runner.run(&invocation)?;
        output.check(invocation.program())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
