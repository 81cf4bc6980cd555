//! Fake HAL implementation for testing.
//!
//! This implementation records all operations without executing them and
//! answers commands from a script keyed by the full command line, allowing for
//! CI-safe testing without root privileges or real block devices.

use super::{PathOps, ProcessOps};
use crate::{HalError, HalResult};
use std::collections::{HashMap, HashSet};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Command {
        program: String,
        args: Vec<String>,
        timeout_secs: u64,
    },
    PathExists {
        path: PathBuf,
    },
}

/// Scripted result for one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeOutput {
    /// The command ran and exited with `code`.
    Exit {
        stdout: String,
        stderr: String,
        code: i32,
    },
    /// The program could not be found on the host.
    NotFound,
}

impl FakeOutput {
    /// Successful run printing `stdout`.
    pub fn stdout(stdout: impl Into<String>) -> Self {
        FakeOutput::Exit {
            stdout: stdout.into(),
            stderr: String::new(),
            code: 0,
        }
    }

    /// Failed run with the given exit code and stderr.
    pub fn exit(code: i32, stderr: impl Into<String>) -> Self {
        FakeOutput::Exit {
            stdout: String::new(),
            stderr: stderr.into(),
            code,
        }
    }
}

/// Shared state for FakeHal operations.
#[derive(Debug, Clone, Default)]
struct FakeHalState {
    /// All operations that were recorded
    operations: Vec<Operation>,
    /// Results keyed by `"program arg1 arg2"`
    results: HashMap<String, FakeOutput>,
    /// Paths reported as existing
    existing_paths: HashSet<PathBuf>,
}

/// Fake HAL implementation that records operations without executing them.
///
/// Unscripted commands succeed with empty output. Clones share state, so a test
/// can hand one clone to the code under test and inspect another.
#[derive(Debug, Clone, Default)]
pub struct FakeHal {
    state: Arc<Mutex<FakeHalState>>,
}

impl FakeHal {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeHalState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeHalState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Script the result for a command line such as `"blkid -p /dev/xvda1"`.
    pub fn set_command_result(&self, command_line: &str, result: FakeOutput) {
        self.state()
            .results
            .insert(command_line.to_string(), result);
    }

    /// Builder form of [`FakeHal::set_command_result`].
    pub fn with_command_result(self, command_line: &str, result: FakeOutput) -> Self {
        self.set_command_result(command_line, result);
        self
    }

    /// Make `path_exists` report `path` as present.
    pub fn add_path(&self, path: impl Into<PathBuf>) {
        self.state().existing_paths.insert(path.into());
    }

    /// Builder form of [`FakeHal::add_path`].
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        self.add_path(path);
        self
    }

    pub fn remove_path(&self, path: &Path) {
        self.state().existing_paths.remove(path);
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.state().operations.clone()
    }

    /// Get the number of operations recorded.
    pub fn operation_count(&self) -> usize {
        self.state().operations.len()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        self.state().operations.iter().any(check)
    }

    /// Argument vectors (program first) of every command run, in order.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.state()
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Command { program, args, .. } => {
                    let mut argv = vec![program.clone()];
                    argv.extend(args.iter().cloned());
                    Some(argv)
                }
                Operation::PathExists { .. } => None,
            })
            .collect()
    }

    /// Clear recorded operations. Scripted results and paths are kept.
    pub fn clear(&self) {
        self.state().operations.clear();
    }

    fn record_operation(&self, op: Operation) {
        self.state().operations.push(op);
    }
}

impl ProcessOps for FakeHal {
    fn command_output(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> HalResult<Output> {
        self.record_operation(Operation::Command {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            timeout_secs: timeout.as_secs(),
        });

        let mut command_line = program.to_string();
        for arg in args {
            command_line.push(' ');
            command_line.push_str(arg);
        }
        log::info!("FAKE HAL: {}", command_line);

        let scripted = self.state().results.get(&command_line).cloned();
        match scripted {
            Some(FakeOutput::NotFound) => Err(HalError::CommandNotFound(program.to_string())),
            Some(FakeOutput::Exit {
                stdout,
                stderr,
                code,
            }) => Ok(Output {
                // Raw wait status: exit code lives in the second byte.
                status: ExitStatus::from_raw(code << 8),
                stdout: stdout.into_bytes(),
                stderr: stderr.into_bytes(),
            }),
            None => Ok(Output {
                status: ExitStatus::from_raw(0),
                stdout: Vec::new(),
                stderr: Vec::new(),
            }),
        }
    }
}

impl PathOps for FakeHal {
    fn path_exists(&self, path: &Path) -> bool {
        self.record_operation(Operation::PathExists {
            path: path.to_path_buf(),
        });
        let exists = self.state().existing_paths.contains(path);
        log::info!("FAKE HAL: path_exists({}) = {}", path.display(), exists);
        exists
    }
}
