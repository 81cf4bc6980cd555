//! Process execution helpers.
//!
//! External commands are considered "world-touching" and must go through the HAL so
//! the probe/format decisions can be tested without spawning real processes.

use crate::{HalError, HalResult};
use std::process::Output;
use std::time::Duration;

/// Process execution trait (external command runner).
pub trait ProcessOps {
    /// Run `program` with `args` and capture stdout, stderr and exit status.
    ///
    /// A non-zero exit is returned as a normal `Output`; only failing to run the
    /// program at all (missing binary, spawn error, timeout) is an `Err`.
    fn command_output(&self, program: &str, args: &[&str], timeout: Duration)
        -> HalResult<Output>;

    /// Like [`ProcessOps::command_output`], but a non-zero exit becomes
    /// `HalError::CommandFailed`.
    fn command_status(&self, program: &str, args: &[&str], timeout: Duration) -> HalResult<()> {
        let output = self.command_output(program, args, timeout)?;
        if !output.status.success() {
            return Err(HalError::from_output(program, &output));
        }
        Ok(())
    }
}
