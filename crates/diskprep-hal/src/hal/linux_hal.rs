//! Linux HAL implementation using real processes and the real filesystem.

use super::{PathOps, ProcessOps};
use crate::{HalError, HalResult};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Real HAL implementation for Linux systems.
#[derive(Debug, Clone, Default)]
pub struct LinuxHal;

impl LinuxHal {
    pub fn new() -> Self {
        Self
    }
}

fn map_command_err(program: &str, err: std::io::Error) -> HalError {
    if err.kind() == std::io::ErrorKind::NotFound {
        return HalError::CommandNotFound(program.to_string());
    }
    HalError::Io(err)
}

/// Read a child pipe to EOF on its own thread.
///
/// A full stderr pipe would block mke2fs before it exits, so both streams are
/// read while we wait on the child.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(err) = pipe.read_to_end(&mut buf) {
                log::debug!("pipe read ended early: {}", err);
            }
        }
        buf
    })
}

/// Kill a child that outlived its timeout and reap it.
fn kill_and_reap(program: &str, child: &mut Child) {
    if let Err(err) = child.kill() {
        log::warn!("failed to kill {}: {}", program, err);
    }
    if let Err(err) = child.wait() {
        log::warn!("failed to reap {}: {}", program, err);
    }
}

fn run_captured(program: &str, args: &[&str], timeout: Duration) -> HalResult<Output> {
    let mut child = Command::new(program)
        .args(args)
        // mke2fs asks for confirmation on odd devices; never let it wait on us.
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| map_command_err(program, e))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let waited = child.wait_timeout(timeout);
    let status = match waited {
        Ok(Some(status)) => Some(status),
        Ok(None) => {
            kill_and_reap(program, &mut child);
            None
        }
        Err(err) => {
            kill_and_reap(program, &mut child);
            return Err(HalError::Io(err));
        }
    };

    // Both readers see EOF once the child is gone.
    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    match status {
        Some(status) => Ok(Output {
            status,
            stdout,
            stderr,
        }),
        None => Err(HalError::CommandTimeout {
            program: program.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

impl ProcessOps for LinuxHal {
    fn command_output(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> HalResult<Output> {
        log::debug!("exec: {} {}", program, args.join(" "));
        run_captured(program, args, timeout)
    }
}

impl PathOps for LinuxHal {
    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
