use thiserror::Error;

pub type HalResult<T> = std::result::Result<T, HalError>;

#[derive(Error, Debug)]
pub enum HalError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command failed: {program} (exit={code:?}): {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command timed out: {program} after {timeout_secs}s")]
    CommandTimeout { program: String, timeout_secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HalError {
    /// Build a `CommandFailed` from a finished process.
    pub fn from_output(program: &str, output: &std::process::Output) -> Self {
        HalError::CommandFailed {
            program: program.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_message_names_program_and_code() {
        let err = HalError::CommandFailed {
            program: "mkswap".to_string(),
            code: Some(1),
            stderr: "device busy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command failed: mkswap (exit=Some(1)): device busy"
        );
    }
}
