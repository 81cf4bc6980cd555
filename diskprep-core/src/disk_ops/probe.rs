//! Existing filesystem detection via `blkid -p`.

use crate::errors::FormatError;
use diskprep_hal::{HalError, SystemHal};
use std::fmt;
use std::io;
use std::path::Path;
use std::time::Duration;

pub const BLKID: &str = "blkid";

/// blkid exits with 2 when it could not identify anything on the device.
const BLKID_EXIT_NOTHING_FOUND: i32 = 2;

const TYPE_TOKEN: &str = "TYPE=\"";

/// The `TYPE` value blkid reported for a device, verbatim. Empty when the
/// device carries no recognizable signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilesystemIdentity(String);

impl FilesystemIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FilesystemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Extract the first `TYPE="<value>"` token from blkid output.
///
/// The token has to start the text or follow whitespace, so `PTTYPE="dos"` and
/// `SEC_TYPE="ext2"` are skipped. No token means no filesystem.
pub fn parse_blkid_type(output: &str) -> FilesystemIdentity {
    let mut offset = 0;
    while let Some(pos) = output[offset..].find(TYPE_TOKEN) {
        let start = offset + pos;
        let value_start = start + TYPE_TOKEN.len();

        let at_boundary = output[..start]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        if at_boundary {
            return match output[value_start..].find('"') {
                Some(len) => FilesystemIdentity::new(&output[value_start..value_start + len]),
                // Unterminated value: treat the whole line as unparseable.
                None => FilesystemIdentity::default(),
            };
        }
        offset = value_start;
    }
    FilesystemIdentity::default()
}

/// The device as a command-line argument.
///
/// Tools get the path byte for byte, so a path that is not UTF-8 is refused
/// instead of being rewritten.
pub fn device_arg(device: &Path) -> Result<&str, FormatError> {
    if device.as_os_str().is_empty() {
        return Err(FormatError::EmptyDevice);
    }
    device.to_str().ok_or_else(|| FormatError::NonUtf8Device {
        device: device.to_path_buf(),
    })
}

/// Run `blkid -p <device>` once and return the filesystem type found.
///
/// The device has to exist. blkid's "nothing found" exit only counts as a
/// blank device when blkid printed no error with it.
pub fn probe_filesystem(
    hal: &dyn SystemHal,
    device: &Path,
    timeout: Duration,
) -> Result<FilesystemIdentity, FormatError> {
    let arg = device_arg(device)?;
    let probe_err = |source| FormatError::Probe {
        device: device.to_path_buf(),
        source,
    };

    if !hal.path_exists(device) {
        return Err(probe_err(HalError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", device.display()),
        ))));
    }

    let output = hal
        .command_output(BLKID, &["-p", arg], timeout)
        .map_err(probe_err)?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let identity = parse_blkid_type(&stdout);
        log::debug!("blkid -p {}: TYPE={}", device.display(), identity);
        return Ok(identity);
    }

    // blkid also exits 2 when it cannot open the device, but then says why.
    if output.status.code() == Some(BLKID_EXIT_NOTHING_FOUND)
        && String::from_utf8_lossy(&output.stderr).trim().is_empty()
    {
        log::debug!("blkid -p {}: no signature found", device.display());
        return Ok(FilesystemIdentity::default());
    }

    Err(probe_err(HalError::from_output(BLKID, &output)))
}
