use crate::disk_ops::FileSystemKind;
use diskprep_hal::HalError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Device path is empty")]
    EmptyDevice,

    #[error("Device path {} is not valid UTF-8", .device.display())]
    NonUtf8Device { device: PathBuf },

    #[error("Probing {} failed: {}", .device.display(), .source)]
    Probe {
        device: PathBuf,
        #[source]
        source: HalError,
    },

    #[error("Formatting {} as {} failed: {}", .device.display(), .kind, .source)]
    Format {
        device: PathBuf,
        kind: FileSystemKind,
        #[source]
        source: HalError,
    },

    #[error("Safety lock engaged: refusing to format {} without confirmation (--yes-i-know)", .device.display())]
    SafetyLock { device: PathBuf },
}
