//! Disk preparation: filesystem probing, host capability checks and the
//! idempotent format decision.

pub mod capability;
pub mod device_lock;
pub mod format;
pub mod probe;

pub use capability::{CapabilityProbe, MarkerCapabilities, DEFAULT_LAZY_ITABLE_MARKER};
pub use device_lock::DeviceLocks;
pub use format::{
    command_spec, CommandSpec, FileSystemKind, FormatOptions, FormatOutcome, Formatter,
};
pub use probe::{device_arg, parse_blkid_type, probe_filesystem, FilesystemIdentity};
