//! diskprep core library.
//!
//! `diskprep-core` decides whether a block device already carries the wanted
//! filesystem and, if not, builds and runs the right `mkswap`/`mke2fs` command.
//! Host access goes through `diskprep-hal` so the decisions are testable.

pub mod app;
pub mod cli;
pub mod config;
pub mod disk_ops;
pub mod errors;
pub mod logging;

pub use disk_ops::{
    command_spec, parse_blkid_type, probe_filesystem, CapabilityProbe, CommandSpec, DeviceLocks,
    FileSystemKind, FilesystemIdentity, FormatOptions, FormatOutcome, Formatter,
    MarkerCapabilities,
};
pub use errors::FormatError;
