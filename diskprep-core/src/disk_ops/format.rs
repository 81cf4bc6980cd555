use super::capability::CapabilityProbe;
use super::probe::{device_arg, probe_filesystem, FilesystemIdentity};
use crate::errors::FormatError;
use clap::ValueEnum;
use diskprep_hal::SystemHal;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const MKSWAP: &str = "mkswap";
pub const MKE2FS: &str = "mke2fs";

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FORMAT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Filesystems diskprep knows how to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum FileSystemKind {
    Swap,
    Ext2,
    Ext3,
    Ext4,
}

impl FileSystemKind {
    /// Canonical name, as reported by blkid and passed to `mke2fs -t`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileSystemKind::Swap => "swap",
            FileSystemKind::Ext2 => "ext2",
            FileSystemKind::Ext3 => "ext3",
            FileSystemKind::Ext4 => "ext4",
        }
    }
}

impl fmt::Display for FileSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileSystemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "swap" => Ok(FileSystemKind::Swap),
            "ext2" => Ok(FileSystemKind::Ext2),
            "ext3" => Ok(FileSystemKind::Ext3),
            "ext4" => Ok(FileSystemKind::Ext4),
            other => Err(format!("unknown filesystem kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Build the creation command for `kind` on `device`.
///
/// `lazy_itable_init` only affects ext4.
pub fn command_spec(kind: FileSystemKind, device: &str, lazy_itable_init: bool) -> CommandSpec {
    let (program, mut args): (&str, Vec<String>) = match kind {
        FileSystemKind::Swap => (MKSWAP, Vec::new()),
        FileSystemKind::Ext2 => (MKE2FS, vec!["-t".into(), "ext2".into()]),
        FileSystemKind::Ext3 => (MKE2FS, vec!["-t".into(), "ext3".into(), "-j".into()]),
        FileSystemKind::Ext4 => {
            let mut args: Vec<String> = vec!["-t".into(), "ext4".into(), "-j".into()];
            if lazy_itable_init {
                args.push("-E".into());
                args.push("lazy_itable_init=1".into());
            }
            (MKE2FS, args)
        }
    };
    args.push(device.to_string());
    CommandSpec {
        program: program.to_string(),
        args,
    }
}

/// Options for formatting operations.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// If true, log the command that would run but don't execute it
    pub dry_run: bool,
    /// If true, the caller has confirmed the destructive operation
    pub confirmed: bool,
    pub probe_timeout: Duration,
    pub format_timeout: Duration,
}

impl FormatOptions {
    pub fn new(dry_run: bool, confirmed: bool) -> Self {
        Self {
            dry_run,
            confirmed,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            format_timeout: DEFAULT_FORMAT_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, probe_timeout: Duration, format_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self.format_timeout = format_timeout;
        self
    }
}

impl Default for FormatOptions {
    /// Library callers asking for a format have already decided to format.
    fn default() -> Self {
        Self::new(false, true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The device already carried the requested filesystem; nothing was run.
    AlreadyFormatted { identity: FilesystemIdentity },
    Formatted { command: CommandSpec },
    DryRun { command: CommandSpec },
}

/// Probes a device and formats it only when its filesystem differs from the
/// requested kind.
pub struct Formatter<'a> {
    hal: &'a dyn SystemHal,
    capabilities: &'a dyn CapabilityProbe,
    opts: FormatOptions,
}

impl<'a> Formatter<'a> {
    pub fn new(hal: &'a dyn SystemHal, capabilities: &'a dyn CapabilityProbe) -> Self {
        Self {
            hal,
            capabilities,
            opts: FormatOptions::default(),
        }
    }

    pub fn with_options(mut self, opts: FormatOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn options(&self) -> &FormatOptions {
        &self.opts
    }

    /// Make sure `device` carries a `kind` filesystem.
    ///
    /// Exactly one probe runs first. If blkid already reports `kind` verbatim,
    /// nothing else runs; otherwise a single creation command is issued.
    pub fn format(&self, device: &Path, kind: FileSystemKind) -> Result<FormatOutcome, FormatError> {
        let arg = device_arg(device)?;

        let identity = probe_filesystem(self.hal, device, self.opts.probe_timeout)?;
        if identity.as_str() == kind.as_str() {
            log::info!(
                "{} is already {}; not formatting",
                device.display(),
                kind
            );
            return Ok(FormatOutcome::AlreadyFormatted { identity });
        }

        let lazy_itable_init = match kind {
            FileSystemKind::Ext4 => {
                let supported = self.capabilities.supports_lazy_itable_init();
                log::debug!("lazy_itable_init supported: {}", supported);
                supported
            }
            FileSystemKind::Swap | FileSystemKind::Ext2 | FileSystemKind::Ext3 => false,
        };
        let command = command_spec(kind, arg, lazy_itable_init);

        if self.opts.dry_run {
            log::info!("DRY RUN: {}", command);
            return Ok(FormatOutcome::DryRun { command });
        }

        if !self.opts.confirmed {
            return Err(FormatError::SafetyLock {
                device: device.to_path_buf(),
            });
        }

        log::info!(
            "Formatting {} as {} (found: {}): {}",
            device.display(),
            kind,
            identity,
            command
        );
        let args: Vec<&str> = command.args.iter().map(String::as_str).collect();
        self.hal
            .command_status(&command.program, &args, self.opts.format_timeout)
            .map_err(|source| FormatError::Format {
                device: device.to_path_buf(),
                kind,
                source,
            })?;

        Ok(FormatOutcome::Formatted { command })
    }
}
