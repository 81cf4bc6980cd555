//! CLI argument parsing for diskprep.

use crate::disk_ops::FileSystemKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "diskprep")]
#[command(about = "Probe block devices and format them only when needed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a diskprep.toml configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the filesystem type blkid reports for a device
    Probe {
        /// Block device (e.g., /dev/xvdb)
        #[arg(long)]
        device: PathBuf,
    },

    /// Format devices whose filesystem differs from the requested one
    Format {
        /// DEVICE:KIND pair (e.g., /dev/xvdb:ext4); repeatable
        #[arg(long = "target", required = true)]
        targets: Vec<FormatTarget>,

        /// Show the commands that would run without formatting anything
        #[arg(long)]
        dry_run: bool,

        /// Confirm destructive operation (required for non-dry-run)
        #[arg(long)]
        yes_i_know: bool,
    },
}

/// A device and the filesystem it should carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTarget {
    pub device: PathBuf,
    pub kind: FileSystemKind,
}

impl FromStr for FormatTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (device, kind) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected DEVICE:KIND, got {s:?}"))?;
        if device.is_empty() {
            return Err(format!("missing device in {s:?}"));
        }
        Ok(Self {
            device: PathBuf::from(device),
            kind: kind.parse()?,
        })
    }
}
