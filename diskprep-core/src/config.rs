//! Runtime configuration (`diskprep.toml`).
//!
//! Every key is optional; an empty file gives the built-in defaults.

use crate::disk_ops::{FormatOptions, DEFAULT_LAZY_ITABLE_MARKER};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LOG_FILE: &str = "/var/log/diskprep/diskprep.log";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiskprepConfig {
    /// Marker whose existence means mke2fs may use `-E lazy_itable_init=1`.
    pub lazy_itable_marker: PathBuf,
    pub probe_timeout_secs: u64,
    pub format_timeout_secs: u64,
    pub log_file: PathBuf,
}

impl Default for DiskprepConfig {
    fn default() -> Self {
        Self {
            lazy_itable_marker: PathBuf::from(DEFAULT_LAZY_ITABLE_MARKER),
            probe_timeout_secs: 10,
            format_timeout_secs: 10 * 60,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl DiskprepConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid diskprep configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Load `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn format_options(&self, dry_run: bool, confirmed: bool) -> FormatOptions {
        FormatOptions::new(dry_run, confirmed).with_timeouts(
            Duration::from_secs(self.probe_timeout_secs),
            Duration::from_secs(self.format_timeout_secs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_config_uses_defaults() {
        let config = DiskprepConfig::parse("").unwrap();
        assert_eq!(config, DiskprepConfig::default());
        assert_eq!(
            config.lazy_itable_marker,
            PathBuf::from("/sys/fs/ext4/features/lazy_itable_init")
        );
    }

    #[test]
    fn partial_config_overrides_only_given_keys() {
        let config = DiskprepConfig::parse(
            "lazy_itable_marker = \"/tmp/features/lazy_itable_init\"\nformat_timeout_secs = 30\n",
        )
        .unwrap();
        assert_eq!(
            config.lazy_itable_marker,
            PathBuf::from("/tmp/features/lazy_itable_init")
        );
        assert_eq!(config.format_timeout_secs, 30);
        assert_eq!(config.probe_timeout_secs, 10);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(DiskprepConfig::parse("retries = 3\n").is_err());
    }

    #[test]
    fn format_options_carry_timeouts() {
        let config = DiskprepConfig {
            probe_timeout_secs: 5,
            format_timeout_secs: 120,
            ..DiskprepConfig::default()
        };
        let opts = config.format_options(true, false);
        assert!(opts.dry_run);
        assert!(!opts.confirmed);
        assert_eq!(opts.probe_timeout, Duration::from_secs(5));
        assert_eq!(opts.format_timeout, Duration::from_secs(120));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("diskprep.toml");
        std::fs::write(&path, "probe_timeout_secs = 2\n").unwrap();

        let config = DiskprepConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.probe_timeout_secs, 2);

        let err = DiskprepConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));

        assert_eq!(
            DiskprepConfig::load_or_default(None).unwrap(),
            DiskprepConfig::default()
        );
    }
}
