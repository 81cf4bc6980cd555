//! Subcommand implementations, generic over the HAL so they run against
//! `FakeHal` in tests and `LinuxHal` in the binary.

use crate::cli::FormatTarget;
use crate::config::DiskprepConfig;
use crate::disk_ops::{
    probe_filesystem, DeviceLocks, FilesystemIdentity, FormatOutcome, Formatter,
    MarkerCapabilities,
};
use crate::errors::FormatError;
use diskprep_hal::SystemHal;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Result of formatting one target.
#[derive(Debug)]
pub struct TargetReport {
    pub target: FormatTarget,
    pub result: Result<FormatOutcome, FormatError>,
}

impl TargetReport {
    pub fn summary(&self) -> String {
        let device = self.target.device.display();
        let kind = self.target.kind;
        match &self.result {
            Ok(FormatOutcome::AlreadyFormatted { .. }) => {
                format!("{device}: already {kind}")
            }
            Ok(FormatOutcome::Formatted { command }) => {
                format!("{device}: formatted as {kind} ({command})")
            }
            Ok(FormatOutcome::DryRun { command }) => {
                format!("{device}: would run {command}")
            }
            Err(err) => format!("{device}: {err}"),
        }
    }
}

pub fn run_probe<H: SystemHal>(
    hal: &H,
    config: &DiskprepConfig,
    device: &Path,
) -> Result<FilesystemIdentity, FormatError> {
    probe_filesystem(
        hal,
        device,
        Duration::from_secs(config.probe_timeout_secs),
    )
}

/// Format every target, one thread per target. Targets naming the same device
/// run one after another.
pub fn run_format<H: SystemHal>(
    hal: &H,
    config: &DiskprepConfig,
    locks: &DeviceLocks,
    targets: &[FormatTarget],
    dry_run: bool,
    confirmed: bool,
) -> Vec<TargetReport> {
    let opts = config.format_options(dry_run, confirmed);

    thread::scope(|s| {
        let handles: Vec<_> = targets
            .iter()
            .map(|target| {
                let opts = opts.clone();
                s.spawn(move || {
                    let result = locks.with_lock(&target.device, || {
                        let caps =
                            MarkerCapabilities::with_marker(hal, &config.lazy_itable_marker);
                        Formatter::new(hal, &caps)
                            .with_options(opts)
                            .format(&target.device, target.kind)
                    });
                    TargetReport {
                        target: target.clone(),
                        result,
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk_ops::FileSystemKind;
    use diskprep_hal::{FakeHal, FakeOutput, Operation};
    use std::path::PathBuf;

    fn target(device: &str, kind: FileSystemKind) -> FormatTarget {
        FormatTarget {
            device: PathBuf::from(device),
            kind,
        }
    }

    #[test]
    fn probe_reports_identity() {
        let hal = FakeHal::new().with_path("/dev/xvdb").with_command_result(
            "blkid -p /dev/xvdb",
            FakeOutput::stdout(r#"/dev/xvdb: TYPE="swap""#),
        );
        let identity = run_probe(&hal, &DiskprepConfig::default(), Path::new("/dev/xvdb")).unwrap();
        assert_eq!(identity.as_str(), "swap");
    }

    #[test]
    fn blkid_runs_with_configured_timeout() {
        let hal = FakeHal::new().with_path("/dev/xvdb");
        let config = DiskprepConfig {
            probe_timeout_secs: 3,
            ..DiskprepConfig::default()
        };

        let identity = run_probe(&hal, &config, Path::new("/dev/xvdb")).unwrap();

        assert!(identity.is_empty());
        assert!(hal.has_operation(|op| matches!(
            op,
            Operation::Command { program, timeout_secs: 3, .. } if program == "blkid"
        )));
    }

    #[test]
    fn empty_device_is_refused_before_blkid() {
        let hal = FakeHal::new();
        let err = run_probe(&hal, &DiskprepConfig::default(), Path::new("")).unwrap_err();
        assert!(matches!(err, FormatError::EmptyDevice));
        assert_eq!(hal.operation_count(), 0);
    }

    #[test]
    fn format_reports_each_target() {
        let hal = FakeHal::new()
            .with_path("/dev/xvdb")
            .with_path("/dev/xvdc")
            .with_command_result("blkid -p /dev/xvdb", FakeOutput::stdout(r#"TYPE="ext4""#))
            .with_command_result("blkid -p /dev/xvdc", FakeOutput::stdout(r#"TYPE="ext4""#));
        let config = DiskprepConfig::default();
        let targets = vec![
            target("/dev/xvdb", FileSystemKind::Ext4),
            target("/dev/xvdc", FileSystemKind::Swap),
        ];

        let reports = run_format(&hal, &config, &DeviceLocks::new(), &targets, false, true);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].target, targets[0]);
        assert_eq!(reports[0].summary(), "/dev/xvdb: already ext4");
        assert_eq!(
            reports[1].summary(),
            "/dev/xvdc: formatted as swap (mkswap /dev/xvdc)"
        );
        assert!(hal
            .commands()
            .contains(&vec!["mkswap".to_string(), "/dev/xvdc".to_string()]));
    }

    #[test]
    fn format_uses_configured_marker() {
        let hal = FakeHal::new().with_path("/dev/xvdb");
        hal.add_path("/run/diskprep/lazy_itable_init");
        let config = DiskprepConfig {
            lazy_itable_marker: PathBuf::from("/run/diskprep/lazy_itable_init"),
            ..DiskprepConfig::default()
        };

        let reports = run_format(
            &hal,
            &config,
            &DeviceLocks::new(),
            &[target("/dev/xvdb", FileSystemKind::Ext4)],
            true,
            false,
        );

        assert_eq!(
            reports[0].summary(),
            "/dev/xvdb: would run mke2fs -t ext4 -j -E lazy_itable_init=1 /dev/xvdb"
        );
        assert_eq!(hal.commands().len(), 1);
    }

    #[test]
    fn unconfirmed_format_fails_per_target() {
        let hal = FakeHal::new().with_path("/dev/xvdb");
        let reports = run_format(
            &hal,
            &DiskprepConfig::default(),
            &DeviceLocks::new(),
            &[target("/dev/xvdb", FileSystemKind::Swap)],
            false,
            false,
        );
        assert!(matches!(
            reports[0].result,
            Err(FormatError::SafetyLock { .. })
        ));
    }
}
