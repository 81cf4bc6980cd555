//! Host filesystem feature detection.

use diskprep_hal::PathOps;
use std::path::{Path, PathBuf};

/// Present when the running kernel can initialize ext4 inode tables lazily.
pub const DEFAULT_LAZY_ITABLE_MARKER: &str = "/sys/fs/ext4/features/lazy_itable_init";

pub trait CapabilityProbe {
    fn supports_lazy_itable_init(&self) -> bool;
}

/// Capabilities derived from marker paths on the host. Checked on every call.
pub struct MarkerCapabilities<'a> {
    paths: &'a dyn PathOps,
    lazy_itable_marker: PathBuf,
}

impl<'a> MarkerCapabilities<'a> {
    pub fn new(paths: &'a dyn PathOps) -> Self {
        Self::with_marker(paths, DEFAULT_LAZY_ITABLE_MARKER)
    }

    pub fn with_marker(paths: &'a dyn PathOps, lazy_itable_marker: impl Into<PathBuf>) -> Self {
        Self {
            paths,
            lazy_itable_marker: lazy_itable_marker.into(),
        }
    }

    pub fn lazy_itable_marker(&self) -> &Path {
        &self.lazy_itable_marker
    }
}

impl CapabilityProbe for MarkerCapabilities<'_> {
    fn supports_lazy_itable_init(&self) -> bool {
        self.paths.path_exists(&self.lazy_itable_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diskprep_hal::{FakeHal, LinuxHal, Operation};
    use tempfile::tempdir;

    #[test]
    fn marker_present_means_supported() {
        let hal = FakeHal::new();
        hal.add_path(DEFAULT_LAZY_ITABLE_MARKER);

        assert!(MarkerCapabilities::new(&hal).supports_lazy_itable_init());
    }

    #[test]
    fn marker_absent_means_unsupported() {
        let hal = FakeHal::new();
        assert!(!MarkerCapabilities::new(&hal).supports_lazy_itable_init());
    }

    #[test]
    fn marker_is_checked_on_every_call() {
        let hal = FakeHal::new();
        let caps = MarkerCapabilities::new(&hal);

        assert!(!caps.supports_lazy_itable_init());
        hal.add_path(DEFAULT_LAZY_ITABLE_MARKER);
        assert!(caps.supports_lazy_itable_init());

        let checks = hal
            .operations()
            .into_iter()
            .filter(|op| matches!(op, Operation::PathExists { .. }))
            .count();
        assert_eq!(checks, 2);
    }

    #[test]
    fn missing_feature_directory_is_unsupported() {
        let dir = tempdir().unwrap();
        let hal = LinuxHal::new();
        let caps = MarkerCapabilities::with_marker(
            &hal,
            dir.path().join("sys/fs/ext4/features/lazy_itable_init"),
        );
        assert!(!caps.supports_lazy_itable_init());

        let features = dir.path().join("sys/fs/ext4/features");
        std::fs::create_dir_all(&features).unwrap();
        std::fs::write(features.join("lazy_itable_init"), "").unwrap();
        assert!(caps.supports_lazy_itable_init());
    }
}
