//! Per-device serialization for callers that format several disks at once.
//!
//! `Formatter` does not coordinate concurrent calls; two overlapping formats of
//! the same device would race. Callers wrap each call in [`DeviceLocks::with_lock`].

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

static GLOBAL_LOCKS: Lazy<DeviceLocks> = Lazy::new(DeviceLocks::new);

#[derive(Debug, Default)]
pub struct DeviceLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

fn recover<T>(result: std::sync::LockResult<MutexGuard<'_, T>>) -> MutexGuard<'_, T> {
    match result {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl DeviceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide lock table.
    pub fn global() -> &'static DeviceLocks {
        &GLOBAL_LOCKS
    }

    fn lock_for(&self, device: &Path) -> Arc<Mutex<()>> {
        recover(self.locks.lock())
            .entry(device.to_path_buf())
            .or_default()
            .clone()
    }

    /// Run `f` while holding the lock for `device`.
    ///
    /// A panic in an earlier holder does not poison the device for later callers.
    pub fn with_lock<T>(&self, device: &Path, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(device);
        let _guard = recover(lock.lock());
        f()
    }
}
