//! Host path checks (sysfs feature markers and the like).

use std::path::Path;

pub trait PathOps {
    /// Whether `path` exists. Anything that prevents the check (missing parent,
    /// permissions) reads as `false`.
    fn path_exists(&self, path: &Path) -> bool;
}
