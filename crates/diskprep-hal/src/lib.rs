//! diskprep Host Abstraction Layer (HAL).
//!
//! Everything that touches the host (spawning tools, checking sysfs paths) goes
//! through the traits in [`hal`], so the format logic in `diskprep-core` can be
//! exercised against [`FakeHal`] without root or real block devices.

pub mod error;
pub mod hal;

pub use error::{HalError, HalResult};
pub use hal::{
    FakeHal, FakeOutput, LinuxHal, Operation, PathOps, ProcessOps, SystemHal,
};
