//! HAL trait definitions and implementations.
//!
//! This module defines the host-facing traits used by the format logic and
//! provides both real (LinuxHal) and fake (FakeHal) implementations.

pub mod fake_hal;
pub mod linux_hal;
pub mod path_ops;
pub mod process_ops;

pub use fake_hal::{FakeHal, FakeOutput, Operation};
pub use linux_hal::LinuxHal;
pub use path_ops::PathOps;
pub use process_ops::ProcessOps;

/// Complete HAL combining all host operation traits.
pub trait SystemHal: ProcessOps + PathOps + Send + Sync {}

/// Automatically implement SystemHal for any type implementing all required traits.
impl<T> SystemHal for T where T: ProcessOps + PathOps + Send + Sync {}
