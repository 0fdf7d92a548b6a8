//! I/O helpers: child processes, version probes, manifests on disk.

pub mod invoke;
pub mod manifest;
pub mod package_config;
pub mod probe;
pub mod process;
