//! Deterministic, pure logic for configuration resolution.
//!
//! Core modules must be free of I/O side effects. They operate on strings and
//! paths and return deterministic outputs suitable for tests.

pub mod command;
pub mod outdir;
pub mod path;
pub mod reexport;
pub mod types;
pub mod version;
