//! Transcrypt transformer for asset bundlers.
//!
//! Turns a Python source file into a browser-loadable module by running the
//! Transcrypt transpiler and handing the host a re-export of its output. The
//! architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (command synthesis, version
//!   parsing, output-directory planning). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (process execution, version probes,
//!   manifests on disk). Process execution sits behind a trait for tests.
//!
//! Orchestration modules ([`resolve`], [`transform`], [`watch`]) coordinate
//! core logic with I/O; [`host`] describes what the bundler provides.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod host;
pub mod io;
pub mod logging;
pub mod resolve;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod transform;
pub mod watch;
