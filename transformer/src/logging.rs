//! Tracing setup for the command-line driver.
//!
//! Library code only emits `tracing` events; a host embedding the transformer
//! installs its own subscriber and receives the same events, which take the
//! place of a plugin logger (`info` for the toolchain command line and output,
//! `warn` for watch-list problems, `error` for failed toolchain output).

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber for the CLI.
///
/// Reads `RUST_LOG` env var. Defaults to `default_level` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=transformer=debug transcrypt-transform transform src/app.py
/// ```
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
