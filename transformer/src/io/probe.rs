//! Live version detection for the toolchain and its runtime.

use tracing::{debug, instrument, warn};

use crate::core::command::{derive_runtime_command, derive_toolchain_command};
use crate::core::types::{ToolKind, Version};
use crate::core::version::parse_probe_output;
use crate::io::process::{CommandRequest, CommandRunner};

/// Marker in the runtime's error stream when the toolchain module is absent.
const MISSING_MODULE_MARKER: &str = "No module named transcrypt";

/// Source of installed tool versions.
pub trait VersionProbe {
    /// Detect the version of `kind` reachable through `command`.
    ///
    /// `Some(Version::NOT_INSTALLED)` means the runtime works but the toolchain
    /// module is missing; `None` means the version could not be determined.
    fn version(&self, command: &str, kind: ToolKind) -> Option<Version>;
}

/// Probe that runs the tools through a [`CommandRunner`].
pub struct ProcessProbe<'a, R: CommandRunner> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> ProcessProbe<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> VersionProbe for ProcessProbe<'_, R> {
    fn version(&self, command: &str, kind: ToolKind) -> Option<Version> {
        resolve_version(self.runner, command, kind)
    }
}

/// Probe argv for `kind`, or `None` when no probe can be derived from `command`.
pub fn probe_argv(command: &str, kind: ToolKind) -> Option<Vec<String>> {
    let (base, flag) = match kind {
        ToolKind::Toolchain => (derive_toolchain_command(command)?, "--help"),
        ToolKind::Runtime => (derive_runtime_command(command), "--version"),
    };
    Some(
        base.split_whitespace()
            .chain(std::iter::once(flag))
            .map(str::to_string)
            .collect(),
    )
}

/// Run the version probe for `kind` and parse its output. Never fails.
#[instrument(skip(runner))]
pub fn resolve_version<R: CommandRunner + ?Sized>(
    runner: &R,
    command: &str,
    kind: ToolKind,
) -> Option<Version> {
    let Some(argv) = probe_argv(command, kind) else {
        debug!("no probe command can be derived");
        return None;
    };
    let request = CommandRequest::new(argv);
    let output = match runner.run(&request) {
        Ok(output) => output,
        Err(err) => {
            warn!(
                command = %request.command_line(),
                err = %format!("{err:#}"),
                "There was a problem running the command"
            );
            return None;
        }
    };

    if !output.success {
        if output.stderr_lossy().contains(MISSING_MODULE_MARKER) {
            debug!("toolchain module missing");
            return Some(Version::NOT_INSTALLED);
        }
        warn!(
            command = %request.command_line(),
            status = %output.status_label(),
            "There was a problem running the command"
        );
        return None;
    }

    let version = parse_probe_output(&output.combined_lossy(), kind);
    debug!(version = ?version, "probe finished");
    version
}
