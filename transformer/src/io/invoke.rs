//! Toolchain invocation for a single source file.

use std::path::Path;

use anyhow::Result;
use tracing::{error, info, instrument};

use crate::core::command::build_argv;
use crate::core::path::relative;
use crate::core::types::EffectiveConfig;
use crate::error::TransformError;
use crate::io::process::{CommandOutput, CommandRequest, CommandRunner};

/// Build the toolchain request: command, arguments, then the source path
/// relative to the project root. The toolchain always runs from the project
/// root so its output bookkeeping stays keyed to one directory across files.
pub fn invocation_request(
    config: &EffectiveConfig,
    source_file: &Path,
    project_root: &Path,
) -> CommandRequest {
    let source = relative(project_root, source_file);
    CommandRequest::new(build_argv(&config.command, &config.arguments, &source)).in_dir(project_root)
}

/// Run the toolchain and return its captured output.
///
/// Any failure (spawn error, timeout, non-zero exit) becomes
/// [`TransformError::ToolchainExecution`]; there is no degraded success.
#[instrument(skip_all, fields(source = %source_file.display()))]
pub fn run_toolchain<R: CommandRunner + ?Sized>(
    runner: &R,
    config: &EffectiveConfig,
    source_file: &Path,
    project_root: &Path,
) -> Result<CommandOutput> {
    let request = invocation_request(config, source_file, project_root);
    let command_line = request.command_line();
    info!("{command_line}");

    let output = match runner.run(&request) {
        Ok(output) => output,
        Err(err) => {
            return Err(TransformError::ToolchainExecution {
                command_line,
                status: "failed to start".to_string(),
                stderr: format!("{err:#}"),
            }
            .into());
        }
    };

    if !output.success {
        let stdout = output.stdout_lossy();
        if !stdout.trim().is_empty() {
            error!("{stdout}");
        }
        return Err(TransformError::ToolchainExecution {
            command_line,
            status: output.status_label(),
            stderr: output.stderr_lossy(),
        }
        .into());
    }

    let stdout = output.stdout_lossy();
    if !stdout.trim().is_empty() {
        info!("{stdout}");
    }
    info!("Transcrypt build complete!");
    Ok(output)
}
