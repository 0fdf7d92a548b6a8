//! Fatal error kinds surfaced to the host.
//!
//! Orchestration code returns `anyhow::Result`; these typed errors travel
//! inside it and can be recovered with `downcast_ref::<TransformError>()`.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::{PACKAGE_KEY, ToolKind, Version};

#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(
        "Transcrypt is not installed for '{runtime}'.\n\
         Install it with `{runtime} -m pip install transcrypt`, or point \
         {key}/command in package.json at a working installation.",
        key = PACKAGE_KEY
    )]
    ToolchainMissing { runtime: String },

    #[error(
        "Python version {runtime} does not match Transcrypt version {toolchain}.\n\
         Transcrypt must run under the Python version it was released for. \
         Use a matching interpreter in {key}/command, declare \
         {key}/transcryptVersion, or set {key}/checkPythonVersion to false.",
        key = PACKAGE_KEY
    )]
    VersionMismatch {
        runtime: Version,
        toolchain: Version,
    },

    #[error("Transcrypt failed ({status}): {command_line}\n{stderr}")]
    ToolchainExecution {
        command_line: String,
        status: String,
        stderr: String,
    },
}

/// Misconfiguration detected before or instead of running the toolchain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "Config 'command' key in {key} does not appear to be valid: '{command}'\n\
         The value for {key}/command in package.json needs to name transcrypt. \
         Stopping build.",
        key = PACKAGE_KEY
    )]
    InvalidCommand { command: String },

    #[error(
        "Config 'transcryptVersion' key in {key} is not a version: '{raw}'\n\
         Use the form major.minor or major.minor.patch (for example \"3.9\").",
        key = PACKAGE_KEY
    )]
    InvalidVersion { raw: String },

    #[error(
        "Unable to determine the {kind} version using '{command}'.\n\
         Check {key}/command, or declare {key}/transcryptVersion.",
        key = PACKAGE_KEY
    )]
    VersionUndetermined { kind: ToolKind, command: String },

    #[error(
        "Transcrypt output folder can not be the same as the {collides_with} folder!\n\
         --Transcrypt output folder: {out}\n\
         --Source folder:            {src}\n\
         Continuing could cause a loss of source content so stopping build.\n\
         (Try configuring a different Transcrypt output folder in package.json.)",
        out = .output_dir.display(),
        src = .source_dir.display()
    )]
    OutputDirCollision {
        output_dir: PathBuf,
        source_dir: PathBuf,
        collides_with: &'static str,
    },
}

impl TransformError {
    /// True for errors caused by project configuration or the installed toolchain
    /// rather than by the transpiled source.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, TransformError::ToolchainExecution { .. })
    }
}
