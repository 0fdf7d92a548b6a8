//! Stable exit codes for the `transcrypt-transform` CLI.

use crate::error::TransformError;

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed for a reason not covered below (I/O, bad arguments, ...).
pub const FAILED: i32 = 1;
/// Project configuration or installed toolchain is unusable.
pub const CONFIGURATION: i32 = 2;
/// The toolchain ran and failed.
pub const TOOLCHAIN_FAILED: i32 = 3;

/// Exit code for an error returned by a CLI command.
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<TransformError>() {
        Some(TransformError::ToolchainExecution { .. }) => TOOLCHAIN_FAILED,
        Some(_) => CONFIGURATION,
        None => FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn typed_errors_map_to_codes() {
        let config = anyhow::Error::new(TransformError::from(ConfigError::InvalidCommand {
            command: "ruby".to_string(),
        }));
        assert_eq!(for_error(&config), CONFIGURATION);

        let failed = anyhow::Error::new(TransformError::ToolchainExecution {
            command_line: "transcrypt app.py".to_string(),
            status: "exit code 1".to_string(),
            stderr: String::new(),
        });
        assert_eq!(for_error(&failed), TOOLCHAIN_FAILED);

        assert_eq!(for_error(&anyhow::anyhow!("boom")), FAILED);
    }

    #[test]
    fn context_does_not_hide_kind() {
        let err = anyhow::Error::new(TransformError::ToolchainMissing {
            runtime: "python3".to_string(),
        })
        .context("transform src/app.py");
        assert_eq!(for_error(&err), CONFIGURATION);
    }
}
