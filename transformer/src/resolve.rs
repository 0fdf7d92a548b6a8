//! Configuration resolution for one source file.
//!
//! Merges built-in defaults, user overrides and the toolchain version into an
//! [`EffectiveConfig`]. Each step returns new values; the defaults are never
//! mutated, so resolving many files in one build cannot accumulate arguments.

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::core::command::derive_runtime_command;
use crate::core::outdir::plan_output;
use crate::core::path::normalize;
use crate::core::types::{
    DEFAULT_ARGUMENTS, DEFAULT_COMMAND, EffectiveConfig, OutputLayout, TOOLCHAIN_NAME, ToolKind,
    UserConfig, Version,
};
use crate::core::version::parse_declared;
use crate::error::{ConfigError, TransformError};
use crate::io::probe::VersionProbe;

/// Resolve the effective configuration for `source_file`.
///
/// `source_file` and `project_root` must be absolute. Probing only happens when
/// the user has not declared `transcryptVersion`, and never before the command
/// string has been validated.
#[instrument(skip_all, fields(source = %source_file.display()))]
pub fn resolve_config<P: VersionProbe + ?Sized>(
    user: &UserConfig,
    source_file: &Path,
    project_root: &Path,
    probe: &P,
) -> Result<EffectiveConfig, TransformError> {
    let command = resolve_command(user)?;
    let toolchain_version = resolve_toolchain_version(user, &command, probe)?;
    let layout = OutputLayout::for_version(toolchain_version);
    debug!(%toolchain_version, ?layout, "toolchain version resolved");

    let source_file = normalize(source_file);
    let project_root = normalize(project_root);
    let source_dir = source_file.parent().unwrap_or(&project_root);

    let base_arguments = match &user.arguments {
        Some(arguments) => arguments.clone(),
        None => DEFAULT_ARGUMENTS.iter().map(|s| s.to_string()).collect(),
    };
    let plan = plan_output(layout, &base_arguments, source_dir, &project_root);
    for warning in &plan.warnings {
        warn!("{warning}");
    }

    check_output_dir(&plan.output_dir_abs, source_dir, &project_root)?;

    Ok(EffectiveConfig {
        command,
        arguments: plan.arguments,
        output_dir: plan.output_dir,
        output_dir_abs: plan.output_dir_abs,
        toolchain_version,
    })
}

/// The configured command, validated to name the toolchain.
pub fn resolve_command(user: &UserConfig) -> Result<String, ConfigError> {
    match user.command.as_deref().map(str::trim) {
        None | Some("") => Ok(DEFAULT_COMMAND.to_string()),
        Some(command) if command.contains(TOOLCHAIN_NAME) => Ok(command.to_string()),
        Some(command) => Err(ConfigError::InvalidCommand {
            command: command.to_string(),
        }),
    }
}

/// A declared version wins; otherwise detect it and enforce the version policy.
pub fn resolve_toolchain_version<P: VersionProbe + ?Sized>(
    user: &UserConfig,
    command: &str,
    probe: &P,
) -> Result<Version, TransformError> {
    if let Some(raw) = &user.transcrypt_version {
        let version = parse_declared(raw).ok_or_else(|| ConfigError::InvalidVersion {
            raw: raw.clone(),
        })?;
        debug!(%version, "using declared toolchain version");
        return Ok(version);
    }

    let toolchain = match probe.version(command, ToolKind::Toolchain) {
        Some(version) if version.is_not_installed() => {
            return Err(TransformError::ToolchainMissing {
                runtime: derive_runtime_command(command),
            });
        }
        Some(version) => version,
        None => {
            return Err(ConfigError::VersionUndetermined {
                kind: ToolKind::Toolchain,
                command: command.to_string(),
            }
            .into());
        }
    };

    if !user.check_python_version() {
        debug!("python version check disabled");
        return Ok(toolchain);
    }

    match probe.version(command, ToolKind::Runtime) {
        Some(runtime) if runtime == toolchain => Ok(toolchain),
        Some(runtime) => Err(TransformError::VersionMismatch { runtime, toolchain }),
        None => Err(ConfigError::VersionUndetermined {
            kind: ToolKind::Runtime,
            command: derive_runtime_command(command),
        }
        .into()),
    }
}

/// Refuse output directories that would overwrite sources.
pub fn check_output_dir(
    output_dir_abs: &Path,
    source_dir: &Path,
    project_root: &Path,
) -> Result<(), ConfigError> {
    let output_dir = normalize(output_dir_abs);
    let collides_with = if output_dir == normalize(source_dir) {
        "source file"
    } else if output_dir == normalize(project_root) {
        "project root"
    } else {
        return Ok(());
    };
    Err(ConfigError::OutputDirCollision {
        output_dir,
        source_dir: source_dir.to_path_buf(),
        collides_with,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::command::build_argv;
    use crate::test_support::StaticVersions;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn resolve(user: &UserConfig, probe: &StaticVersions) -> Result<EffectiveConfig, TransformError> {
        resolve_config(
            user,
            Path::new("/proj/src/app.py"),
            Path::new("/proj"),
            probe,
        )
    }

    #[test]
    fn defaults_with_modern_toolchain() {
        let probe = StaticVersions::matching(Version::new(3, 9));
        let cfg = resolve(&UserConfig::default(), &probe).expect("resolve");
        assert_eq!(cfg.command, "python -m transcrypt");
        assert_eq!(
            cfg.arguments,
            strings(&["--nomin", "--map", "--verbose", "--outdir ../.build"])
        );
        assert_eq!(cfg.output_dir, "../.build");
        assert_eq!(cfg.output_dir_abs, PathBuf::from("/proj/.build"));
        assert_eq!(cfg.toolchain_version, Version::new(3, 9));
    }

    #[test]
    fn resolving_twice_does_not_accumulate_arguments() {
        let probe = StaticVersions::matching(Version::new(3, 9));
        let first = resolve(&UserConfig::default(), &probe).expect("first");
        let second = resolve(&UserConfig::default(), &probe).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_command_fails_before_probing() {
        let probe = StaticVersions::matching(Version::new(3, 9));
        let user = UserConfig {
            command: Some("ruby foo".to_string()),
            ..UserConfig::default()
        };
        let err = resolve(&user, &probe).expect_err("invalid command");
        assert!(matches!(
            err,
            TransformError::Configuration(ConfigError::InvalidCommand { .. })
        ));
        assert_eq!(probe.calls(), 0);
    }

    #[test]
    fn declared_version_skips_detection_and_mismatch_check() {
        let probe = StaticVersions::new(None, None);
        let user = UserConfig {
            transcrypt_version: Some("3.7.16".to_string()),
            ..UserConfig::default()
        };
        let cfg = resolve(&user, &probe).expect("resolve");
        assert_eq!(cfg.toolchain_version, Version::new(3, 7));
        assert_eq!(probe.calls(), 0);
    }

    #[test]
    fn invalid_declared_version_is_configuration_error() {
        let probe = StaticVersions::matching(Version::new(3, 9));
        let user = UserConfig {
            transcrypt_version: Some("three".to_string()),
            ..UserConfig::default()
        };
        let err = resolve(&user, &probe).expect_err("invalid version");
        assert!(matches!(
            err,
            TransformError::Configuration(ConfigError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn missing_toolchain_is_reported() {
        let probe = StaticVersions::new(Some(Version::NOT_INSTALLED), Some(Version::new(3, 9)));
        let user = UserConfig {
            command: Some("python3.9 -m transcrypt".to_string()),
            ..UserConfig::default()
        };
        let err = resolve(&user, &probe).expect_err("missing toolchain");
        match err {
            TransformError::ToolchainMissing { runtime } => assert_eq!(runtime, "python3.9"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn undetectable_toolchain_is_configuration_error() {
        let probe = StaticVersions::new(None, Some(Version::new(3, 9)));
        let err = resolve(&UserConfig::default(), &probe).expect_err("undetermined");
        assert!(matches!(
            err,
            TransformError::Configuration(ConfigError::VersionUndetermined {
                kind: ToolKind::Toolchain,
                ..
            })
        ));
    }

    #[test]
    fn undetectable_runtime_is_configuration_error() {
        let probe = StaticVersions::new(Some(Version::new(3, 9)), None);
        let user = UserConfig {
            command: Some("python3.9 -m transcrypt".to_string()),
            ..UserConfig::default()
        };
        let err = resolve(&user, &probe).expect_err("runtime undetermined");
        match err {
            TransformError::Configuration(ConfigError::VersionUndetermined { kind, command }) => {
                assert_eq!(kind, ToolKind::Runtime);
                assert_eq!(command, "python3.9");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(probe.calls(), 2);
    }

    #[test]
    fn version_mismatch_fails_by_default() {
        let probe = StaticVersions::new(Some(Version::new(3, 9)), Some(Version::new(3, 10)));
        let err = resolve(&UserConfig::default(), &probe).expect_err("mismatch");
        assert!(matches!(
            err,
            TransformError::VersionMismatch {
                runtime: Version { major: 3, minor: 10 },
                toolchain: Version { major: 3, minor: 9 },
            }
        ));
    }

    #[test]
    fn version_mismatch_can_be_relaxed() {
        let probe = StaticVersions::new(Some(Version::new(3, 9)), Some(Version::new(3, 10)));
        let user = UserConfig {
            check_python_version: Some(false),
            ..UserConfig::default()
        };
        let cfg = resolve(&user, &probe).expect("relaxed");
        assert_eq!(cfg.toolchain_version, Version::new(3, 9));
        assert_eq!(probe.calls(), 1);
    }

    #[test]
    fn user_arguments_replace_defaults() {
        let probe = StaticVersions::matching(Version::new(3, 9));
        let user = UserConfig {
            arguments: Some(strings(&["--map", "--outdir web"])),
            ..UserConfig::default()
        };
        let cfg = resolve(&user, &probe).expect("resolve");
        assert_eq!(cfg.arguments, strings(&["--map", "--outdir ../web"]));
        assert_eq!(cfg.output_dir_abs, PathBuf::from("/proj/web"));
    }

    #[test]
    fn outdir_with_spaces_reaches_toolchain_intact() {
        let probe = StaticVersions::matching(Version::new(3, 9));
        let user = UserConfig {
            arguments: Some(strings(&["--outdir web out"])),
            ..UserConfig::default()
        };
        let cfg = resolve(&user, &probe).expect("resolve");
        assert_eq!(cfg.output_dir_abs, PathBuf::from("/proj/web out"));
        assert_eq!(
            build_argv(&cfg.command, &cfg.arguments, "src/app.py"),
            strings(&["python", "-m", "transcrypt", "--outdir", "../web out", "src/app.py"])
        );
    }

    #[test]
    fn user_arguments_without_outdir_get_default() {
        let probe = StaticVersions::matching(Version::new(3, 9));
        let user = UserConfig {
            arguments: Some(strings(&["--nomin"])),
            ..UserConfig::default()
        };
        let cfg = resolve(&user, &probe).expect("resolve");
        assert_eq!(cfg.arguments, strings(&["--nomin", "--outdir ../.build"]));
    }

    #[test]
    fn legacy_toolchain_never_gets_outdir() {
        let probe = StaticVersions::matching(Version::new(3, 7));
        let user = UserConfig {
            arguments: Some(strings(&["--nomin", "--outdir web"])),
            ..UserConfig::default()
        };
        let cfg = resolve(&user, &probe).expect("resolve");
        assert_eq!(cfg.arguments, strings(&["--nomin"]));
        assert_eq!(cfg.output_dir, "__target__");
        assert_eq!(cfg.output_dir_abs, PathBuf::from("/proj/src/__target__"));
    }

    #[test]
    fn outdir_equal_to_source_dir_is_rejected() {
        let probe = StaticVersions::matching(Version::new(3, 9));
        let user = UserConfig {
            arguments: Some(strings(&["--outdir src"])),
            ..UserConfig::default()
        };
        let err = resolve(&user, &probe).expect_err("collision");
        assert!(matches!(
            err,
            TransformError::Configuration(ConfigError::OutputDirCollision {
                collides_with: "source file",
                ..
            })
        ));
    }

    #[test]
    fn outdir_equal_to_project_root_is_rejected() {
        let probe = StaticVersions::matching(Version::new(3, 9));
        for outdir in ["--outdir .", "--outdir=./", "--outdir src/.."] {
            let user = UserConfig {
                arguments: Some(strings(&[outdir])),
                ..UserConfig::default()
            };
            let err = resolve(&user, &probe).expect_err("collision");
            assert!(
                matches!(
                    err,
                    TransformError::Configuration(ConfigError::OutputDirCollision {
                        collides_with: "project root",
                        ..
                    })
                ),
                "{outdir}"
            );
        }
    }

    #[test]
    fn source_in_project_root_collides_with_root_output() {
        let probe = StaticVersions::matching(Version::new(3, 9));
        let user = UserConfig {
            arguments: Some(strings(&["--outdir ."])),
            ..UserConfig::default()
        };
        let err = resolve_config(
            &user,
            Path::new("/proj/app.py"),
            Path::new("/proj"),
            &probe,
        )
        .expect_err("collision");
        assert!(matches!(err, TransformError::Configuration(_)));
    }

    #[test]
    fn blank_command_uses_default() {
        let user = UserConfig {
            command: Some("  ".to_string()),
            ..UserConfig::default()
        };
        assert_eq!(resolve_command(&user).expect("command"), DEFAULT_COMMAND);
    }
}
