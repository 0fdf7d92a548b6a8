//! User overrides stored in the project manifest.
//!
//! Overrides live under the `parcel-transformer-transcrypt` key of
//! `package.json`, or under `[tool.parcel-transformer-transcrypt]` in
//! `pyproject.toml`. The nearest manifest carrying the key wins, searching from
//! the source file's directory up to the project root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::path::normalize;
use crate::core::types::{PACKAGE_KEY, UserConfig};

pub const PACKAGE_JSON: &str = "package.json";
pub const PYPROJECT_TOML: &str = "pyproject.toml";

/// Overrides plus the manifest they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: UserConfig,
}

/// Find the user configuration for `source_file`.
///
/// Returns `None` when no manifest between the source directory and the
/// project root carries the key; defaults apply in that case. A manifest that
/// exists but cannot be parsed is an error.
pub fn load_user_config(source_file: &Path, project_root: &Path) -> Result<Option<LoadedConfig>> {
    let project_root = normalize(project_root);
    let source_file = normalize(source_file);
    let mut dir = source_file.parent();

    while let Some(current) = dir {
        for name in [PACKAGE_JSON, PYPROJECT_TOML] {
            let path = current.join(name);
            if !path.is_file() {
                continue;
            }
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            let parsed = if name == PACKAGE_JSON {
                parse_package_json(&contents)
            } else {
                parse_pyproject_toml(&contents)
            }
            .with_context(|| format!("parse {}", path.display()))?;
            if let Some(config) = parsed {
                debug!(path = %path.display(), "loaded user config");
                return Ok(Some(LoadedConfig { path, config }));
            }
        }
        if current == project_root.as_path() || !current.starts_with(&project_root) {
            break;
        }
        dir = current.parent();
    }

    debug!("no user config found, using defaults");
    Ok(None)
}

/// Extract the overrides from `package.json` contents.
pub fn parse_package_json(contents: &str) -> Result<Option<UserConfig>> {
    let value: serde_json::Value = serde_json::from_str(contents).context("parse json")?;
    match value.get(PACKAGE_KEY) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(section) => {
            let config = serde_json::from_value(section.clone())
                .with_context(|| format!("invalid '{PACKAGE_KEY}' section"))?;
            Ok(Some(config))
        }
    }
}

/// Extract the overrides from `pyproject.toml` contents.
pub fn parse_pyproject_toml(contents: &str) -> Result<Option<UserConfig>> {
    let value: toml::Table = toml::from_str(contents).context("parse toml")?;
    let section = value
        .get("tool")
        .and_then(|tool| tool.get(PACKAGE_KEY))
        .cloned();
    match section {
        None => Ok(None),
        Some(section) => {
            let config: UserConfig = section
                .try_into()
                .with_context(|| format!("invalid 'tool.{PACKAGE_KEY}' table"))?;
            Ok(Some(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_json_without_key_is_none() {
        let parsed = parse_package_json(r#"{"name": "demo", "version": "1.0.0"}"#).expect("parse");
        assert_eq!(parsed, None);
    }

    #[test]
    fn package_json_section_is_parsed() {
        let parsed = parse_package_json(
            r#"{
                "name": "demo",
                "parcel-transformer-transcrypt": {
                    "command": "python3.9 -m transcrypt",
                    "arguments": ["--nomin", "--outdir web"]
                }
            }"#,
        )
        .expect("parse")
        .expect("section");
        assert_eq!(parsed.command.as_deref(), Some("python3.9 -m transcrypt"));
        assert_eq!(
            parsed.arguments,
            Some(vec!["--nomin".to_string(), "--outdir web".to_string()])
        );
    }

    #[test]
    fn package_json_with_wrong_types_is_error() {
        let err = parse_package_json(r#"{"parcel-transformer-transcrypt": {"arguments": "--map"}}"#)
            .expect_err("wrong type");
        assert!(format!("{err:#}").contains("invalid 'parcel-transformer-transcrypt' section"));
    }

    #[test]
    fn pyproject_table_is_parsed() {
        let parsed = parse_pyproject_toml(
            r#"
[project]
name = "demo"

[tool.parcel-transformer-transcrypt]
transcryptVersion = "3.9.0"
watchAllFiles = false
"#,
        )
        .expect("parse")
        .expect("section");
        assert_eq!(parsed.transcrypt_version.as_deref(), Some("3.9.0"));
        assert_eq!(parsed.watch_all_files, Some(false));
    }

    #[test]
    fn nearest_manifest_with_key_wins() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        let pkg = root.join("src").join("pkg");
        fs::create_dir_all(&pkg).expect("mkdir");
        fs::write(
            root.join(PACKAGE_JSON),
            r#"{"parcel-transformer-transcrypt": {"command": "python3 -m transcrypt"}}"#,
        )
        .expect("write root");
        fs::write(root.join("src").join(PACKAGE_JSON), r#"{"name": "inner"}"#)
            .expect("write inner");

        let loaded = load_user_config(&pkg.join("app.py"), root)
            .expect("load")
            .expect("config");
        assert_eq!(loaded.path, root.join(PACKAGE_JSON));
        assert_eq!(loaded.config.command.as_deref(), Some("python3 -m transcrypt"));
    }

    #[test]
    fn missing_manifests_yield_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        let loaded = load_user_config(&temp.path().join("app.py"), temp.path()).expect("load");
        assert_eq!(loaded, None);
    }

    #[test]
    fn search_stops_at_project_root() {
        let temp = tempfile::tempdir().expect("tempdir");
        let outer = temp.path();
        let root = outer.join("project");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(
            outer.join(PACKAGE_JSON),
            r#"{"parcel-transformer-transcrypt": {"command": "transcrypt"}}"#,
        )
        .expect("write outer");

        let loaded = load_user_config(&root.join("app.py"), &root).expect("load");
        assert_eq!(loaded, None);
    }
}
