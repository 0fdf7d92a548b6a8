//! Orchestration for transforming one Python asset.
//!
//! Resolves the effective configuration, runs the toolchain from the project
//! root, registers watched files in development builds, and replaces the
//! asset's code with a re-export of the generated module.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument};

use crate::core::path::resolve;
use crate::core::reexport::reexport_code;
use crate::core::types::{EffectiveConfig, UserConfig};
use crate::host::{Asset, AssetType, BuildOptions};
use crate::io::invoke::run_toolchain;
use crate::io::manifest::extract_watch_set;
use crate::io::package_config::load_user_config;
use crate::io::probe::{ProcessProbe, VersionProbe};
use crate::io::process::CommandRunner;
use crate::resolve::resolve_config;

/// Host plugin that hands Python assets to Transcrypt.
#[derive(Debug, Clone, Default)]
pub struct TranscryptTransformer<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> TranscryptTransformer<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Config-loading callback: user overrides for `source_file`, if any.
    pub fn load_config(&self, source_file: &Path, project_root: &Path) -> Result<Option<UserConfig>> {
        let source_file = resolve(project_root, source_file);
        let loaded = load_user_config(&source_file, project_root)?;
        Ok(loaded.map(|loaded| loaded.config))
    }

    /// Resolve the effective configuration without running the toolchain.
    pub fn resolve(
        &self,
        config: Option<&UserConfig>,
        source_file: &Path,
        project_root: &Path,
    ) -> Result<EffectiveConfig> {
        self.resolve_with(&ProcessProbe::new(&self.runner), config, source_file, project_root)
    }

    fn resolve_with<P: VersionProbe + ?Sized>(
        &self,
        probe: &P,
        config: Option<&UserConfig>,
        source_file: &Path,
        project_root: &Path,
    ) -> Result<EffectiveConfig> {
        let defaults = UserConfig::default();
        let user = config.unwrap_or(&defaults);
        let source_file = resolve(project_root, source_file);
        Ok(resolve_config(user, &source_file, project_root, probe)?)
    }

    /// Transform callback. Returns the asset, now a JavaScript re-export module.
    pub fn transform<A: Asset>(
        &self,
        asset: A,
        config: Option<&UserConfig>,
        options: &BuildOptions,
    ) -> Result<Vec<A>> {
        self.transform_with(&ProcessProbe::new(&self.runner), asset, config, options)
    }

    /// Like [`transform`](Self::transform) with an explicit version source.
    #[instrument(skip_all, fields(asset = %asset.file_path().display(), mode = ?options.mode))]
    pub fn transform_with<A: Asset, P: VersionProbe + ?Sized>(
        &self,
        probe: &P,
        mut asset: A,
        config: Option<&UserConfig>,
        options: &BuildOptions,
    ) -> Result<Vec<A>> {
        let project_root = &options.project_root;
        let source_file = resolve(project_root, asset.file_path());
        let stem = source_stem(&source_file)?;

        let defaults = UserConfig::default();
        let user = config.unwrap_or(&defaults);
        let effective = self.resolve_with(probe, Some(user), &source_file, project_root)?;
        debug!(config = ?effective, "effective configuration");

        run_toolchain(&self.runner, &effective, &source_file, project_root)?;

        if options.mode.watches_files() {
            for path in watched_files(user, &effective, &source_file, &stem, project_root) {
                debug!(path = %path.display(), "watching file");
                asset.invalidate_on_file_change(&path);
            }
        }

        let code = reexport_code(&effective.output_dir, &stem);
        info!(code = %code, "asset replaced with re-export");
        asset.set_code(code);
        asset.set_type(AssetType::Js);
        Ok(vec![asset])
    }
}

/// Files a development build should watch after a successful run.
fn watched_files(
    user: &UserConfig,
    effective: &EffectiveConfig,
    source_file: &Path,
    stem: &str,
    project_root: &Path,
) -> Vec<PathBuf> {
    if !user.watch_all_files() {
        return vec![source_file.to_path_buf()];
    }
    extract_watch_set(&effective.output_dir_abs, stem, project_root)
        .into_iter()
        .collect()
}

fn source_stem(source_file: &Path) -> Result<String> {
    source_file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("source file has no usable name"))
        .with_context(|| format!("transform {}", source_file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_stem_drops_extension() {
        assert_eq!(
            source_stem(Path::new("/proj/src/app.py")).expect("stem"),
            "app"
        );
        assert!(source_stem(Path::new("/")).is_err());
    }
}
