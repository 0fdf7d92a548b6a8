//! Run manifest (`<outdir>/<stem>.project`) reader and watch-set extraction.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::path::{resolve, to_slash};

/// Subset of the toolchain's project file this crate reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunManifest {
    pub modules: Vec<ManifestModule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestModule {
    pub source: String,
}

impl ManifestModule {
    /// True for the toolchain's own runtime support modules.
    ///
    /// Older releases record them as `.../__runtime__.py`, newer ones under an
    /// `org/transcrypt/` tree; Windows builds may use backslashes.
    pub fn is_toolchain_internal(&self) -> bool {
        let source = self.source.replace('\\', "/");
        source.ends_with("__runtime__.py") || source.contains("org/transcrypt/")
    }
}

/// Path of the manifest the toolchain writes for `source_stem`.
pub fn manifest_path(output_dir_abs: &Path, source_stem: &str) -> PathBuf {
    output_dir_abs.join(format!("{source_stem}.project"))
}

/// Load and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<RunManifest> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

/// Absolute paths of every non-internal module the last run processed.
///
/// Never fails: a missing or unreadable manifest yields an empty set and a warning.
pub fn extract_watch_set(
    output_dir_abs: &Path,
    source_stem: &str,
    project_root: &Path,
) -> BTreeSet<PathBuf> {
    let path = manifest_path(output_dir_abs, source_stem);
    let manifest = match load_manifest(&path) {
        Ok(manifest) => manifest,
        Err(err) => {
            warn!(
                err = %format!("{err:#}"),
                "Unable to load Transcrypt project file after build: '{}'. \
                 WARNING: Source files were not added to the watch list.",
                to_slash(&path)
            );
            return BTreeSet::new();
        }
    };

    let watched: BTreeSet<PathBuf> = manifest
        .modules
        .iter()
        .filter(|module| !module.is_toolchain_internal())
        .map(|module| resolve(project_root, Path::new(&module.source)))
        .collect();
    debug!(
        modules = manifest.modules.len(),
        watched = watched.len(),
        "watch set extracted"
    );
    watched
}
