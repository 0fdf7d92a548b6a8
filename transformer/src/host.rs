//! Interfaces consumed from, and exposed to, the host bundler.
//!
//! The bundler owns the asset graph and the file watcher; this crate only sees
//! an [`Asset`] handle and the [`BuildOptions`] of the current build.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Build mode reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Only interactive builds need incremental invalidation.
    pub fn watches_files(self) -> bool {
        matches!(self, BuildMode::Development)
    }
}

/// Declared type of the code an asset carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Python source, before transformation.
    Py,
    /// JavaScript module.
    Js,
}

impl AssetType {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "py" => Some(AssetType::Py),
            "js" | "mjs" => Some(AssetType::Js),
            _ => None,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetType::Py => "py",
            AssetType::Js => "js",
        })
    }
}

/// Options of the build the transform runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Absolute project root; the toolchain always runs from here.
    pub project_root: PathBuf,
    pub mode: BuildMode,
}

/// Host-owned handle for one file in the asset graph.
pub trait Asset {
    /// Absolute path of the source file.
    fn file_path(&self) -> &Path;
    /// Rebuild this asset when `path` changes.
    fn invalidate_on_file_change(&mut self, path: &Path);
    fn set_code(&mut self, code: String);
    fn set_type(&mut self, asset_type: AssetType);
}

/// In-memory asset used by the CLI and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryAsset {
    pub file_path: PathBuf,
    pub code: Option<String>,
    pub asset_type: Option<AssetType>,
    pub invalidations: BTreeSet<PathBuf>,
}

impl MemoryAsset {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        let asset_type = AssetType::from_path(&file_path);
        Self {
            file_path,
            code: None,
            asset_type,
            invalidations: BTreeSet::new(),
        }
    }
}

impl Asset for MemoryAsset {
    fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn invalidate_on_file_change(&mut self, path: &Path) {
        self.invalidations.insert(path.to_path_buf());
    }

    fn set_code(&mut self, code: String) {
        self.code = Some(code);
    }

    fn set_type(&mut self, asset_type: AssetType) {
        self.asset_type = Some(asset_type);
    }
}
