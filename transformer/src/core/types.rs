//! Shared deterministic types for configuration resolution.
//!
//! These types carry no I/O and are safe to construct in tests.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Key under which user overrides live in `package.json` / `pyproject.toml`.
pub const PACKAGE_KEY: &str = "parcel-transformer-transcrypt";

/// Name the toolchain is recognized by inside command strings.
pub const TOOLCHAIN_NAME: &str = "transcrypt";

/// Name the companion runtime is recognized by inside command strings.
pub const RUNTIME_NAME: &str = "python";

pub const DEFAULT_COMMAND: &str = "python -m transcrypt";

/// Toolchain flags used when the user does not supply an argument list.
///
/// The host minifies and handles source maps itself, so the toolchain is told
/// not to minify, to emit maps, and to be verbose. `--build` is never used:
/// with several entry points it wipes the previous run's output.
pub const DEFAULT_ARGUMENTS: [&str; 3] = ["--nomin", "--map", "--verbose"];

/// Project-root-relative output directory for toolchains that accept `--outdir`.
pub const BUILD_DIR: &str = ".build";

/// Output directory older toolchains always write to, next to the source file.
pub const TOOL_DEFAULT_DIR: &str = "__target__";

/// First toolchain version that understands `--outdir`.
pub const OUTDIR_MIN_VERSION: Version = Version::new(3, 9);

/// A `major.minor` version pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    /// Sentinel reported when the runtime works but the toolchain module is absent.
    pub const NOT_INSTALLED: Version = Version::new(0, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn is_not_installed(self) -> bool {
        self == Self::NOT_INSTALLED
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Which executable a version probe targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Toolchain,
    Runtime,
}

impl ToolKind {
    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Toolchain => "Transcrypt",
            ToolKind::Runtime => "Python",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User overrides as written in the project manifest. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserConfig {
    /// Invocation command, e.g. `python3.9 -m transcrypt`.
    pub command: Option<String>,
    /// Declared toolchain version; skips live detection when set.
    pub transcrypt_version: Option<String>,
    /// Watch every module the toolchain processed (development builds only).
    pub watch_all_files: Option<bool>,
    /// Full argument list; replaces the defaults outright.
    pub arguments: Option<Vec<String>>,
    /// Require runtime and toolchain versions to match during live detection.
    pub check_python_version: Option<bool>,
}

impl UserConfig {
    pub fn watch_all_files(&self) -> bool {
        self.watch_all_files.unwrap_or(true)
    }

    pub fn check_python_version(&self) -> bool {
        self.check_python_version.unwrap_or(true)
    }
}

/// Fully merged, validated settings for one toolchain invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    pub command: String,
    pub arguments: Vec<String>,
    /// Output directory relative to the source file's directory (`/`-separated).
    pub output_dir: String,
    pub output_dir_abs: PathBuf,
    pub toolchain_version: Version,
}

/// Where the toolchain writes its output for a given version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// Fixed directory next to the source file; `--outdir` is not understood.
    ToolDefault,
    /// Project-root build directory passed explicitly through `--outdir`.
    ProjectBuildDir,
}

impl OutputLayout {
    pub fn for_version(version: Version) -> Self {
        if version < OUTDIR_MIN_VERSION {
            OutputLayout::ToolDefault
        } else {
            OutputLayout::ProjectBuildDir
        }
    }

    pub fn supports_outdir(self) -> bool {
        matches!(self, OutputLayout::ProjectBuildDir)
    }
}
