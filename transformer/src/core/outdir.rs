//! Output-directory planning for the toolchain argument list.
//!
//! The argument list that comes out of [`plan_output`] contains at most one
//! `--outdir` entry, always expressed relative to the source file's directory.
//! User-supplied values are read relative to the project root.

use std::path::{Path, PathBuf};

use crate::core::path::{relative, resolve};
use crate::core::types::{BUILD_DIR, OutputLayout, TOOL_DEFAULT_DIR};

const OUTDIR_FLAGS: [&str; 2] = ["--outdir", "-od"];

/// Argument list and output directory derived for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    pub arguments: Vec<String>,
    /// Output directory relative to the source directory (`/`-separated).
    pub output_dir: String,
    pub output_dir_abs: PathBuf,
    /// Problems with user-supplied `--outdir` values, for the caller to log.
    pub warnings: Vec<String>,
}

/// Argument list split into everything else and the `--outdir` values it held.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitArguments {
    pub rest: Vec<String>,
    /// Values in order of appearance; `None` for a flag without a value.
    pub outdirs: Vec<Option<String>>,
}

/// Separate `--outdir` entries from the rest of an argument list.
///
/// Recognizes `--outdir X`, `--outdir=X`, a flag followed by a separate value
/// entry, and the short `-od` spelling of each.
pub fn split_outdir(arguments: &[String]) -> SplitArguments {
    let mut split = SplitArguments::default();
    let mut iter = arguments.iter().peekable();
    while let Some(arg) = iter.next() {
        let trimmed = arg.trim();
        let Some((flag, inline)) = match_outdir_flag(trimmed) else {
            split.rest.push(arg.clone());
            continue;
        };
        let value = match inline {
            Some(value) if !value.is_empty() => Some(value.to_string()),
            Some(_) => None,
            None => iter
                .next_if(|next| !next.trim_start().starts_with('-'))
                .map(|next| next.trim().to_string())
                .filter(|next| !next.is_empty()),
        };
        tracing::trace!(flag, value = ?value, "found outdir argument");
        split.outdirs.push(value);
    }
    split
}

/// Returns the matched flag and, for `flag value`/`flag=value`, the inline value.
pub(crate) fn match_outdir_flag(arg: &str) -> Option<(&'static str, Option<&str>)> {
    for flag in OUTDIR_FLAGS {
        let Some(rest) = arg.strip_prefix(flag) else {
            continue;
        };
        if rest.is_empty() {
            return Some((flag, None));
        }
        if let Some(value) = rest.strip_prefix('=') {
            return Some((flag, Some(value.trim())));
        }
        if rest.starts_with(char::is_whitespace) {
            return Some((flag, Some(rest.trim())));
        }
    }
    None
}

/// Compute the output directory and final argument list for `layout`.
pub fn plan_output(
    layout: OutputLayout,
    arguments: &[String],
    source_dir: &Path,
    project_root: &Path,
) -> OutputPlan {
    let split = split_outdir(arguments);
    let mut warnings = Vec::new();
    let mut args = split.rest;

    match layout {
        OutputLayout::ToolDefault => {
            for value in &split.outdirs {
                warnings.push(format!(
                    "ignoring '--outdir {}': this Transcrypt version does not support --outdir \
                     and always writes to '{TOOL_DEFAULT_DIR}' next to the source file",
                    value.as_deref().unwrap_or("")
                ));
            }
            OutputPlan {
                arguments: args,
                output_dir: TOOL_DEFAULT_DIR.to_string(),
                output_dir_abs: resolve(source_dir, Path::new(TOOL_DEFAULT_DIR)),
                warnings,
            }
        }
        OutputLayout::ProjectBuildDir => {
            let mut values = split.outdirs.into_iter();
            let chosen = match values.next() {
                Some(Some(value)) => value,
                Some(None) => {
                    warnings.push(format!(
                        "'--outdir' given without a value; using '{BUILD_DIR}'"
                    ));
                    BUILD_DIR.to_string()
                }
                None => BUILD_DIR.to_string(),
            };
            for extra in values {
                warnings.push(format!(
                    "ignoring additional '--outdir {}'; only the first one is used",
                    extra.as_deref().unwrap_or("")
                ));
            }
            let output_dir_abs = resolve(project_root, Path::new(&chosen));
            let output_dir = relative(source_dir, &output_dir_abs);
            args.push(format!("--outdir {output_dir}"));
            OutputPlan {
                arguments: args,
                output_dir,
                output_dir_abs,
                warnings,
            }
        }
    }
}
