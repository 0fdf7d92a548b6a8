//! Version string grammar for toolchain and runtime diagnostic output.
//!
//! Probe output is matched case-insensitively and only the first match counts:
//!
//! - toolchain (`--help` banner): `transcrypt .*version (\d+)\.(\d{1,2})\.\d{1,2}`
//! - runtime (`--version`):       `python (\d+)\.(\d{1,2})\.\d{1,2}`
//!
//! Only `major.minor` is kept; the patch component must be present for a match
//! but is discarded.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::{ToolKind, Version};

static TOOLCHAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)transcrypt .*version (\d+)\.(\d{1,2})\.\d{1,2}").expect("toolchain regex")
});

static RUNTIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)python (\d+)\.(\d{1,2})\.\d{1,2}").expect("runtime regex")
});

static DECLARED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)(?:\.\d+)?$").expect("declared version regex"));

/// Extract the first `major.minor` version for `kind` from probe output.
pub fn parse_probe_output(output: &str, kind: ToolKind) -> Option<Version> {
    let re = match kind {
        ToolKind::Toolchain => &*TOOLCHAIN_RE,
        ToolKind::Runtime => &*RUNTIME_RE,
    };
    let caps = re.captures(output)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some(Version::new(major, minor))
}

/// Parse a user-declared `major.minor[.patch]` version, normalized to `major.minor`.
pub fn parse_declared(raw: &str) -> Option<Version> {
    let caps = DECLARED_RE.captures(raw.trim())?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some(Version::new(major, minor))
}
