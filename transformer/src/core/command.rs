//! Command-line synthesis from free-form command strings.

use crate::core::outdir::match_outdir_flag;
use crate::core::types::{RUNTIME_NAME, TOOLCHAIN_NAME};

/// Derive the toolchain executable from a configured command string.
///
/// - no mention of the toolchain: `None`
/// - first token ends with the toolchain name: that token (direct executable)
/// - first token names the runtime: `<token> -m transcrypt`
/// - otherwise: the bare toolchain name
pub fn derive_toolchain_command(command: &str) -> Option<String> {
    if !command.contains(TOOLCHAIN_NAME) {
        return None;
    }
    match command.split_whitespace().next() {
        Some(first) if first.ends_with(TOOLCHAIN_NAME) => Some(first.to_string()),
        Some(first) if first.contains(RUNTIME_NAME) => {
            Some(format!("{first} -m {TOOLCHAIN_NAME}"))
        }
        _ => Some(TOOLCHAIN_NAME.to_string()),
    }
}

/// Derive the runtime executable: the first token if it names the runtime,
/// otherwise the bare runtime name.
pub fn derive_runtime_command(command: &str) -> String {
    match command.split_whitespace().next() {
        Some(first) if first.contains(RUNTIME_NAME) => first.to_string(),
        _ => RUNTIME_NAME.to_string(),
    }
}

/// Split a command string and argument entries into argv words.
///
/// Entries are split on whitespace, so `--nomin --map` becomes two words.
/// An output-directory entry splits only after its flag: `--outdir ../web out`
/// becomes `--outdir` and `../web out`, and `--outdir=../web out` stays one word.
/// No shell is involved; quoting is not interpreted.
pub fn build_argv(command: &str, arguments: &[String], source: &str) -> Vec<String> {
    command
        .split_whitespace()
        .map(str::to_string)
        .chain(arguments.iter().flat_map(|arg| argument_words(arg)))
        .chain(std::iter::once(source.to_string()))
        .collect()
}

fn argument_words(arg: &str) -> Vec<String> {
    let trimmed = arg.trim();
    match match_outdir_flag(trimmed) {
        Some((flag, Some(value))) if !value.is_empty() => {
            if trimmed[flag.len()..].starts_with('=') {
                vec![trimmed.to_string()]
            } else {
                vec![flag.to_string(), value.to_string()]
            }
        }
        _ => trimmed.split_whitespace().map(str::to_string).collect(),
    }
}
