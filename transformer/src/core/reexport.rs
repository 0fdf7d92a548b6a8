//! Synthetic module handed back to the host in place of the Python source.
//!
//! Rather than reading the generated JavaScript, the asset becomes a single
//! re-export of the toolchain's output file and the host bundles from there.

/// Import specifier for the generated module of `stem` inside `output_dir`.
///
/// `output_dir` is relative to the source directory. The result is prefixed
/// with `./` unless it already ascends with `../`.
pub fn import_path(output_dir: &str, stem: &str) -> String {
    let dir = output_dir.trim_end_matches('/');
    let joined = if dir.is_empty() || dir == "." {
        format!("{stem}.js")
    } else {
        format!("{dir}/{stem}.js")
    };
    if joined.starts_with("../") {
        joined
    } else {
        format!("./{}", joined.trim_start_matches("./"))
    }
}

/// `export * from "<import path>";`
pub fn reexport_code(output_dir: &str, stem: &str) -> String {
    format!("export * from \"{}\";", import_path(output_dir, stem))
}
