//! Lexical path helpers. Nothing here touches the filesystem, so paths may
//! name files that do not exist yet.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without consulting the filesystem.
///
/// `..` at the root stays at the root; leading `..` in relative paths is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Join `path` onto `base` (absolute `path` wins) and normalize the result.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    normalize(&base.join(path))
}

/// `/`-separated relative path leading from directory `from` to `to`.
///
/// Both inputs are normalized first. Identical paths yield `"."`.
pub fn relative(from: &Path, to: &Path) -> String {
    let from = normalize(from);
    let to = normalize(to);
    let from_parts: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(from_parts[common..].iter().map(|_| "..".to_string()));
    parts.extend(
        to_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Render a path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(
            normalize(Path::new("/proj/src/../.build/./x")),
            PathBuf::from("/proj/.build/x")
        );
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../a/../b")), PathBuf::from("../b"));
    }

    #[test]
    fn relative_walks_up_then_down() {
        assert_eq!(
            relative(Path::new("/proj/src"), Path::new("/proj/.build")),
            "../.build"
        );
        assert_eq!(
            relative(Path::new("/proj/src/pkg"), Path::new("/proj/out/js")),
            "../../out/js"
        );
        assert_eq!(
            relative(Path::new("/proj"), Path::new("/proj/src/app.py")),
            "src/app.py"
        );
    }

    #[test]
    fn relative_of_same_dir_is_dot() {
        assert_eq!(relative(Path::new("/proj/src"), Path::new("/proj/src/")), ".");
    }

    #[test]
    fn resolve_lets_absolute_paths_win() {
        assert_eq!(
            resolve(Path::new("/proj"), Path::new("/tmp/out")),
            PathBuf::from("/tmp/out")
        );
        assert_eq!(
            resolve(Path::new("/proj/src"), Path::new("../.build")),
            PathBuf::from("/proj/.build")
        );
    }
}
