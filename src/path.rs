//! Path helpers shared by the walker and the writer.
//! Template entries are always named with `/` separators, relative to the template root.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Renders `path` with `/` as the only separator.
pub fn posix_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref().to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        path.into_owned()
    } else {
        path.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Returns `path` relative to `root`, `/`-separated.
pub fn template_path<P: AsRef<Path>, Q: AsRef<Path>>(root: P, path: Q) -> Result<String> {
    let path = path.as_ref();
    let relative = path.strip_prefix(root.as_ref()).map_err(|_| {
        Error::file(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path is outside the template root"),
        )
    })?;
    Ok(posix_path(relative))
}

/// Scope prefix of the rules declared in directory `dirname` (root-relative).
///
/// The root maps to an empty prefix, anything else ends with a `/`.
pub fn scope_prefix(dirname: &str) -> String {
    let dirname = dirname.trim_end_matches('/');
    if dirname.is_empty() {
        String::new()
    } else {
        format!("{dirname}/")
    }
}

/// Expresses absolute `target` relative to absolute directory `base`.
pub fn relative_to(base: &Path, target: &Path) -> PathBuf {
    let base: Vec<Component> = base.components().collect();
    let target: Vec<Component> = target.components().collect();
    let common = base.iter().zip(target.iter()).take_while(|(a, b)| a == b).count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

/// Joins `/`-separated `relative` onto directory `dirname`, folding `.` and `..`.
pub fn join_posix(dirname: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        return relative.to_string();
    }

    let mut parts: Vec<&str> = Vec::new();
    let leading_slash = dirname.starts_with('/');
    for part in dirname.split('/').chain(relative.split('/')) {
        match part {
            "" | "." => {}
            ".." if parts.last().is_some_and(|last| *last != "..") => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    if leading_slash {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Directory part of a `/`-separated path, empty for a bare file name.
pub fn dirname_posix(path: &str) -> &str {
    path.rfind('/').map_or("", |index| &path[..index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_posix() {
        assert_eq!(join_posix("out/include", "../src/config.h"), "out/src/config.h");
        assert_eq!(join_posix("/tmp/out", "./a/b"), "/tmp/out/a/b");
        assert_eq!(join_posix("", "../x"), "../x");
        assert_eq!(join_posix("a", "/abs"), "/abs");
    }

    #[test]
    fn test_dirname_posix() {
        assert_eq!(dirname_posix("a/b/c.txt"), "a/b");
        assert_eq!(dirname_posix("c.txt"), "");
    }

    #[test]
    fn test_scope_prefix() {
        assert_eq!(scope_prefix(""), "");
        assert_eq!(scope_prefix("tools"), "tools/");
        assert_eq!(scope_prefix("tools/python/"), "tools/python/");
    }

    #[test]
    fn test_template_path() {
        let root = Path::new("/tmp/template");
        let path = root.join("src").join("main.cc");
        assert_eq!(template_path(root, &path).unwrap(), "src/main.cc");
        assert!(template_path(root, Path::new("/tmp/other/file")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_to() {
        assert_eq!(relative_to(Path::new("/a/b/c"), Path::new("/a/b/d/e")), PathBuf::from("../d/e"));
        assert_eq!(relative_to(Path::new("/a/b"), Path::new("/a/b/x")), PathBuf::from("x"));
        assert_eq!(relative_to(Path::new("/a/b"), Path::new("/a/b")), PathBuf::from("."));
    }
}
