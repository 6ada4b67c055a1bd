//! Path normalization and key/path mapping
//!
//! User-supplied prefixes, patterns and targets are cleaned of one leading
//! and/or trailing `/` so that joining them with an explicit separator never
//! produces doubled or missing separators. The mapping helpers derive the
//! local path for a downloaded key and the remote key for an uploaded file.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Remove one leading `/`
pub fn clean_left(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Remove one trailing `/`
pub fn clean_right(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Remove one leading and one trailing `/`
pub fn clean(path: &str) -> &str {
    clean_right(clean_left(path))
}

/// Join two normalized segments with `/`, skipping the separator when the
/// base is empty.
pub fn join(base: &str, child: &str) -> String {
    if base.is_empty() {
        child.to_string()
    } else {
        format!("{base}/{child}")
    }
}

/// Strip `prefix/` from a listed key.
///
/// Returns `None` for keys that do not live below the prefix, including the
/// key equal to the prefix itself and keys that merely share its leading
/// characters (`reports/history-old/x` under `reports/history`).
pub fn relative_key<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(key);
    }
    key.strip_prefix(prefix)?.strip_prefix('/')
}

/// Compute the local destination of a key relative to its source prefix.
///
/// An empty target resolves relative to the working directory. Relative keys
/// with `..` segments or empty segments are rejected so a listing can never
/// write outside the target directory.
pub fn local_path_for_key(target: &str, relative: &str) -> Result<PathBuf> {
    let mut path = PathBuf::from(target);
    for segment in relative.split('/') {
        match segment {
            "" | "." | ".." => {
                return Err(Error::InvalidPath(format!(
                    "Refusing to map key segment '{segment}' in '{relative}'"
                )));
            }
            _ => path.push(segment),
        }
    }
    Ok(path)
}

/// Compute the path of a local file relative to the upload prefix, as a
/// `/`-delimited string.
///
/// Both sides are compared component-wise with `.` components dropped, since
/// glob reports `./results/a.xml` as `results/a.xml`. Files outside the prefix
/// keep their full path, mirroring a plain string replacement that found
/// nothing to replace.
pub fn relative_file(file: &Path, prefix: &str) -> String {
    let file: Vec<Component> = file
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();
    let prefix: Vec<Component> = Path::new(prefix)
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();

    let relative = file.strip_prefix(prefix.as_slice()).unwrap_or(&file[..]);

    relative
        .iter()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Compute the remote key for an uploaded file.
pub fn remote_key(target: &str, relative: &str) -> String {
    join(target, relative)
}

/// Build the glob pattern for an upload from its local prefix and pattern.
pub fn full_pattern(prefix: &str, pattern: &str) -> String {
    join(prefix, pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        assert_eq!(clean("/a/b/"), "a/b");
        assert_eq!(clean("a/b"), "a/b");
        assert_eq!(clean(""), "");
        assert_eq!(clean("/"), "");
    }

    #[test]
    fn test_clean_removes_only_one_separator() {
        assert_eq!(clean_left("//a"), "/a");
        assert_eq!(clean_right("a//"), "a/");
    }

    #[test]
    fn test_clean_is_idempotent() {
        for input in ["", "a", "/a", "a/", "/a/b/", "reports/history", "x/y/z/"] {
            let once = clean(input);
            assert_eq!(clean(once), once, "input: {input:?}");
            assert_eq!(clean_left(clean_left(input)), clean_left(input));
            assert_eq!(clean_right(clean_right(input)), clean_right(input));
        }
    }

    #[test]
    fn test_relative_key() {
        assert_eq!(
            relative_key("reports/history/a.json", "reports/history"),
            Some("a.json")
        );
        assert_eq!(
            relative_key("reports/history/sub/b.json", "reports/history"),
            Some("sub/b.json")
        );
        assert_eq!(relative_key("a.json", ""), Some("a.json"));
        assert_eq!(relative_key("reports/history", "reports/history"), None);
        assert_eq!(
            relative_key("reports/history-old/a.json", "reports/history"),
            None
        );
    }

    #[test]
    fn test_local_path_for_key() {
        assert_eq!(
            local_path_for_key("out", "sub/b.json").unwrap(),
            Path::new("out").join("sub").join("b.json")
        );
        assert_eq!(
            local_path_for_key("", "a.json").unwrap(),
            PathBuf::from("a.json")
        );
    }

    #[test]
    fn test_local_path_rejects_traversal() {
        assert!(local_path_for_key("out", "../etc/passwd").is_err());
        assert!(local_path_for_key("out", "a//b").is_err());
        assert!(local_path_for_key("out", "dir/").is_err());
    }

    #[test]
    fn test_relative_file() {
        assert_eq!(relative_file(Path::new("results/a.xml"), "results"), "a.xml");
        assert_eq!(
            relative_file(Path::new("results/sub/b.xml"), "results"),
            "sub/b.xml"
        );
        assert_eq!(relative_file(Path::new("other/a.xml"), "results"), "other/a.xml");
        assert_eq!(relative_file(Path::new("a.xml"), ""), "a.xml");
    }

    #[test]
    fn test_relative_file_ignores_current_dir_prefix() {
        // glob yields `results/a.xml` for the pattern `./results/**/*.xml`
        assert_eq!(relative_file(Path::new("results/a.xml"), "./results"), "a.xml");
        assert_eq!(
            relative_file(Path::new("results/sub/b.xml"), "./results"),
            "sub/b.xml"
        );
        assert_eq!(relative_file(Path::new("./results/a.xml"), "results"), "a.xml");
        assert_eq!(relative_file(Path::new("a.xml"), "."), "a.xml");
        assert_eq!(
            relative_file(Path::new("/ci/results/a.xml"), "/ci/./results"),
            "a.xml"
        );
    }

    #[test]
    fn test_remote_key_without_target_has_no_leading_separator() {
        assert_eq!(remote_key("", "a.xml"), "a.xml");
        assert_eq!(remote_key("remote", "sub/b.xml"), "remote/sub/b.xml");
    }

    #[test]
    fn test_full_pattern() {
        assert_eq!(full_pattern("results", "**/*.xml"), "results/**/*.xml");
        assert_eq!(full_pattern("", "*.xml"), "*.xml");
    }
}
