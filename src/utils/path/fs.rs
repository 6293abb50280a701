//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `sanitized_path` - join a page path onto the site source without escaping it

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Join `questionable` onto `base`, never producing a path outside `base`.
///
/// The questionable path is first resolved lexically against `/`, so any
/// `..` that would climb above the root is dropped. An absolute path that
/// already lies inside `base` is kept; everything else is re-rooted under
/// `base`.
///
/// # Examples
/// ```ignore
/// sanitized_path("/site", "posts/a.md")       -> "/site/posts/a.md"
/// sanitized_path("/site", "../../etc/passwd") -> "/site/etc/passwd"
/// sanitized_path("/site", "/site/about.md")   -> "/site/about.md"
/// sanitized_path("/site", "")                 -> "/site"
/// ```
pub fn sanitized_path(base: &Path, questionable: &Path) -> PathBuf {
    if questionable.as_os_str().is_empty() || questionable == base {
        return base.to_path_buf();
    }

    let clean = clean_from_root(questionable);
    if clean == base || clean.starts_with(base) {
        return clean;
    }

    let relative = clean.strip_prefix("/").unwrap_or(&clean);
    base.join(relative)
}

/// Lexically resolve a path as if the current directory were `/`.
fn clean_from_root(path: &Path) -> PathBuf {
    let mut clean = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                clean.pop();
            }
            Component::Normal(part) => clean.push(part),
        }
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn test_sanitized_path_joins_relative() {
        let base = Path::new("/site");
        assert_eq!(
            sanitized_path(base, Path::new("posts/a.md")),
            PathBuf::from("/site/posts/a.md")
        );
        assert_eq!(
            sanitized_path(base, Path::new("./posts/../about.md")),
            PathBuf::from("/site/about.md")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_sanitized_path_clamps_traversal() {
        let base = Path::new("/site");
        assert_eq!(
            sanitized_path(base, Path::new("../../etc/passwd")),
            PathBuf::from("/site/etc/passwd")
        );
        assert_eq!(
            sanitized_path(base, Path::new("/etc/passwd")),
            PathBuf::from("/site/etc/passwd")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_sanitized_path_keeps_inside_absolute() {
        let base = Path::new("/site");
        assert_eq!(
            sanitized_path(base, Path::new("/site/about.md")),
            PathBuf::from("/site/about.md")
        );
        // A sibling sharing the prefix text is not inside the base
        assert_eq!(
            sanitized_path(base, Path::new("/site-old/a.md")),
            PathBuf::from("/site/site-old/a.md")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_sanitized_path_base_itself() {
        let base = Path::new("/site");
        assert_eq!(sanitized_path(base, Path::new("")), PathBuf::from("/site"));
        assert_eq!(sanitized_path(base, base), PathBuf::from("/site"));
    }
}
