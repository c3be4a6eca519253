//! Turn link targets into normalized absolute paths under the crawl root.

use std::path::{Component, Path, PathBuf};

use crate::paths;

/// Resolve `link` as written in `source_file` to an absolute, normalized path.
///
/// A leading `/` makes the link root-relative; anything else is relative to
/// the directory containing `source_file`. `.` segments are dropped and `..`
/// pops the previous segment (never above `/`). Returns `None` when the
/// result falls outside `root`: such links are out of scope, not errors.
///
/// This only normalizes text; it never touches the filesystem.
pub fn resolve_link(link: &str, source_file: &Path, root: &Path) -> Option<PathBuf> {
    let combined = if link.starts_with('/') {
        root.join(link.trim_start_matches('/'))
    } else {
        paths::parent_dir(source_file).join(link)
    };

    let resolved = normalize(&combined);
    if resolved.starts_with(root) {
        return Some(resolved);
    }
    return None;
}

/// Collapse `.` and `..` components into a path rooted at `/`.
/// `..` with nothing left to pop is dropped.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::from("/");
    for component in path.components() {
        push_normalized_component(&mut normalized, component);
    }
    return normalized;
}

/// Apply a single path component during normalization.
fn push_normalized_component(normalized: &mut PathBuf, component: Component<'_>) {
    match component {
        Component::CurDir | Component::Prefix(_) | Component::RootDir => {},
        Component::Normal(segment) => normalized.push(segment),
        Component::ParentDir => {
            normalized.pop();
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(link: &str, from: &str, root: &str) -> Option<PathBuf> {
        return resolve_link(link, Path::new(from), Path::new(root));
    }

    #[test]
    fn sibling_link() {
        assert_eq!(resolve("guide.md", "/repo/docs/index.md", "/repo"), Some(PathBuf::from("/repo/docs/guide.md")));
    }

    #[test]
    fn parent_traversal() {
        assert_eq!(
            resolve("../dev/guide.md", "/repo/docs/system/langpack.md", "/repo"),
            Some(PathBuf::from("/repo/docs/dev/guide.md"))
        );
    }

    #[test]
    fn dot_segment() {
        assert_eq!(resolve("./local.md", "/repo/docs/index.md", "/repo"), Some(PathBuf::from("/repo/docs/local.md")));
    }

    #[test]
    fn deep_path() {
        assert_eq!(
            resolve("sub/deep/file.md", "/repo/docs/index.md", "/repo"),
            Some(PathBuf::from("/repo/docs/sub/deep/file.md"))
        );
    }

    #[test]
    fn root_relative_link() {
        assert_eq!(resolve("/docs/file.md", "/repo/other/index.md", "/repo"), Some(PathBuf::from("/repo/docs/file.md")));
    }

    #[test]
    fn redundant_dots_are_normalized() {
        assert_eq!(resolve("./a/../b/./c.md", "/r/docs/index.md", "/r"), Some(PathBuf::from("/r/docs/b/c.md")));
    }

    #[test]
    fn doubled_separators_collapse() {
        assert_eq!(resolve("a//b.md", "/r/index.md", "/r"), Some(PathBuf::from("/r/a/b.md")));
    }

    #[test]
    fn doubled_leading_separator_stays_root_relative() {
        assert_eq!(resolve("//docs/a.md", "/r/index.md", "/r"), Some(PathBuf::from("/r/docs/a.md")));
    }

    #[test]
    fn escaping_root_fails() {
        assert_eq!(resolve("../../../etc/passwd.md", "/repo/docs/index.md", "/repo"), None);
        assert_eq!(resolve("../../../x.md", "/repo/a/b/index.md", "/repo"), None);
    }

    #[test]
    fn sibling_with_root_as_prefix_is_outside() {
        assert_eq!(resolve("../repo-other/x.md", "/repo/index.md", "/repo"), None);
    }

    #[test]
    fn traversal_past_filesystem_root_stays_at_slash() {
        assert_eq!(resolve("../../../../x.md", "/r/index.md", "/"), Some(PathBuf::from("/x.md")));
    }

    #[test]
    fn link_to_root_itself_is_allowed() {
        assert_eq!(resolve("..", "/r/docs/index.md", "/r"), Some(PathBuf::from("/r")));
    }
}
