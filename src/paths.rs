//! Path helpers shared by discovery, resolution, and the crawler.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use crate::types::FileIdentity;

/// Suffix of the documents that are crawled and checked for orphans.
pub const DOCUMENT_SUFFIX: &str = ".md";

/// Resolve a path to its absolute, symlink-free form.
/// Returns `None` when nothing exists at that path.
pub fn canonicalize(path: &Path) -> Option<PathBuf> {
    return std::fs::canonicalize(path).ok();
}

/// Identity of the file described by `metadata`.
#[cfg(unix)]
pub fn file_identity(_path: &Path, metadata: &Metadata) -> FileIdentity {
    use std::os::unix::fs::MetadataExt as _;

    return FileIdentity::new(metadata.dev(), metadata.ino());
}

/// Identity of the file at `path`. Without inode numbers the canonical path stands in.
#[cfg(not(unix))]
pub fn file_identity(path: &Path, _metadata: &Metadata) -> FileIdentity {
    use std::hash::{DefaultHasher, Hash as _, Hasher as _};

    let canonical = canonicalize(path).unwrap_or_else(|| return path.to_path_buf());
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    return FileIdentity::new(0, hasher.finish());
}

/// Last `/`-separated segment of a link path.
pub fn final_segment(path: &str) -> &str {
    return path.rsplit_once('/').map_or(path, |(_, name)| return name);
}

/// Whether a link path or file name names a markdown document.
pub fn is_document(path: &str) -> bool {
    return path.len() > DOCUMENT_SUFFIX.len() && path.ends_with(DOCUMENT_SUFFIX);
}

/// Directory containing `path`, or `.` for a bare file name.
pub fn parent_dir(path: &Path) -> PathBuf {
    return match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
}

/// Display `path` relative to `root` when it lies underneath it.
pub fn relative_to(path: &Path, root: &Path) -> String {
    return path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_of_nested_file() {
        assert_eq!(parent_dir(Path::new("/repo/docs/file.md")), PathBuf::from("/repo/docs"));
    }

    #[test]
    fn parent_of_root_file() {
        assert_eq!(parent_dir(Path::new("/file.md")), PathBuf::from("/"));
    }

    #[test]
    fn parent_of_bare_name() {
        assert_eq!(parent_dir(Path::new("file.md")), PathBuf::from("."));
    }

    #[test]
    fn final_segment_strips_directories() {
        assert_eq!(final_segment("../docs/guide.md"), "guide.md");
        assert_eq!(final_segment("guide.md"), "guide.md");
    }

    #[test]
    fn document_detection() {
        assert!(is_document("a.md"));
        assert!(is_document("docs/guide.md"));
        assert!(!is_document(".md"));
        assert!(!is_document("photo.png"));
    }

    #[test]
    fn relative_display_under_root() {
        let root = Path::new("/repo");
        assert_eq!(relative_to(Path::new("/repo/docs/a.md"), root), "docs/a.md");
        assert_eq!(relative_to(Path::new("/elsewhere/a.md"), root), "/elsewhere/a.md");
    }

    #[test]
    fn canonicalize_missing_path() {
        assert!(canonicalize(Path::new("/definitely/not/here.md")).is_none());
    }
}
