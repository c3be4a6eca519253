//! Enumerate the markdown files under the crawl root and compute orphans.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::exclude::ExcludeMatcher;
use crate::paths;
use crate::types::FileIdentity;

/// Every markdown file found under the root, keyed by identity.
/// Hard links to the same content appear once.
#[derive(Debug, Default)]
pub struct DiscoveredFiles {
    /// Identity to path relative to the crawl root.
    files: HashMap<FileIdentity, String>,
}

impl DiscoveredFiles {
    /// Map of file name to the absolute paths of every document with that name.
    /// Used for basename fallback when a link's direct path does not exist.
    pub fn basename_index(&self, root: &Path) -> HashMap<String, Vec<PathBuf>> {
        let mut index: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for relative in self.files.values() {
            let name = paths::final_segment(relative).to_string();
            index.entry(name).or_default().push(root.join(relative));
        }
        for candidates in index.values_mut() {
            candidates.sort();
        }
        return index;
    }

    /// Whether no markdown files were found.
    pub fn is_empty(&self) -> bool {
        return self.files.is_empty();
    }

    /// Number of distinct markdown files found.
    pub fn len(&self) -> usize {
        return self.files.len();
    }

    /// Relative paths of discovered files not in `reachable`, sorted.
    pub fn orphans(&self, reachable: &HashSet<FileIdentity>) -> Vec<String> {
        let mut orphans: Vec<String> = self
            .files
            .iter()
            .filter(|(identity, _)| return !reachable.contains(*identity))
            .map(|(_, relative)| return relative.clone())
            .collect();
        orphans.sort();
        return orphans;
    }
}

impl FromIterator<(FileIdentity, String)> for DiscoveredFiles {
    /// Build from identity/relative-path pairs; the first path per identity wins.
    fn from_iter<I: IntoIterator<Item = (FileIdentity, String)>>(iter: I) -> Self {
        let mut files = HashMap::new();
        for (identity, relative) in iter {
            files.entry(identity).or_insert(relative);
        }
        return Self { files };
    }
}

/// Walk `root` and collect every markdown file that is not excluded.
///
/// Hidden directories and excluded directories are not descended into.
/// Symlinks are not followed while walking, but a symlinked markdown file
/// is recorded under the identity of its target. Unreadable entries are
/// logged and skipped.
pub fn discover(root: &Path, exclude: &ExcludeMatcher) -> DiscoveredFiles {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| return should_descend(entry, root, exclude));

    let mut found = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read directory entry");
                continue;
            },
        };
        if let Some(file) = markdown_file(&entry, root, exclude) {
            found.push(file);
        }
    }

    tracing::debug!(count = found.len(), root = %root.display(), "discovered markdown files");
    return found.into_iter().collect();
}

/// Identity and relative path of a markdown file entry, if it should be counted.
fn markdown_file(entry: &DirEntry, root: &Path, exclude: &ExcludeMatcher) -> Option<(FileIdentity, String)> {
    if entry.file_type().is_dir() {
        return None;
    }
    let name = entry.file_name().to_string_lossy();
    if !paths::is_document(&name) {
        return None;
    }

    let relative = paths::relative_to(entry.path(), root);
    if exclude.is_excluded(&relative) {
        return None;
    }

    let metadata = match std::fs::metadata(entry.path()) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::debug!(path = %entry.path().display(), error = %e, "cannot stat markdown file");
            return None;
        },
    };
    if !metadata.is_file() {
        return None;
    }

    return Some((paths::file_identity(entry.path(), &metadata), relative));
}

/// Directory filter: skip hidden and excluded directories below the root.
fn should_descend(entry: &DirEntry, root: &Path, exclude: &ExcludeMatcher) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    if entry.file_name().to_string_lossy().starts_with('.') {
        return false;
    }
    return !exclude.is_excluded_dir(&paths::relative_to(entry.path(), root));
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn relative_paths(found: &DiscoveredFiles) -> Vec<String> {
        return found.orphans(&HashSet::new());
    }

    #[test]
    fn finds_markdown_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", "");
        write(dir.path(), "docs/guide.md", "");
        write(dir.path(), "docs/photo.png", "");
        write(dir.path(), "notes.txt", "");

        let found = discover(dir.path(), &ExcludeMatcher::default());
        assert_eq!(relative_paths(&found), ["docs/guide.md", "index.md"]);
    }

    #[test]
    fn skips_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", "");
        write(dir.path(), ".git/notes.md", "");
        write(dir.path(), ".github/PULL_REQUEST_TEMPLATE.md", "");

        let found = discover(dir.path(), &ExcludeMatcher::default());
        assert_eq!(relative_paths(&found), ["index.md"]);
    }

    #[test]
    fn applies_exclusions_to_directories_and_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", "");
        write(dir.path(), "Library/vendor.md", "");
        write(dir.path(), "docs/draft-intro.md", "");
        write(dir.path(), "docs/guide.md", "");

        let exclude = ExcludeMatcher::new(&["Library", "docs/draft-*.md"]).unwrap();
        let found = discover(dir.path(), &exclude);
        assert_eq!(relative_paths(&found), ["docs/guide.md", "index.md"]);
    }

    #[cfg(unix)]
    #[test]
    fn hard_links_collapse_to_one_identity() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "same");
        fs::hard_link(dir.path().join("a.md"), dir.path().join("b.md")).unwrap();

        let found = discover(dir.path(), &ExcludeMatcher::default());
        assert_eq!(found.len(), 1);
        assert_eq!(relative_paths(&found), ["a.md"]);
    }

    #[test]
    fn basename_index_groups_same_names() {
        let root = Path::new("/r");
        let found: DiscoveredFiles = [
            (FileIdentity::new(1, 1), "a/guide.md".to_string()),
            (FileIdentity::new(1, 2), "b/guide.md".to_string()),
            (FileIdentity::new(1, 3), "index.md".to_string()),
        ]
        .into_iter()
        .collect();

        let index = found.basename_index(root);
        assert_eq!(index["guide.md"], [PathBuf::from("/r/a/guide.md"), PathBuf::from("/r/b/guide.md")]);
        assert_eq!(index["index.md"], [PathBuf::from("/r/index.md")]);
    }

    #[test]
    fn orphans_are_discovered_minus_reachable() {
        let found: DiscoveredFiles = [
            (FileIdentity::new(1, 1), "index.md".to_string()),
            (FileIdentity::new(1, 2), "z.md".to_string()),
            (FileIdentity::new(1, 3), "b.md".to_string()),
        ]
        .into_iter()
        .collect();

        let reachable = HashSet::from([FileIdentity::new(1, 1)]);
        assert_eq!(found.orphans(&reachable), ["b.md", "z.md"]);
    }
}
