//! Core domain types for md-orphan: file identities, links, and link issues.

use std::path::PathBuf;

/// Platform identity of file content (device + inode on unix).
/// Two paths with the same identity are the same node in the reachability graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileIdentity {
    /// Device the file lives on.
    device: u64,
    /// Inode number within the device.
    inode: u64,
}

impl FileIdentity {
    /// Build an identity from a device and inode pair.
    pub const fn new(device: u64, inode: u64) -> Self {
        return Self { device, inode };
    }
}

/// Why a link could not be followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Basename fallback matched more than one document.
    Ambiguous(usize),
    /// Target could not be found directly or via basename fallback.
    Broken,
    /// Target exists but has no heading with this anchor.
    BrokenAnchor(String),
}

/// A link problem found while crawling. Kept in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkIssue {
    /// Classification of the problem.
    pub kind: IssueKind,
    /// Link path as written in the source document (fragment excluded).
    pub link: String,
    /// Absolute path of the document containing the link.
    pub source: PathBuf,
}

/// A local link extracted from document bytes. The path never includes the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    /// Heading fragment after the first `#`, if any.
    pub fragment: Option<String>,
    /// Target path as written (wiki names get the default extension appended).
    pub path: String,
}

#[cfg(test)]
impl RawLink {
    /// Link without a fragment.
    pub fn new(path: impl Into<String>) -> Self {
        return Self {
            fragment: None,
            path: path.into(),
        };
    }

    /// Link pointing at a heading fragment.
    pub fn with_fragment(path: impl Into<String>, fragment: impl Into<String>) -> Self {
        return Self {
            fragment: Some(fragment.into()),
            path: path.into(),
        };
    }
}
