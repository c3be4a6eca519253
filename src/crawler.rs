//! Breadth-first reachability crawl over the local link graph.
//!
//! Starting from the entry documents, each dequeued file is read, its
//! identity recorded, and every extracted link resolved. Links that land on
//! documents are enqueued once per canonical path; problems along the way
//! are collected as [`LinkIssue`]s in the order they are found.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use crate::anchors;
use crate::discover::DiscoveredFiles;
use crate::paths;
use crate::resolver;
use crate::scanner;
use crate::types::{FileIdentity, IssueKind, LinkIssue, RawLink};

/// Initial size of the shared read buffer.
const READ_BUFFER_CAPACITY: usize = 262_144;

/// Result of one crawl.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Link problems in discovery order.
    pub issues: Vec<LinkIssue>,
    /// Identities of every document reached from the entry points.
    pub reachable: HashSet<FileIdentity>,
}

impl CrawlOutcome {
    /// Links whose basename fallback matched several documents.
    pub fn ambiguous(&self) -> impl Iterator<Item = &LinkIssue> {
        return self
            .issues
            .iter()
            .filter(|issue| return matches!(issue.kind, IssueKind::Ambiguous(_)));
    }

    /// Links whose target could not be found.
    pub fn broken(&self) -> impl Iterator<Item = &LinkIssue> {
        return self
            .issues
            .iter()
            .filter(|issue| return matches!(issue.kind, IssueKind::Broken));
    }

    /// Links whose fragment names no heading in the target.
    pub fn broken_anchors(&self) -> impl Iterator<Item = &LinkIssue> {
        return self
            .issues
            .iter()
            .filter(|issue| return matches!(issue.kind, IssueKind::BrokenAnchor(_)));
    }
}

/// State for a single crawl. Nothing here outlives [`Crawler::run`].
#[derive(Debug)]
pub struct Crawler<'a> {
    /// Anchors per canonical target path, read at most once each.
    anchor_cache: HashMap<PathBuf, HashSet<String>>,
    /// File name to absolute paths of discovered documents.
    basenames: HashMap<String, Vec<PathBuf>>,
    /// Reused for every file read; contents are valid until the next read.
    buffer: Vec<u8>,
    /// Whether fragments are validated.
    check_anchors: bool,
    /// Issues found so far.
    issues: Vec<LinkIssue>,
    /// Paths waiting to be expanded.
    queue: VecDeque<PathBuf>,
    /// Every path ever enqueued.
    queued: HashSet<PathBuf>,
    /// Identities already expanded.
    reachable: HashSet<FileIdentity>,
    /// Canonical crawl root; links resolving outside it are ignored.
    root: &'a Path,
}

impl<'a> Crawler<'a> {
    /// Anchors of `target`, reading and caching them on first use.
    /// Returns `None` if the target cannot be read.
    fn anchors_for(&mut self, target: &Path) -> Option<&HashSet<String>> {
        if !self.anchor_cache.contains_key(target) {
            if let Err(e) = self.read_into_buffer(target) {
                tracing::debug!(path = %target.display(), error = %e, "cannot read headings");
                return None;
            }
            let anchors = anchors::extract_anchors(&self.buffer);
            self.anchor_cache.insert(target.to_path_buf(), anchors);
        }
        return self.anchor_cache.get(target);
    }

    /// Report a broken anchor when `fragment` is not a heading of `target`.
    fn check_fragment(&mut self, source: &Path, link: &RawLink, target: &Path, fragment: &str) {
        let Some(anchors) = self.anchors_for(target) else {
            return;
        };
        if !anchors::fragment_matches(anchors, fragment) {
            self.record(source, link, IssueKind::BrokenAnchor(fragment.to_string()));
        }
    }

    /// Enable or disable fragment validation (on by default).
    #[must_use]
    pub const fn check_anchors(mut self, enabled: bool) -> Self {
        self.check_anchors = enabled;
        return self;
    }

    /// Resolve, validate, and possibly enqueue one link found in `source`.
    fn follow_link(&mut self, source: &Path, link: &RawLink) {
        let Some(resolved) = resolver::resolve_link(&link.path, source, self.root) else {
            tracing::debug!(link = %link.path, source = %source.display(), "link leaves crawl root");
            return;
        };
        let Some(target) = self.locate(source, link, &resolved) else {
            return;
        };
        if !paths::is_document(&link.path) {
            return;
        }

        if self.check_anchors
            && let Some(fragment) = &link.fragment
        {
            self.check_fragment(source, link, &target, fragment);
        }

        if self.queued.insert(target.clone()) {
            self.queue.push_back(target);
        }
    }

    /// Find the canonical target of a link: directly, or by basename fallback
    /// for document links. Records a `Broken` or `Ambiguous` issue on failure.
    fn locate(&mut self, source: &Path, link: &RawLink, resolved: &Path) -> Option<PathBuf> {
        if let Some(canonical) = paths::canonicalize(resolved) {
            return Some(canonical);
        }
        if !paths::is_document(&link.path) {
            self.record(source, link, IssueKind::Broken);
            return None;
        }

        let candidates = self
            .basenames
            .get(paths::final_segment(&link.path))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let outcome = match candidates {
            [] => Err(IssueKind::Broken),
            [only] => paths::canonicalize(only).ok_or(IssueKind::Broken),
            many => Err(IssueKind::Ambiguous(many.len())),
        };

        return match outcome {
            Ok(canonical) => {
                tracing::debug!(link = %link.path, target = %canonical.display(), "resolved by basename");
                Some(canonical)
            },
            Err(kind) => {
                self.record(source, link, kind);
                None
            },
        };
    }

    /// Set up a crawl under `root` (canonical) over the discovered document set.
    /// Basename fallback only ever picks files from `discovered`.
    pub fn new(root: &'a Path, discovered: &DiscoveredFiles) -> Self {
        return Self {
            anchor_cache: HashMap::new(),
            basenames: discovered.basename_index(root),
            buffer: Vec::with_capacity(READ_BUFFER_CAPACITY),
            check_anchors: true,
            issues: Vec::new(),
            queue: VecDeque::new(),
            queued: HashSet::new(),
            reachable: HashSet::new(),
            root,
        };
    }

    /// Read `path` into the shared buffer, growing it as needed, and return
    /// the file's identity.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened, stat'ed, or read.
    fn read_into_buffer(&mut self, path: &Path) -> std::io::Result<FileIdentity> {
        let mut file = File::open(path)?;
        let metadata = file.metadata()?;
        let identity = paths::file_identity(path, &metadata);

        self.buffer.clear();
        self.buffer.reserve(usize::try_from(metadata.len()).unwrap_or(0));
        file.read_to_end(&mut self.buffer)?;

        return Ok(identity);
    }

    /// Record a link issue in discovery order.
    fn record(&mut self, source: &Path, link: &RawLink, kind: IssueKind) {
        tracing::debug!(link = %link.path, source = %source.display(), kind = ?kind, "link issue");
        self.issues.push(LinkIssue {
            kind,
            link: link.path.clone(),
            source: source.to_path_buf(),
        });
    }

    /// Crawl from the canonical `entries` until the queue is exhausted.
    pub fn run(mut self, entries: &[PathBuf]) -> CrawlOutcome {
        for entry in entries {
            if self.queued.insert(entry.clone()) {
                self.queue.push_back(entry.clone());
            }
        }

        while let Some(path) = self.queue.pop_front() {
            self.visit(&path);
        }

        tracing::info!(
            reachable = self.reachable.len(),
            issues = self.issues.len(),
            "crawl finished"
        );
        return CrawlOutcome {
            issues: self.issues,
            reachable: self.reachable,
        };
    }

    /// Expand one queued document: record its identity and follow its links.
    /// Content already expanded under another path is skipped.
    fn visit(&mut self, path: &Path) {
        let identity = match self.read_into_buffer(path) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read file");
                return;
            },
        };
        if !self.reachable.insert(identity) {
            return;
        }

        let links = scanner::extract_links(&self.buffer);
        tracing::debug!(path = %path.display(), links = links.len(), "expanding");
        for link in &links {
            self.follow_link(path, link);
        }
    }
}
