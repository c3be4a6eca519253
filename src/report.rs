//! Render crawl results and configuration errors for the terminal.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::crawler::CrawlOutcome;
use crate::discover::DiscoveredFiles;
use crate::error::Error;
use crate::paths;
use crate::types::{IssueKind, LinkIssue};

/// ANSI bold, used for diagnostic headings.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// JSON shape of an ambiguous link.
#[derive(serde::Serialize)]
struct AmbiguousEntry<'a> {
    /// Number of documents sharing the link's file name.
    candidates: usize,
    /// Link as written.
    link: &'a str,
    /// Source document, relative to the root.
    source: String,
}

/// JSON shape of a broken anchor.
#[derive(serde::Serialize)]
struct BrokenAnchorEntry<'a> {
    /// Fragment that names no heading.
    fragment: &'a str,
    /// Link as written, without the fragment.
    link: &'a str,
    /// Source document, relative to the root.
    source: String,
}

/// JSON shape of a broken link.
#[derive(serde::Serialize)]
struct BrokenEntry<'a> {
    /// Link as written.
    link: &'a str,
    /// Source document, relative to the root.
    source: String,
}

/// JSON document printed by `--format json`.
#[derive(serde::Serialize)]
struct JsonReport<'a> {
    /// Links resolved by basename to several documents.
    ambiguous: Vec<AmbiguousEntry<'a>>,
    /// Links with no target.
    broken: Vec<BrokenEntry<'a>>,
    /// Links whose fragment names no heading.
    broken_anchors: Vec<BrokenAnchorEntry<'a>>,
    /// Unreachable documents, sorted.
    orphans: &'a [String],
    /// Discovered documents reached from the entry points.
    reachable: usize,
    /// Crawl root.
    root: String,
    /// Discovered documents.
    total: usize,
}

/// Everything one run found, ready to print.
#[derive(Debug)]
pub struct Report {
    /// File names of the entry points, in command-line order.
    entry_names: Vec<String>,
    /// Discovered documents not reached, sorted by relative path.
    orphans: Vec<String>,
    /// Reachability and link issues from the crawl.
    outcome: CrawlOutcome,
    /// Canonical crawl root.
    root: PathBuf,
    /// Number of discovered documents.
    total: usize,
}

impl Report {
    /// Whether there is nothing to report: no orphans and no link issues.
    pub fn is_clean(&self) -> bool {
        return self.orphans.is_empty() && self.outcome.issues.is_empty();
    }

    /// Combine the discovered set and a finished crawl.
    pub fn new(root: &Path, entries: &[PathBuf], discovered: &DiscoveredFiles, outcome: CrawlOutcome) -> Self {
        let entry_names = entries
            .iter()
            .map(|entry| {
                return entry.file_name().map_or_else(
                    || return entry.display().to_string(),
                    |name| return name.to_string_lossy().into_owned(),
                );
            })
            .collect();
        return Self {
            entry_names,
            orphans: discovered.orphans(&outcome.reachable),
            outcome,
            root: root.to_path_buf(),
            total: discovered.len(),
        };
    }

    /// Discovered documents that were reached.
    fn reachable(&self) -> usize {
        return self.total.saturating_sub(self.orphans.len());
    }

    /// Source of an issue, relative to the crawl root.
    fn relative_source(&self, issue: &LinkIssue) -> String {
        return paths::relative_to(&issue.source, &self.root);
    }

    /// Pretty-printed JSON report.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    pub fn render_json(&self) -> Result<String, Error> {
        let mut report = JsonReport {
            ambiguous: Vec::new(),
            broken: Vec::new(),
            broken_anchors: Vec::new(),
            orphans: &self.orphans,
            reachable: self.reachable(),
            root: self.root.display().to_string(),
            total: self.total,
        };

        for issue in &self.outcome.issues {
            let source = self.relative_source(issue);
            let link = issue.link.as_str();
            match &issue.kind {
                IssueKind::Ambiguous(candidates) => report.ambiguous.push(AmbiguousEntry {
                    candidates: *candidates,
                    link,
                    source,
                }),
                IssueKind::Broken => report.broken.push(BrokenEntry { link, source }),
                IssueKind::BrokenAnchor(fragment) => report.broken_anchors.push(BrokenAnchorEntry {
                    fragment,
                    link,
                    source,
                }),
            }
        }

        return Ok(serde_json::to_string_pretty(&report)?);
    }

    /// Human-readable report. Sections appear only when non-empty. With
    /// `verbose`, a clean run prints a one-line confirmation; otherwise a
    /// clean run prints nothing.
    pub fn render_text(&self, verbose: bool) -> String {
        let names = self.entry_names.join(", ");
        let mut out = String::new();

        if self.is_clean() {
            if verbose {
                let _ = writeln!(out, "All {} markdown files are reachable from {names}", self.total);
            }
            return out;
        }

        if !self.orphans.is_empty() {
            let _ = writeln!(
                out,
                "{} orphan markdown files (not reachable from {names}):",
                self.orphans.len()
            );
            for orphan in &self.orphans {
                let _ = writeln!(out, "  {orphan}");
            }
        }

        self.render_section(&mut out, "broken links", self.outcome.broken());
        self.render_section(&mut out, "ambiguous links", self.outcome.ambiguous());
        self.render_section(&mut out, "broken anchors", self.outcome.broken_anchors());

        return out;
    }

    /// Append one issue section, separated from any previous one by a blank line.
    fn render_section<'a>(&self, out: &mut String, title: &str, issues: impl Iterator<Item = &'a LinkIssue>) {
        let lines: Vec<String> = issues
            .map(|issue| {
                let source = self.relative_source(issue);
                return match &issue.kind {
                    IssueKind::Ambiguous(candidates) => {
                        format!("  {} (in {source}, {candidates} candidates)", issue.link)
                    },
                    IssueKind::Broken => format!("  {} (in {source})", issue.link),
                    IssueKind::BrokenAnchor(fragment) => format!("  {}#{fragment} (in {source})", issue.link),
                };
            })
            .collect();
        if lines.is_empty() {
            return;
        }

        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{} {title}:", lines.len());
        for line in &lines {
            let _ = writeln!(out, "{line}");
        }
    }
}

/// Render an error as markdown with bold headings and print it to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a markdown diagnostic: what happened and how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => format!(
            "\
# Error: Config Not Found

`{}` does not exist.

## Fix

Check the `--config` path, or drop the flag to use `.md-orphan.toml` in the crawl root.
",
            path.display()
        ),
        Error::EntryNotFound { path } => format!(
            "\
# Error: Entry Point Not Found

`{}` does not exist.

## Fix

Pass markdown files that exist, for example:

    md-orphan README.md
",
            path.display()
        ),
        Error::GlobstarUnsupported { pattern } => format!(
            "\
# Error: Unsupported Exclude Pattern

`{pattern}` uses `**`, which is not supported.

## Fix

Exclude the directory itself instead; everything below it is skipped:

    --exclude 'vendor/'
"
        ),
        Error::InvalidPattern { pattern, reason } => format!(
            "\
# Error: Invalid Exclude Pattern

`{pattern}`: {reason}

## Fix

Check brackets and escapes. Wildcards `*`, `?` and `[...]` match within one path segment.
"
        ),
        Error::Io(err) => format!(
            "\
# Error: I/O

{err}
"
        ),
        Error::Json(err) => format!(
            "\
# Error: JSON Output

{err}
"
        ),
        Error::NoEntryPoints => "\
# Error: No Entry Points

At least one markdown entry point is required.

## Fix

    md-orphan README.md docs/index.md
"
        .to_string(),
        Error::TomlDe(err) => format!(
            "\
# Error: Invalid Config

{err}

## Fix

`.md-orphan.toml` accepts `exclude = [\"pattern\", ...]` and `anchors = true|false`.
"
        ),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileIdentity;

    fn issue(kind: IssueKind, link: &str, source: &str) -> LinkIssue {
        return LinkIssue {
            kind,
            link: link.to_string(),
            source: PathBuf::from("/r").join(source),
        };
    }

    fn report(reached: &[u64], issues: Vec<LinkIssue>) -> Report {
        let discovered: DiscoveredFiles = [
            (FileIdentity::new(1, 1), "index.md".to_string()),
            (FileIdentity::new(1, 2), "docs/guide.md".to_string()),
            (FileIdentity::new(1, 3), "notes.md".to_string()),
        ]
        .into_iter()
        .collect();
        let outcome = CrawlOutcome {
            issues,
            reachable: reached.iter().map(|&inode| return FileIdentity::new(1, inode)).collect(),
        };
        return Report::new(
            Path::new("/r"),
            &[PathBuf::from("/r/index.md"), PathBuf::from("/r/docs/guide.md")],
            &discovered,
            outcome,
        );
    }

    #[test]
    fn clean_run_is_silent_unless_verbose() {
        let clean = report(&[1, 2, 3], Vec::new());
        assert!(clean.is_clean());
        assert_eq!(clean.render_text(false), "");
        assert_eq!(
            clean.render_text(true),
            "All 3 markdown files are reachable from index.md, guide.md\n"
        );
    }

    #[test]
    fn orphans_are_listed_under_entry_names() {
        let text = report(&[1], Vec::new()).render_text(true);
        assert_eq!(
            text,
            "2 orphan markdown files (not reachable from index.md, guide.md):\n  docs/guide.md\n  notes.md\n"
        );
    }

    #[test]
    fn issue_sections_follow_orphans() {
        let issues = vec![
            issue(IssueKind::BrokenAnchor("setup".to_string()), "guide.md", "index.md"),
            issue(IssueKind::Broken, "missing.md", "docs/guide.md"),
            issue(IssueKind::Ambiguous(2), "faq.md", "index.md"),
        ];
        let text = report(&[1, 2], issues).render_text(false);
        assert_eq!(
            text,
            "1 orphan markdown files (not reachable from index.md, guide.md):\n  notes.md\n\
             \n1 broken links:\n  missing.md (in docs/guide.md)\n\
             \n1 ambiguous links:\n  faq.md (in index.md, 2 candidates)\n\
             \n1 broken anchors:\n  guide.md#setup (in index.md)\n"
        );
    }

    #[test]
    fn issues_without_orphans_start_at_the_top() {
        let text = report(&[1, 2, 3], vec![issue(IssueKind::Broken, "gone.md", "index.md")]).render_text(false);
        assert_eq!(text, "1 broken links:\n  gone.md (in index.md)\n");
    }

    #[test]
    fn json_groups_issues_by_kind() {
        let issues = vec![
            issue(IssueKind::Broken, "missing.md", "index.md"),
            issue(IssueKind::Ambiguous(3), "faq.md", "docs/guide.md"),
            issue(IssueKind::BrokenAnchor("x".to_string()), "notes.md", "index.md"),
        ];
        let json = report(&[1, 2], issues).render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["root"], "/r");
        assert_eq!(value["total"], 3);
        assert_eq!(value["reachable"], 2);
        assert_eq!(value["orphans"], serde_json::json!(["notes.md"]));
        assert_eq!(value["broken"], serde_json::json!([{"link": "missing.md", "source": "index.md"}]));
        assert_eq!(
            value["ambiguous"],
            serde_json::json!([{"link": "faq.md", "source": "docs/guide.md", "candidates": 3}])
        );
        assert_eq!(
            value["broken_anchors"],
            serde_json::json!([{"link": "notes.md", "source": "index.md", "fragment": "x"}])
        );
    }

    #[test]
    fn errors_render_as_markdown_blocks() {
        let md = render_error(&Error::GlobstarUnsupported {
            pattern: "docs/**".to_string(),
        });
        assert!(md.starts_with("# Error: Unsupported Exclude Pattern"));
        assert!(md.contains("`docs/**`"));
        assert!(md.contains("## Fix"));

        let md = render_error(&Error::EntryNotFound {
            path: PathBuf::from("nope.md"),
        });
        assert!(md.contains("`nope.md` does not exist."));
    }
}
