//! Exclusion patterns applied to paths relative to the crawl root.
//!
//! Four pattern forms are supported:
//!
//! - `dir/` is a literal directory prefix.
//! - `dir/*/` excludes everything below a directory whose path matches the
//!   glob at that depth (the directory itself, never files at that depth).
//! - `docs/draft-*.md` matches the whole relative path; wildcards never
//!   cross a `/`.
//! - `Library` matches the path itself or anything below it.
//!
//! `**` and malformed globs are rejected when the matcher is built.

use globset::{GlobBuilder, GlobMatcher};

use crate::error::Error;

/// Characters that turn a pattern into a glob.
const WILDCARDS: [char; 3] = ['*', '?', '['];

/// Compiled set of exclusion patterns.
#[derive(Debug, Default)]
pub struct ExcludeMatcher {
    /// Rules in the order the patterns were given.
    rules: Vec<Rule>,
}

/// One compiled exclusion pattern.
#[derive(Debug)]
enum Rule {
    /// `prefix/*/`: glob over the first `depth` segments, which must be a directory.
    DirGlob {
        /// Number of leading path segments the glob covers.
        depth: usize,
        /// Matcher for those segments.
        matcher: GlobMatcher,
    },
    /// `prefix/`: literal directory prefix, stored with its trailing slash.
    DirPrefix(String),
    /// Glob matched against the whole relative path.
    Glob(GlobMatcher),
    /// Literal path or directory.
    Literal(String),
}

impl ExcludeMatcher {
    /// Whether no patterns were configured.
    pub const fn is_empty(&self) -> bool {
        return self.rules.is_empty();
    }

    /// Whether a file path relative to the crawl root is excluded.
    pub fn is_excluded(&self, relative: &str) -> bool {
        return self.rules.iter().any(|rule| return rule.matches(relative, false));
    }

    /// Whether a directory (relative to the root) is excluded. Excluded
    /// directories are not descended into.
    pub fn is_excluded_dir(&self, relative: &str) -> bool {
        return self.rules.iter().any(|rule| return rule.matches(relative, true));
    }

    /// Compile exclusion patterns. Blank patterns are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::GlobstarUnsupported` for patterns containing `**`,
    /// or `Error::InvalidPattern` when a glob does not compile (for example
    /// an unclosed `[`).
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, Error> {
        let mut rules = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            rules.push(Rule::compile(pattern)?);
        }
        return Ok(Self { rules });
    }
}

impl Rule {
    /// Turn one pattern string into a rule.
    ///
    /// # Errors
    ///
    /// Returns `Error::GlobstarUnsupported` or `Error::InvalidPattern`.
    fn compile(pattern: &str) -> Result<Self, Error> {
        if pattern.contains("**") {
            return Err(Error::GlobstarUnsupported {
                pattern: pattern.to_string(),
            });
        }

        let has_wildcard = pattern.contains(WILDCARDS);
        return match (pattern.strip_suffix('/'), has_wildcard) {
            (Some(_), false) => Ok(Self::DirPrefix(pattern.to_string())),
            (Some(dir), true) => Ok(Self::DirGlob {
                depth: dir.split('/').count(),
                matcher: build_glob(pattern, dir)?,
            }),
            (None, true) => Ok(Self::Glob(build_glob(pattern, pattern)?)),
            (None, false) => Ok(Self::Literal(pattern.to_string())),
        };
    }

    /// Test a relative path against this rule.
    fn matches(&self, relative: &str, is_dir: bool) -> bool {
        return match self {
            Self::DirGlob { depth, matcher } => {
                match leading_segments(relative, *depth) {
                    Some((prefix, has_more)) => (has_more || is_dir) && matcher.is_match(prefix),
                    None => false,
                }
            },
            Self::DirPrefix(prefix) => {
                relative.starts_with(prefix.as_str())
                    || (is_dir && prefix.strip_suffix('/') == Some(relative))
            },
            Self::Glob(matcher) => matcher.is_match(relative),
            Self::Literal(literal) => {
                relative == literal
                    || relative
                        .strip_prefix(literal.as_str())
                        .is_some_and(|rest| return rest.starts_with('/'))
            },
        };
    }
}

/// Compile `glob` with single-segment wildcard semantics.
///
/// # Errors
///
/// Returns `Error::InvalidPattern` carrying the user's original `pattern`.
fn build_glob(pattern: &str, glob: &str) -> Result<GlobMatcher, Error> {
    return GlobBuilder::new(glob)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map(|compiled| return compiled.compile_matcher())
        .map_err(|e| {
            return Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.kind().to_string(),
            };
        });
}

/// The first `depth` segments of `path`, and whether more segments follow.
/// Returns `None` when the path is shallower than `depth`.
fn leading_segments(path: &str, depth: usize) -> Option<(&str, bool)> {
    let last = depth.checked_sub(1)?;
    if let Some((idx, _)) = path.match_indices('/').nth(last) {
        return Some((path.get(..idx)?, true));
    }
    if path.split('/').count() == depth {
        return Some((path, false));
    }
    return None;
}
