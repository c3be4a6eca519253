//! Byte-level extraction of local document links from markdown.
//!
//! Two syntaxes are recognized: standard `[text](target#fragment)` links and
//! wiki-style `[[name#fragment|alias]]` links. Neither may span a line break.
//! The scan walks the raw bytes once; the only delimiters that matter are
//! `[`, `]`, `(`, `)`, `#`, `|` and line breaks.

use crate::paths::DOCUMENT_SUFFIX;
use crate::types::RawLink;

/// Shortest local path worth following (`x.md`).
const MIN_LOCAL_PATH_LEN: usize = 4;

/// Shortest URI scheme recognized (`ftp:`); a single letter is a drive, not a scheme.
const MIN_SCHEME_LEN: usize = 2;

/// Scan document bytes and return local links in occurrence order.
pub fn extract_links(content: &[u8]) -> Vec<RawLink> {
    let mut links = Vec::new();
    let mut pos = 0_usize;

    while let (Some(&first), Some(&second)) = (content.get(pos), content.get(pos.saturating_add(1))) {
        pos = match (first, second) {
            (b'[', b'[') => scan_wiki_link(content, pos, &mut links),
            (b']', b'(') => scan_standard_link(content, pos, &mut links),
            _ => pos.saturating_add(1),
        };
    }

    return links;
}

/// Lossy UTF-8 decode of a byte range, dropping backslashes that escape
/// a parenthesis or a `#`.
fn decode_target(bytes: &[u8]) -> String {
    if !bytes.contains(&b'\\') {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    let mut unescaped = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();
    while let Some(&byte) = iter.next() {
        if byte == b'\\' && matches!(iter.peek(), Some(&&(b'(' | b')' | b'#'))) {
            continue;
        }
        unescaped.push(byte);
    }
    return String::from_utf8_lossy(&unescaped).into_owned();
}

/// Decode a fragment, treating an empty one as absent.
fn decode_fragment(bytes: &[u8]) -> Option<String> {
    let trimmed = bytes.trim_ascii();
    if trimmed.is_empty() {
        return None;
    }
    return Some(String::from_utf8_lossy(trimmed).into_owned());
}

/// Whether the final path segment carries an extension: a `.` after the
/// last `/` that does not directly follow it. A leading dot with no `/`
/// before it (`.gitignore`) counts.
fn has_extension(path: &[u8]) -> bool {
    let Some(separator) = path.iter().rposition(|&b| return b == b'/') else {
        return path.contains(&b'.');
    };
    return path
        .get(separator.saturating_add(2)..)
        .is_some_and(|rest| return rest.contains(&b'.'));
}

/// Whether a target carries a URI scheme (`https:`, `mailto:`, `ftp:` ...)
/// and so points somewhere other than the local tree.
fn is_remote(path: &[u8]) -> bool {
    let Some(colon) = path.iter().position(|&b| return b == b':') else {
        return false;
    };
    let Some((first, rest)) = path.get(..colon).and_then(<[u8]>::split_first) else {
        return false;
    };
    return colon >= MIN_SCHEME_LEN
        && first.is_ascii_alphabetic()
        && rest
            .iter()
            .all(|&b| return b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'));
}

/// Parse `[text](path#fragment)` starting at the `]` at `at`.
/// Returns the position where scanning resumes.
fn scan_standard_link(content: &[u8], at: usize, links: &mut Vec<RawLink>) -> usize {
    let start = at.saturating_add(2);
    let mut end = start;
    let mut fragment_at: Option<usize> = None;
    let mut escaped = false;

    loop {
        let Some(&byte) = content.get(end) else {
            return end;
        };
        match byte {
            b'\n' | b'\r' => return end.saturating_add(1),
            b')' if !escaped => break,
            b'#' if fragment_at.is_none() && !escaped => fragment_at = Some(end),
            _ => {},
        }
        escaped = byte == b'\\' && !escaped;
        end = end.saturating_add(1);
    }

    let target_end = title_start(content, start, end).unwrap_or(end);
    let fragment_at = fragment_at.filter(|&idx| return idx < target_end);
    let path_end = fragment_at.unwrap_or(target_end);

    let Some(path) = content.get(start..path_end).map(<[u8]>::trim_ascii) else {
        return end.saturating_add(1);
    };
    if path.len() < MIN_LOCAL_PATH_LEN || is_remote(path) || !has_extension(path) {
        return end.saturating_add(1);
    }

    let fragment = fragment_at
        .and_then(|idx| return content.get(idx.saturating_add(1)..target_end))
        .and_then(decode_fragment);
    links.push(RawLink {
        fragment,
        path: decode_target(path),
    });
    return end.saturating_add(1);
}

/// Parse `[[name]]`, `[[name|alias]]`, `[[name#fragment]]` and
/// `[[name#fragment|alias]]` starting at the `[[` at `at`.
/// Returns the position where scanning resumes.
fn scan_wiki_link(content: &[u8], at: usize, links: &mut Vec<RawLink>) -> usize {
    let start = at.saturating_add(2);
    let mut end = start;

    loop {
        match (content.get(end), content.get(end.saturating_add(1))) {
            (None, _) => return end,
            (Some(b'\n' | b'\r'), _) => return end.saturating_add(1),
            (Some(b']'), Some(b']')) => break,
            (Some(_), _) => end = end.saturating_add(1),
        }
    }

    let resume = end.saturating_add(2);
    let Some(body) = content.get(start..end) else {
        return resume;
    };

    let hash = body.iter().position(|&b| return b == b'#');
    let pipe = body.iter().position(|&b| return b == b'|');
    let name_end = match (hash, pipe) {
        (Some(h), Some(p)) => h.min(p),
        (Some(idx), None) | (None, Some(idx)) => idx,
        (None, None) => body.len(),
    };

    let Some(name) = body.get(..name_end).map(<[u8]>::trim_ascii) else {
        return resume;
    };
    if name.is_empty() || is_remote(name) {
        return resume;
    }

    let fragment = match (hash, pipe) {
        (Some(h), Some(p)) if p < h => None,
        (Some(h), _) => body
            .get(h.saturating_add(1)..pipe.unwrap_or(body.len()))
            .and_then(decode_fragment),
        (None, _) => None,
    };

    let mut path = String::from_utf8_lossy(name).into_owned();
    if !has_extension(name) {
        path.push_str(DOCUMENT_SUFFIX);
    }
    links.push(RawLink { fragment, path });
    return resume;
}

/// Start of an optional link title (`path "Title"`) inside `start..end`.
fn title_start(content: &[u8], start: usize, end: usize) -> Option<usize> {
    let target = content.get(start..end)?;
    let offset = target.windows(2).position(|pair| {
        return matches!(pair, [b' ' | b'\t', b'"' | b'\'']);
    })?;
    return Some(start.saturating_add(offset));
}
