//! Heading anchors used to validate link fragments.

use std::collections::HashSet;

/// Collect the anchors of every ATX heading (`# Title`, `## Title`, ...).
///
/// A heading starts at the beginning of the buffer or right after a line
/// break, with one or more `#` followed by a space.
pub fn extract_anchors(content: &[u8]) -> HashSet<String> {
    let mut anchors = HashSet::new();

    for line in content.split(|&b| return b == b'\n') {
        let Some(text) = heading_text(line) else {
            continue;
        };
        anchors.insert(slugify(&String::from_utf8_lossy(text)));
    }

    return anchors;
}

/// Whether `fragment` names one of `anchors`, either verbatim or after the
/// same normalization headings go through.
pub fn fragment_matches(anchors: &HashSet<String>, fragment: &str) -> bool {
    return anchors.contains(fragment) || anchors.contains(&slugify(fragment));
}

/// Text of an ATX heading line, trimmed, or `None` for any other line.
fn heading_text(line: &[u8]) -> Option<&[u8]> {
    let level = line.iter().take_while(|&&b| return b == b'#').count();
    if level == 0 {
        return None;
    }
    let rest = line.get(level..)?.strip_prefix(b" ")?;
    return Some(rest.trim_ascii());
}

/// Convert heading text to its anchor: lowercase, keep letters, digits,
/// `-` and `_`, turn spaces into `-`, drop everything else.
fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            result.push(c);
        } else if c == ' ' {
            result.push('-');
        }
    }

    return result;
}
