//! Line classification ahead of section assembly
//!
//! The format is strictly line-oriented, so classification looks at one
//! line in isolation. Delimiters must start in column 0; everything after
//! an opening tag is a preserved annotation.

use once_cell::sync::Lazy;
use regex::Regex;
use starpipe_story::VOLATILE_MARKER;

static OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(([A-Za-z_][\w-]*)").expect("open pattern"));
static CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\)([A-Za-z_][\w-]*)\s*$").expect("close pattern"));

/// What a single source line is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    /// `(Tag`, possibly with trailing annotation text
    Open { tag: &'a str },
    /// `)Tag`
    Close { tag: &'a str },
    /// Volatile ` ===>` run-timestamp line
    Annotation,
    /// `key = value`
    Leaf { key: &'a str, value: &'a str },
    /// Anything else, blank lines included
    Other,
}

pub(crate) fn classify(line: &str) -> LineKind<'_> {
    if let Some(caps) = OPEN_RE.captures(line) {
        if let Some(tag) = caps.get(1) {
            return LineKind::Open {
                tag: tag.as_str(),
            };
        }
    }
    if let Some(caps) = CLOSE_RE.captures(line) {
        if let Some(tag) = caps.get(1) {
            return LineKind::Close {
                tag: tag.as_str(),
            };
        }
    }
    // Checked before the leaf pattern: the marker itself contains `=`.
    if line.trim_start().starts_with(VOLATILE_MARKER) {
        return LineKind::Annotation;
    }
    if let Some(eq) = line.find('=') {
        let key = line[..eq].trim();
        if !key.is_empty() {
            return LineKind::Leaf {
                key,
                value: line[eq + 1..].trim(),
            };
        }
    }
    LineKind::Other
}
