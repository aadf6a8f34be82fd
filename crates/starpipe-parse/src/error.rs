//! Parse error types
//!
//! Every variant carries the 1-based line number of the offending input
//! line (or the line a dangling section opened at). Parsing stops at the
//! first error; nothing parsed so far is returned.

use starpipe_story::StoryError;

/// Errors raised while parsing a story stream
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A closing delimiter appeared with no section open
    #[error("line {line}: closer `){tag}` with no open section")]
    UnexpectedClose {
        /// Tag on the closing delimiter
        tag: String,
        /// 1-based source line number
        line: usize,
    },

    /// A closing delimiter did not match the innermost open section
    #[error("line {line}: found closer `){found}`, expected `){expected}`")]
    MismatchedClose {
        /// Tag on the closing delimiter
        found: String,
        /// Tag of the innermost open section
        expected: String,
        /// 1-based source line number
        line: usize,
    },

    /// A line inside a section matched no recognized construct
    #[error("line {line}: unrecognized syntax `{content}` (expected a leaf, a nested section, or `){expected}`)")]
    MalformedLine {
        /// 1-based source line number
        line: usize,
        /// The offending line text
        content: String,
        /// Tag of the section awaiting its closer
        expected: String,
    },

    /// A non-delimiter line appeared between top-level sections
    #[error("line {line}: content outside any section: `{content}`")]
    ContentOutsideSection {
        /// 1-based source line number
        line: usize,
        /// The offending line text
        content: String,
    },

    /// Input ended while a section was still open
    #[error("section `{tag}` opened at line {opened_at} was never closed")]
    UnterminatedSection {
        /// Tag of the unclosed section
        tag: String,
        /// 1-based line number of its opening delimiter
        opened_at: usize,
    },

    /// A parsed section failed model validation
    #[error("invalid section structure: {0}")]
    Section(#[from] StoryError),
}
