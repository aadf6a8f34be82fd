//! Story tree: one section of Starlab-format output
//!
//! A [`Story`] keeps two views of the same section side by side:
//! - the normalized content (tag, leaf keys/values, children)
//! - the exact source lines (`raw_*`), so serialization is byte-identical
//!   to the text the section was parsed from

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised when building a story bottom-up
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoryError {
    /// Tag is empty or contains characters the wire format cannot carry
    #[error("invalid section tag `{tag}`")]
    InvalidTag {
        /// The offending tag
        tag: String,
    },

    /// Leaf key is empty, contains `=`, or spans multiple lines
    #[error("invalid leaf key `{key}`")]
    InvalidLeafKey {
        /// The offending key
        key: String,
    },

    /// Leaf value contains a line break
    #[error("invalid leaf value for `{key}`: values must be single-line")]
    InvalidLeafValue {
        /// Key of the offending leaf
        key: String,
    },
}

/// Kind of a leaf line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafKind {
    /// A `key = value` line
    Assignment,
    /// A volatile ` ===>` run-timestamp line, preserved but not compared
    Annotation,
}

/// One scalar line inside a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    /// Exact source line, reproduced verbatim on serialization
    raw: String,
    /// Trimmed key (empty for annotations)
    key: String,
    /// Trimmed value
    value: String,
    /// Assignment or volatile annotation
    kind: LeafKind,
}

impl Leaf {
    /// Create an assignment leaf with the canonical `  key = value` spelling.
    ///
    /// # Errors
    /// - `StoryError::InvalidLeafKey` if the key is empty, contains `=`, or
    ///   spans multiple lines
    /// - `StoryError::InvalidLeafValue` if the value spans multiple lines
    pub fn assignment(
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, StoryError> {
        let key = key.into();
        let value = value.into();
        let trimmed_key = key.trim();
        if trimmed_key.is_empty() || trimmed_key.contains('=') || trimmed_key.contains('\n') {
            return Err(StoryError::InvalidLeafKey { key });
        }
        if value.contains('\n') {
            return Err(StoryError::InvalidLeafValue { key });
        }
        let raw = format!("  {} = {}", trimmed_key, value.trim());
        Ok(Self {
            key: trimmed_key.to_string(),
            value: value.trim().to_string(),
            raw,
            kind: LeafKind::Assignment,
        })
    }

    /// Create an assignment leaf from an already-parsed source line.
    ///
    /// The raw line is trusted to reproduce `key` and `value` when reparsed;
    /// the parser is the only expected caller.
    #[inline]
    #[must_use]
    pub fn from_raw_assignment(
        raw: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            raw: raw.into(),
            key: key.into(),
            value: value.into(),
            kind: LeafKind::Assignment,
        }
    }

    /// Create a volatile annotation leaf from its exact source line.
    #[inline]
    #[must_use]
    pub fn annotation(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = raw.trim().to_string();
        Self {
            raw,
            key: String::new(),
            value,
            kind: LeafKind::Annotation,
        }
    }

    /// Trimmed key (empty for annotations)
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Trimmed value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Exact source line
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Assignment or annotation
    #[inline]
    #[must_use]
    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    /// True for volatile ` ===>` annotation lines
    #[inline]
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.kind == LeafKind::Annotation
    }
}

/// One entry in a section body, in original source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryItem {
    /// A scalar line
    Leaf(Leaf),
    /// A nested section
    Section(Story),
}

/// One section of Starlab-format output: a tagged node with ordered leaf
/// lines and ordered nested subsections.
///
/// Immutable once built. Derived `PartialEq` is exact-text equality (raw
/// delimiter and leaf lines included); [`Story::structural_eq`] compares
/// normalized content and skips volatile annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    tag: String,
    raw_open: String,
    raw_close: String,
    items: Vec<StoryItem>,
}

impl Story {
    /// Start building a story bottom-up.
    #[inline]
    #[must_use]
    pub fn builder(tag: impl Into<String>) -> StoryBuilder {
        StoryBuilder::new(tag)
    }

    /// Section tag from the opening delimiter
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Exact opening delimiter line
    #[inline]
    #[must_use]
    pub fn raw_open_line(&self) -> &str {
        &self.raw_open
    }

    /// Exact closing delimiter line
    #[inline]
    #[must_use]
    pub fn raw_close_line(&self) -> &str {
        &self.raw_close
    }

    /// Body entries in original interleaved order
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[StoryItem] {
        &self.items
    }

    /// Assignment leaves in order (annotations excluded)
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.items.iter().filter_map(|item| match item {
            StoryItem::Leaf(leaf) if !leaf.is_annotation() => Some(leaf),
            _ => None,
        })
    }

    /// Volatile annotation leaves in order
    pub fn annotations(&self) -> impl Iterator<Item = &Leaf> {
        self.items.iter().filter_map(|item| match item {
            StoryItem::Leaf(leaf) if leaf.is_annotation() => Some(leaf),
            _ => None,
        })
    }

    /// Nested subsections in order
    pub fn children(&self) -> impl Iterator<Item = &Story> {
        self.items.iter().filter_map(|item| match item {
            StoryItem::Section(child) => Some(child),
            _ => None,
        })
    }

    /// Value of the first assignment leaf with the given key, if any
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.leaves().find(|l| l.key() == key).map(Leaf::value)
    }

    /// Serialize back to the wire format.
    ///
    /// Emits the recorded raw lines in original order, each terminated with
    /// `\n`. For a story produced by the parser this reproduces the source
    /// text byte-for-byte. Uses an explicit work stack, so serialization
    /// depth is bounded by memory rather than the call stack.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.raw_open);
        out.push('\n');
        // (section, index of the next body item to emit)
        let mut stack: Vec<(&Story, usize)> = vec![(self, 0)];
        while let Some((section, idx)) = stack.pop() {
            match section.items.get(idx) {
                Some(StoryItem::Leaf(leaf)) => {
                    out.push_str(leaf.raw());
                    out.push('\n');
                    stack.push((section, idx + 1));
                }
                Some(StoryItem::Section(child)) => {
                    out.push_str(&child.raw_open);
                    out.push('\n');
                    stack.push((section, idx + 1));
                    stack.push((child, 0));
                }
                None => {
                    out.push_str(&section.raw_close);
                    out.push('\n');
                }
            }
        }
        out
    }

    /// Start a builder seeded with this story's content.
    ///
    /// The only mutation path: the story itself stays untouched, the
    /// builder produces a fresh copy.
    #[must_use]
    pub fn to_builder(&self) -> StoryBuilder {
        StoryBuilder {
            tag: self.tag.clone(),
            raw_open: Some(self.raw_open.clone()),
            raw_close: Some(self.raw_close.clone()),
            items: self.items.clone(),
            error: None,
        }
    }

    /// Normalized comparison: tags, assignment leaves as `(key, value)`
    /// pairs in order, and children recursively, all must match.
    ///
    /// Volatile annotations and any text trailing the tag on the opening
    /// delimiter are ignored, so two runs of the same command compare equal
    /// even though their timestamps differ.
    #[must_use]
    pub fn structural_eq(&self, other: &Story) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.tag != b.tag {
                return false;
            }
            let leaves_a: Vec<&Leaf> = a.leaves().collect();
            let leaves_b: Vec<&Leaf> = b.leaves().collect();
            if leaves_a.len() != leaves_b.len() {
                return false;
            }
            let leaves_match = leaves_a
                .iter()
                .zip(&leaves_b)
                .all(|(x, y)| x.key() == y.key() && x.value() == y.value());
            if !leaves_match {
                return false;
            }
            let children_a: Vec<&Story> = a.children().collect();
            let children_b: Vec<&Story> = b.children().collect();
            if children_a.len() != children_b.len() {
                return false;
            }
            pending.extend(children_a.into_iter().zip(children_b));
        }
        true
    }
}

impl fmt::Display for Story {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Bottom-up builder for [`Story`].
///
/// Used by tests and by the parser. Without explicit raw delimiter lines,
/// `build` synthesizes the canonical forms `(Tag` and `)Tag`.
#[derive(Debug, Clone, Default)]
pub struct StoryBuilder {
    tag: String,
    raw_open: Option<String>,
    raw_close: Option<String>,
    items: Vec<StoryItem>,
    error: Option<StoryError>,
}

impl StoryBuilder {
    /// Start a builder for a section with the given tag.
    #[inline]
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Append an assignment leaf with canonical spelling.
    ///
    /// An invalid key or value is reported by `build`.
    #[must_use]
    pub fn leaf(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match Leaf::assignment(key, value) {
            Ok(leaf) => self.items.push(StoryItem::Leaf(leaf)),
            Err(err) => self.error = self.error.or(Some(err)),
        }
        self
    }

    /// Append an already-constructed leaf (parser path).
    #[must_use]
    pub fn push_leaf(mut self, leaf: Leaf) -> Self {
        self.items.push(StoryItem::Leaf(leaf));
        self
    }

    /// Append a volatile annotation line.
    #[must_use]
    pub fn annotation(mut self, raw: impl Into<String>) -> Self {
        self.items.push(StoryItem::Leaf(Leaf::annotation(raw)));
        self
    }

    /// Append a nested subsection.
    #[must_use]
    pub fn child(mut self, child: Story) -> Self {
        self.items.push(StoryItem::Section(child));
        self
    }

    /// Use an exact opening delimiter line instead of the canonical `(Tag`.
    #[must_use]
    pub fn raw_open_line(mut self, raw: impl Into<String>) -> Self {
        self.raw_open = Some(raw.into());
        self
    }

    /// Use an exact closing delimiter line instead of the canonical `)Tag`.
    #[must_use]
    pub fn raw_close_line(mut self, raw: impl Into<String>) -> Self {
        self.raw_close = Some(raw.into());
        self
    }

    /// Finish the story.
    ///
    /// # Errors
    /// - `StoryError::InvalidTag` if the tag is empty or carries characters
    ///   the delimiter lines cannot represent
    /// - the first leaf error recorded by [`StoryBuilder::leaf`], if any
    pub fn build(self) -> Result<Story, StoryError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        validate_tag(&self.tag)?;
        let raw_open = self
            .raw_open
            .unwrap_or_else(|| format!("({}", self.tag));
        let raw_close = self
            .raw_close
            .unwrap_or_else(|| format!("){}", self.tag));
        Ok(Story {
            tag: self.tag,
            raw_open,
            raw_close,
            items: self.items,
        })
    }
}

/// A tag must start with a letter or underscore and continue with
/// alphanumerics, `_`, or `-`, matching what the parser accepts.
fn validate_tag(tag: &str) -> Result<(), StoryError> {
    let mut chars = tag.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoryError::InvalidTag {
            tag: tag.to_string(),
        })
    }
}
