//! One-or-many parse results
//!
//! A simulation output stream may hold a single snapshot or several emitted
//! over time. The distinction lives at the API boundary, not inside the
//! tree: [`Snapshots`] collapses a length-1 sequence to the bare story and
//! keeps longer streams as an ordered sequence.

use crate::Story;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of parsing one output stream: a single story, or the ordered
/// sequence of sibling top-level stories found in it.
///
/// Chain continuation requires exactly one snapshot; [`Snapshots::single`]
/// is the checked access point for that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Snapshots {
    /// Exactly one top-level story was found
    Single(Story),
    /// Zero, or two or more, top-level stories in stream order
    Many(Vec<Story>),
}

impl Snapshots {
    /// Collapse a sequence: length 1 becomes `Single`, anything else `Many`.
    #[must_use]
    pub fn from_vec(mut stories: Vec<Story>) -> Self {
        if stories.len() == 1 {
            Self::Single(stories.remove(0))
        } else {
            Self::Many(stories)
        }
    }

    /// Number of snapshots
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(stories) => stories.len(),
        }
    }

    /// True when the stream held no complete story
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The story, when there is exactly one
    #[inline]
    #[must_use]
    pub fn single(&self) -> Option<&Story> {
        match self {
            Self::Single(story) => Some(story),
            Self::Many(_) => None,
        }
    }

    /// Iterate snapshots in stream order
    pub fn iter(&self) -> std::slice::Iter<'_, Story> {
        match self {
            Self::Single(story) => std::slice::from_ref(story).iter(),
            Self::Many(stories) => stories.iter(),
        }
    }

    /// Consume into a plain ordered sequence
    #[must_use]
    pub fn into_vec(self) -> Vec<Story> {
        match self {
            Self::Single(story) => vec![story],
            Self::Many(stories) => stories,
        }
    }

    /// Serialize every snapshot in order, concatenated
    #[must_use]
    pub fn serialize(&self) -> String {
        self.iter().map(Story::serialize).collect()
    }

    /// Pairwise normalized comparison (see [`Story::structural_eq`])
    #[must_use]
    pub fn structural_eq(&self, other: &Snapshots) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.structural_eq(b))
    }
}

impl From<Story> for Snapshots {
    fn from(story: Story) -> Self {
        Self::Single(story)
    }
}

impl<'a> IntoIterator for &'a Snapshots {
    type Item = &'a Story;
    type IntoIter = std::slice::Iter<'a, Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Snapshots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
