//! Starpipe Story Model
//!
//! Immutable, round-trip-faithful trees for the nested "story" format
//! emitted by Starlab-style N-body simulation tools.
//!
//! # Core Concepts
//!
//! - [`Story`]: one parsed section, holding a tag, its leaf lines, and its
//!   nested subsections in original interleaved order
//! - [`Leaf`]: a single scalar line inside a section (`key = value` or a
//!   volatile ` ===>` timestamp annotation)
//! - [`Snapshots`]: the one-or-many result type, either a single story or
//!   the ordered sequence of snapshots found in one output stream
//! - [`StoryBuilder`]: bottom-up construction for tests and composition
//!
//! A story records both its normalized content (tag, keys, values) and the
//! exact source lines it was parsed from, so `serialize` reproduces the
//! original text byte-for-byte. Derived equality compares exact text;
//! [`Story::structural_eq`] compares normalized content and skips volatile
//! annotations.
//!
//! # Example
//!
//! ```rust
//! use starpipe_story::Story;
//!
//! let story = Story::builder("Dynamics")
//!     .leaf("N", "5")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(story.serialize(), "(Dynamics\n  N = 5\n)Dynamics\n");
//! ```

mod snapshots;
mod story;

pub use snapshots::Snapshots;
pub use story::{Leaf, LeafKind, Story, StoryBuilder, StoryError, StoryItem};

/// Marker that opens a volatile run-timestamp line inside a `Log` section.
///
/// Lines whose first non-blank content begins with this marker are preserved
/// verbatim on serialization but excluded from structural equality. This is
/// a closed list of one: no other content is ever treated as volatile.
pub const VOLATILE_MARKER: &str = "===>";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
