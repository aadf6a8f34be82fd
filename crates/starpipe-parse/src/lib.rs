//! Starpipe Parser
//!
//! Converts Starlab-format text into [`Story`] trees. The format is
//! line-oriented and self-delimiting: a section opens with `(Tag`, holds
//! `key = value` leaf lines and nested sections in order, and closes with
//! `)Tag`. One output stream may carry several top-level sections, the
//! snapshots a long-running simulation emitted over time.
//!
//! Two entry points share one single-pass engine:
//!
//! - [`parse_str`] for fully-buffered text
//! - [`parse_lines`] for any line source, consumed lazily with no
//!   backtracking, so it also serves a live process stream
//!
//! Section nesting is tracked on an explicit stack, so parse depth is
//! bounded by memory rather than the call stack. Parsing is strict: any
//! line that is not a delimiter, a leaf, or a volatile ` ===>` annotation
//! fails with the offending line number. No recovery, no partial results.
//!
//! # Example
//!
//! ```rust
//! use starpipe_parse::parse_str;
//!
//! let text = "(Dynamics\n  N = 5\n)Dynamics\n";
//! let snaps = parse_str(text).unwrap();
//! let story = snaps.single().unwrap();
//! assert_eq!(story.tag(), "Dynamics");
//! assert_eq!(story.get("N"), Some("5"));
//! assert_eq!(story.serialize(), text);
//! ```

mod error;
mod line;
mod parser;

pub use error::ParseError;
pub use parser::{parse_lines, parse_str};

pub use starpipe_story::{Snapshots, Story};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
