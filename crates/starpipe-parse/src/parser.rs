//! Single-pass, explicit-stack section assembly

use crate::error::ParseError;
use crate::line::{classify, LineKind};
use starpipe_story::{Leaf, Snapshots, Story, StoryItem};
use tracing::{debug, trace};

/// An opened, partially-built section
struct OpenSection {
    tag: String,
    raw_open: String,
    opened_at: usize,
    items: Vec<StoryItem>,
}

impl OpenSection {
    fn finish(self, raw_close: &str) -> Result<Story, ParseError> {
        let builder = self
            .items
            .into_iter()
            .fold(Story::builder(self.tag.as_str()), |b, item| match item {
                StoryItem::Leaf(leaf) => b.push_leaf(leaf),
                StoryItem::Section(child) => b.child(child),
            });
        Ok(builder
            .raw_open_line(self.raw_open)
            .raw_close_line(raw_close)
            .build()?)
    }
}

/// Parse a fully-buffered story stream.
///
/// Returns the bare story when the text holds exactly one top-level
/// section, and the ordered sequence otherwise (including the empty one).
///
/// # Errors
/// Any malformed, unmatched, or unterminated construct fails with a
/// [`ParseError`] naming the offending line; see the crate docs.
pub fn parse_str(text: &str) -> Result<Snapshots, ParseError> {
    parse_lines(text.lines())
}

/// Parse a story stream from any source of lines.
///
/// The source is consumed lazily in a single forward pass, so it may be a
/// split string, a file reader, or a live subprocess stream. Given the same
/// text split into lines, the result is identical to [`parse_str`].
///
/// # Errors
/// Same contract as [`parse_str`].
pub fn parse_lines<I>(lines: I) -> Result<Snapshots, ParseError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut stack: Vec<OpenSection> = Vec::new();
    let mut complete: Vec<Story> = Vec::new();

    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        let number = idx + 1;
        match classify(line) {
            LineKind::Open { tag } => {
                trace!(tag, line = number, depth = stack.len(), "open section");
                stack.push(OpenSection {
                    tag: tag.to_string(),
                    raw_open: line.to_string(),
                    opened_at: number,
                    items: Vec::new(),
                });
            }
            LineKind::Close { tag } => {
                let open = stack.pop().ok_or_else(|| ParseError::UnexpectedClose {
                    tag: tag.to_string(),
                    line: number,
                })?;
                if open.tag != tag {
                    return Err(ParseError::MismatchedClose {
                        found: tag.to_string(),
                        expected: open.tag,
                        line: number,
                    });
                }
                trace!(tag, line = number, depth = stack.len(), "close section");
                let story = open.finish(line)?;
                match stack.last_mut() {
                    Some(parent) => parent.items.push(StoryItem::Section(story)),
                    None => complete.push(story),
                }
            }
            LineKind::Annotation => match stack.last_mut() {
                Some(open) => open.items.push(StoryItem::Leaf(Leaf::annotation(line))),
                None => {
                    return Err(ParseError::ContentOutsideSection {
                        line: number,
                        content: line.to_string(),
                    })
                }
            },
            LineKind::Leaf { key, value } => match stack.last_mut() {
                Some(open) => open.items.push(StoryItem::Leaf(Leaf::from_raw_assignment(
                    line, key, value,
                ))),
                None => {
                    return Err(ParseError::ContentOutsideSection {
                        line: number,
                        content: line.to_string(),
                    })
                }
            },
            LineKind::Other => {
                return Err(match stack.last() {
                    Some(open) => ParseError::MalformedLine {
                        line: number,
                        content: line.to_string(),
                        expected: open.tag.clone(),
                    },
                    None => ParseError::ContentOutsideSection {
                        line: number,
                        content: line.to_string(),
                    },
                })
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::UnterminatedSection {
            tag: open.tag,
            opened_at: open.opened_at,
        });
    }

    debug!(snapshots = complete.len(), "parsed story stream");
    Ok(Snapshots::from_vec(complete))
}
