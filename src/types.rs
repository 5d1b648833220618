/// Core domain types shared by the parser, resolver, and document model.
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Half-open character offset range into one document's raw text.
/// Offsets count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First character covered by the span.
    pub start: usize,
    /// One past the last character covered by the span.
    pub end: usize,
}

impl Span {
    /// True for a zero-width span.
    pub const fn is_empty(&self) -> bool {
        return self.end <= self.start;
    }

    /// Number of characters covered.
    pub const fn len(&self) -> usize {
        return self.end.saturating_sub(self.start);
    }

    /// Build a span from a start and end offset.
    pub const fn new(start: usize, end: usize) -> Self {
        return Self { start, end };
    }

    /// Whether the two spans share at least one character.
    pub fn overlaps(&self, other: &Self) -> bool {
        return self.start.max(other.start) < self.end.min(other.end);
    }

    /// Check the fragment list of one entity: at least one fragment, each with
    /// `start < end`, ascending and non-overlapping.
    ///
    /// # Errors
    ///
    /// Returns the reason the list is invalid.
    pub fn validate_list(spans: &[Self]) -> Result<(), String> {
        if spans.is_empty() {
            return Err("entity has no spans".to_string());
        }
        let mut previous: Option<&Self> = None;
        for span in spans {
            if span.is_empty() {
                return Err(format!("span {}-{} is not ascending", span.start, span.end));
            }
            if let Some(prev) = previous
                && span.start < prev.end
            {
                return Err(format!(
                    "fragment {}-{} overlaps or precedes {}-{}",
                    span.start, span.end, prev.start, prev.end
                ));
            }
            previous = Some(span);
        }
        return Ok(());
    }
}

/// Maps character offsets to byte offsets for one text.
///
/// Holds the byte position of every char boundary, including the end of the
/// text, so a span of `n` chars in a text of `len` chars is valid iff
/// `end <= len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharIndex {
    /// Byte offset of each char, followed by the total byte length.
    boundaries: Vec<usize>,
}

impl CharIndex {
    /// Index every char boundary of `text`.
    pub fn new(text: &str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(byte, _)| return byte).collect();
        boundaries.push(text.len());
        return Self { boundaries };
    }

    /// Byte range covered by a char span, or `None` if it runs past the text.
    pub fn byte_range(&self, span: Span) -> Option<Range<usize>> {
        let start = *self.boundaries.get(span.start)?;
        let end = *self.boundaries.get(span.end)?;
        if start > end {
            return None;
        }
        return Some(start..end);
    }

    /// Character offset of a byte offset that sits on a char boundary.
    pub fn char_offset(&self, byte: usize) -> Option<usize> {
        return self.boundaries.binary_search(&byte).ok();
    }

    /// Length of the indexed text in characters.
    pub fn char_len(&self) -> usize {
        return self.boundaries.len().saturating_sub(1);
    }

    /// Slice `text` by a char span. `text` must be the string this index was built from.
    pub fn slice<'a>(&self, text: &'a str, span: Span) -> Option<&'a str> {
        return text.get(self.byte_range(span)?);
    }
}

/// SHA-256 digest of a document's annotation and text bytes, 64 lowercase hex chars.
/// Newtype prevents mixing with arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(
    /// The hex-encoded SHA-256 digest string.
    pub String,
);
