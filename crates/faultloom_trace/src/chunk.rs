//! Chunk: an ordered sequence of spans returned by the trace store.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// An ordered sequence of spans, typically everything returned for one
/// service over one query window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The spans in this chunk, in arrival order.
    pub spans: Vec<Span>,
}

impl Chunk {
    /// Creates an empty chunk.
    #[must_use]
    pub const fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// Appends another chunk's spans onto this one.
    pub fn extend(&mut self, other: Chunk) {
        self.spans.extend(other.spans);
    }

    /// Returns the number of spans in this chunk.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns true if this chunk has no spans.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Iterates over the spans in this chunk.
    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }
}

impl FromIterator<Span> for Chunk {
    fn from_iter<T: IntoIterator<Item = Span>>(iter: T) -> Self {
        Self {
            spans: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Chunk {
    type Item = Span;
    type IntoIter = std::vec::IntoIter<Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_concatenates_spans() {
        let mut a = Chunk::from_iter(vec![Span::new("t", "1")]);
        let b = Chunk::from_iter(vec![Span::new("t", "2")]);
        a.extend(b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn empty_chunk_is_empty() {
        assert!(Chunk::new().is_empty());
    }
}
