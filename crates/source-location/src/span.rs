//! Span and byte offset types for raw source positions.

use text_size::{TextRange, TextSize};

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` into the page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` offsets, as produced by string searches and regex
    /// matches.
    #[inline]
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self::new(TextSize::from(start as u32), TextSize::from(end as u32))
    }

    /// Creates an empty span at the given offset.
    #[inline]
    pub fn empty(offset: impl Into<ByteOffset>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the length of this span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The start offset as a `usize` index.
    #[inline]
    pub fn start_index(&self) -> usize {
        u32::from(self.start) as usize
    }

    /// The end offset as a `usize` index.
    #[inline]
    pub fn end_index(&self) -> usize {
        u32::from(self.end) as usize
    }

    /// Returns the text this span covers in `source`.
    ///
    /// Out-of-range spans yield an empty string.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        source
            .get(self.start_index()..self.end_index())
            .unwrap_or_default()
    }

    /// Returns a span covering both this span and another.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: std::cmp::min(self.start, other.start),
            end: std::cmp::max(self.end, other.end),
        }
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self {
            start: range.start(),
            end: range.end(),
        }
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_from_offsets() {
        let span = Span::from_offsets(3, 9);
        assert_eq!(span.start, TextSize::from(3));
        assert_eq!(span.end, TextSize::from(9));
        assert_eq!(span.len(), TextSize::from(6));
    }

    #[test]
    fn test_span_empty() {
        let span = Span::empty(5u32);
        assert!(span.is_empty());
        assert_eq!(span.start_index(), 5);
    }

    #[test]
    fn test_span_text() {
        let source = "<div>hi</div>";
        assert_eq!(Span::from_offsets(5, 7).text(source), "hi");
        assert_eq!(Span::from_offsets(10, 40).text(source), "");
    }

    #[test]
    fn test_span_cover() {
        let covered = Span::from_offsets(5, 10).cover(Span::from_offsets(8, 20));
        assert_eq!(covered, Span::from_offsets(5, 20));
    }
}
