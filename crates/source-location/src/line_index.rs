//! Line index for offset → line/column conversion.

use crate::{ByteOffset, Position};
use text_size::TextSize;

/// An index for converting byte offsets into [`Position`]s.
///
/// The index stores the byte offset of the start of each line, so each lookup is a
/// binary search instead of a scan from the start of the text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[i]` is the offset where line `i + 1` begins.
    line_starts: Vec<ByteOffset>,
    len: ByteOffset,
}

impl LineIndex {
    /// Creates a new line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];

        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }

        Self {
            line_starts,
            len: TextSize::from(text.len() as u32),
        }
    }

    /// Returns the number of lines in the source.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a position.
    ///
    /// Offsets past the end of the text clamp to the end.
    pub fn position(&self, offset: ByteOffset) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let line_start = self.line_starts[line];
        Position {
            line: line as u32 + 1,
            column: u32::from(offset) - u32::from(line_start),
        }
    }

    /// Returns the byte offset where a 1-based line starts.
    pub fn line_start(&self, line: u32) -> Option<ByteOffset> {
        let index = (line as usize).checked_sub(1)?;
        self.line_starts.get(index).copied()
    }
}
