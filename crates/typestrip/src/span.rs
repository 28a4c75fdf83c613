//! Source location tracking.
//!
//! Every token and every elided range carries a `Span` of byte offsets.
//! Line/column information is recovered on demand through `LineIndex`, which
//! is how diagnostics and line-preservation checks talk about positions.

use serde::Serialize;

/// A span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Span {
    /// Byte offset of the start.
    pub start: u32,
    /// Byte offset of the end (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// The source text covered by this span.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start as usize..self.end as usize]
    }
}

/// Convert byte offsets to line/column.
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offsets of the start of each line.
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build a line index from source code.
    ///
    /// `\n`, `\r\n`, a lone `\r`, U+2028 and U+2029 all terminate a line,
    /// matching the terminators the emitter preserves.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = source.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '\r' if chars.peek().map(|&(_, next)| next) == Some('\n') => {}
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                    line_starts.push((i + c.len_utf8()) as u32);
                }
                _ => {}
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to line and column (both 0-indexed).
    #[must_use]
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        let col = offset - self.line_starts[line];
        (line as u32, col)
    }

    /// Convert a byte offset to a 1-based `(line, column)` pair for display.
    #[must_use]
    pub fn location(&self, offset: u32) -> (u32, u32) {
        let (line, col) = self.line_col(offset);
        (line + 1, col + 1)
    }
}
