//! Byte spans and line/column lookup.
//!
//! Markup is parsed out of a larger single-file component, so every span the
//! template parser produces is relative to the template block. [`Span::shift`]
//! moves such a span back into file coordinates, and [`LineIndex`] turns the
//! result into the 1-based positions shown to users.

use std::fmt;
pub use text_size::{TextRange, TextSize};

/// A half-open byte range `[start, end)` in some source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Start offset (inclusive)
    pub start: u32,
    /// End offset (exclusive)
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A zero-width span at `offset`.
    #[inline]
    pub const fn empty(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    /// Build a span from `usize` cursor positions.
    #[inline]
    pub fn between(start: usize, end: usize) -> Self {
        Self::new(start as u32, end as u32)
    }

    /// Move the span forward by `delta` bytes.
    ///
    /// Used to translate a template-relative span into a position inside the
    /// enclosing component file.
    #[inline]
    pub const fn shift(self, delta: u32) -> Span {
        Span::new(self.start + delta, self.end + delta)
    }

    /// Slice `text` with this span, clamping to the text bounds.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        let end = (self.end as usize).min(text.len());
        let start = (self.start as usize).min(end);
        text.get(start..end).unwrap_or("")
    }

    #[inline]
    pub fn to_text_range(self) -> TextRange {
        TextRange::new(TextSize::new(self.start), TextSize::new(self.end.max(self.start)))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self::new(range.start().into(), range.end().into())
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Offset of the first character of every line.
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    /// Index the line breaks of `text`.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        let mut offset = TextSize::new(0);
        for c in text.chars() {
            offset += TextSize::of(c);
            if c == '\n' {
                line_starts.push(offset);
            }
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// 0-indexed line and column of `offset`. Offsets past the end clamp to
    /// the last position.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line];
        LineCol::new(line as u32, col.into())
    }

    /// Start of `span` as a 0-indexed position.
    pub fn locate(&self, span: Span) -> LineCol {
        self.line_col(span.to_text_range().start())
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// A 0-indexed line and column (columns count bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// 1-indexed `(line, column)` pair for messages.
    #[inline]
    pub const fn to_display(self) -> (u32, u32) {
        (self.line + 1, self.col + 1)
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.to_display();
        write!(f, "{}:{}", line, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_span_shift_and_text_range() {
        let span = Span::new(2, 6).shift(10);
        assert_eq!(span, Span::new(12, 16));
        assert_eq!(span.to_text_range(), TextRange::new(12.into(), 16.into()));
        assert_eq!(Span::from(span.to_text_range()), span);
    }

    #[test]
    fn test_span_slice_clamps() {
        let text = "<q-btn/>";
        assert_eq!(Span::new(1, 6).slice(text), "q-btn");
        assert_eq!(Span::new(4, 100).slice(text), "tn/>");
        assert_eq!(Span::new(50, 60).slice(text), "");
    }

    #[test]
    fn test_line_index() {
        let text = "<template>\n  <div>\n  </div>\n</template>";
        let index = LineIndex::new(text);

        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_col(0.into()), LineCol::new(0, 0));
        assert_eq!(index.line_col(13.into()), LineCol::new(1, 2));
        assert_eq!(index.locate(Span::new(21, 27)), LineCol::new(2, 2));
        assert_eq!(index.line_col(10_000.into()), index.line_col(TextSize::of(text)));
    }

    #[test]
    fn test_multibyte_columns_count_bytes() {
        let index = LineIndex::new("é\nñx");
        assert_eq!(index.locate(Span::new(5, 6)), LineCol::new(1, 2));
    }

    #[test]
    fn test_line_col_display() {
        assert_eq!(LineCol::new(0, 4).to_string(), "1:5");
        assert_eq!(Span::new(3, 8).to_string(), "3..8");
    }
}
