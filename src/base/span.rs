//! Source text positions and ranges.

use std::fmt;

// Re-export from text-size for byte-level spans
pub use text_size::TextRange;
pub use text_size::TextSize;

/// A line and column position in source text.
///
/// Both line and column are 1-indexed. Columns count Unicode scalar values
/// from the start of the line, not bytes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct SourcePos {
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column
    pub column: u32,
}

impl SourcePos {
    /// Create a new position from 1-indexed line and column.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Create from 0-indexed line and column (as used by LSP hosts).
    #[inline]
    pub const fn from_zero_indexed(line: u32, column: u32) -> Self {
        Self {
            line: line.saturating_add(1),
            column: column.saturating_add(1),
        }
    }

    /// Get the 0-indexed line number.
    #[inline]
    pub const fn line_zero_indexed(self) -> u32 {
        self.line.saturating_sub(1)
    }

    /// Get the 0-indexed column.
    #[inline]
    pub const fn column_zero_indexed(self) -> u32 {
        self.column.saturating_sub(1)
    }
}

impl fmt::Debug for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A range of source text, inclusive start and exclusive end.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct SourceRange {
    pub start: SourcePos,
    pub end: SourcePos,
}

impl SourceRange {
    #[inline]
    pub const fn new(start: SourcePos, end: SourcePos) -> Self {
        Self { start, end }
    }

    /// A zero-width range at `pos`.
    #[inline]
    pub const fn empty(pos: SourcePos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Whether `pos` lies in `[start, end)`.
    #[inline]
    pub fn contains(self, pos: SourcePos) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Whether this range touches `line` at all.
    pub fn spans_line(self, line: u32) -> bool {
        self.start.line <= line && line <= self.end.line
    }

    /// Smallest range covering both `self` and `other`.
    pub fn cover(self, other: SourceRange) -> SourceRange {
        SourceRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Debug for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Index for converting byte offsets into line/column positions.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];

        for (offset, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset into `text` to a 1-based position.
    ///
    /// `text` must be the string this index was built from and `offset`
    /// must fall on a char boundary.
    pub fn position(&self, text: &str, offset: TextSize) -> SourcePos {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);

        let line_start = self.line_starts[line];
        let column = text[TextRange::new(line_start, offset)].chars().count();

        SourcePos::new(line as u32 + 1, column as u32 + 1)
    }

    /// Convert a byte range into `text` to a 1-based source range.
    pub fn range(&self, text: &str, range: TextRange) -> SourceRange {
        SourceRange::new(
            self.position(text, range.start()),
            self.position(text, range.end()),
        )
    }

    /// Position just past the last character of `text`.
    pub fn end_of(&self, text: &str) -> SourcePos {
        self.position(text, TextSize::of(text))
    }

    /// Get the number of lines.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    /// Always false: even empty text has one line.
    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}

/// Forward-only offset to position conversion.
///
/// Each call counts characters only between the previous offset and the new
/// one, so converting a whole token stream costs one pass over the text
/// however long its lines are. Moving backwards restarts from the top.
#[derive(Clone, Debug)]
pub struct PositionCursor<'t> {
    text: &'t str,
    offset: TextSize,
    pos: SourcePos,
}

impl<'t> PositionCursor<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            offset: TextSize::from(0),
            pos: SourcePos::new(1, 1),
        }
    }

    /// Position of byte `offset`, which must fall on a char boundary.
    pub fn advance_to(&mut self, offset: TextSize) -> SourcePos {
        if offset < self.offset {
            *self = Self::new(self.text);
        }

        for c in self.text[TextRange::new(self.offset, offset)].chars() {
            if c == '\n' {
                self.pos.line += 1;
                self.pos.column = 1;
            } else {
                self.pos.column += 1;
            }
        }

        self.offset = offset;
        self.pos
    }

    pub fn range(&mut self, range: TextRange) -> SourceRange {
        let start = self.advance_to(range.start());
        let end = self.advance_to(range.end());
        SourceRange::new(start, end)
    }
}
