//! Source positions for diagnostics.

use std::fmt;

/// Where a token, node or error starts in the source, plus how many bytes it covers.
///
/// Lines and columns are 1-based; columns count bytes, not characters.
/// `Span::default()` (0:0) marks synthesized nodes with no source position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// A zero-width span, used for end-of-input and inserted semicolons.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Extend `self` so it also covers `end`.
    ///
    /// Only same-line spans get an exact length. A span reaching onto a later
    /// line keeps its start and just sums both lengths, which is enough for
    /// caret placement in diagnostics.
    #[inline]
    pub fn to(self, end: Span) -> Span {
        if self.line == end.line {
            let start = self.col.min(end.col);
            let stop = (end.col + end.len).max(self.col + self.len);
            Span::new(self.line, start, stop - start)
        } else {
            Span::new(self.line, self.col, self.len + end.len)
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
