//! Source positions.
//!
//! All offsets are byte offsets into the UTF-8 source text. AST nodes keep a
//! [`TextRange`] (start and end) because the parser fixes up the end after the
//! fact; diagnostics and lift errors carry a [`TextSpan`] (start and length).

use std::fmt;

pub type TextPos = u32;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextSpan {
    pub start: TextPos,
    pub length: TextPos,
}

impl TextSpan {
    pub const fn new(start: TextPos, length: TextPos) -> Self {
        TextSpan { start, length }
    }

    /// Span from `start` up to (not including) `end`. An `end` before
    /// `start` yields an empty span.
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        TextSpan::new(start, end.saturating_sub(start))
    }

    pub fn end(self) -> TextPos {
        self.start + self.length
    }
}

/// Start and end of a node. Both fields are public so the parser can
/// finish a node once its last token is known.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct TextRange {
    pub pos: TextPos,
    pub end: TextPos,
}

impl TextRange {
    pub const fn new(pos: TextPos, end: TextPos) -> Self {
        TextRange { pos, end }
    }

    pub fn to_span(self) -> TextSpan {
        TextSpan::from_bounds(self.pos, self.end)
    }
}

/// Zero-based line and column. `Display` writes the one-based form
/// `line,column` used in rendered diagnostics.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    pub line: u32,
    pub character: u32,
}

impl fmt::Display for LineAndColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line + 1, self.character + 1)
    }
}

/// Offsets of every line start in a source text, for turning byte offsets
/// into line/column pairs. Only `\n` ends a line.
#[derive(Debug, Clone)]
pub struct LineMap {
    starts: Vec<TextPos>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(at, _)| at as TextPos + 1))
            .collect();
        LineMap { starts }
    }

    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        // `starts[0]` is 0, so at least one start is <= pos.
        let line = self.starts.partition_point(|&start| start <= pos).saturating_sub(1);
        LineAndColumn {
            line: line as u32,
            character: pos - self.starts[line],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_bounds() {
        let span = TextSpan::from_bounds(4, 9);
        assert_eq!(span, TextSpan::new(4, 5));
        assert_eq!(span.end(), 9);
        assert_eq!(TextSpan::from_bounds(7, 3).length, 0);
    }

    #[test]
    fn test_range_to_span() {
        assert_eq!(TextRange::new(10, 12).to_span(), TextSpan::new(10, 2));
    }

    #[test]
    fn test_line_and_column() {
        let map = LineMap::new("let a;\n\nfoo(\n  1)");
        let at = |pos| map.line_and_column_of(pos);
        assert_eq!(at(0), LineAndColumn { line: 0, character: 0 });
        assert_eq!(at(6), LineAndColumn { line: 0, character: 6 });
        assert_eq!(at(7), LineAndColumn { line: 1, character: 0 });
        assert_eq!(at(8), LineAndColumn { line: 2, character: 0 });
        assert_eq!(at(15).to_string(), "4,3");
    }

    #[test]
    fn test_offset_past_the_end() {
        let map = LineMap::new("ab\n");
        assert_eq!(map.line_and_column_of(10).to_string(), "2,8");
    }
}
