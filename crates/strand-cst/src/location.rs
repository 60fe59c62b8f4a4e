//! Line/column positions and the point arithmetic used by the mutation engine.

use serde::{Deserialize, Serialize};
use text_size::{TextLen, TextRange, TextSize};

/// A line/column pair. Columns count bytes from the start of the line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start and end positions of a token or node.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct SourceLocation {
    pub start: LineCol,
    pub end: LineCol,
}

impl SourceLocation {
    pub const fn new(start: LineCol, end: LineCol) -> Self {
        Self { start, end }
    }
}

/// A byte offset together with its line/column.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Point {
    pub(crate) offset: TextSize,
    pub(crate) line_col: LineCol,
}

impl Point {
    pub(crate) fn new(offset: TextSize, line_col: LineCol) -> Self {
        Self { offset, line_col }
    }

    /// The point reached after `text` is laid out starting at `self`.
    ///
    /// `\r\n`, `\r` and `\n` each count as one line break.
    pub(crate) fn advance(self, text: &str) -> Self {
        let mut line_col = self.line_col;
        let mut bytes = text.bytes().peekable();
        while let Some(byte) = bytes.next() {
            match byte {
                b'\r' => {
                    if bytes.peek() == Some(&b'\n') {
                        bytes.next();
                    }
                    line_col = LineCol::new(line_col.line + 1, 0);
                }
                b'\n' => line_col = LineCol::new(line_col.line + 1, 0),
                _ => line_col.column += 1,
            }
        }
        Self { offset: self.offset + text.text_len(), line_col }
    }
}

/// Position delta produced by replacing the text between `start` and
/// `old_end` with text ending at `new_end`.
///
/// Tokens following the edit are fed to [`Shift::relocate`] in list order.
/// Until one of them crosses a line break they share the edit's end line, so
/// they are laid out again from `new_end`; every token after that break moves
/// by the line delta the break itself moved by.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Shift {
    old_end: Point,
    new_end: Point,
    cursor: LineCol,
    lines: Option<i64>,
}

impl Shift {
    pub(crate) fn new(old_end: Point, new_end: Point) -> Self {
        Self { old_end, new_end, cursor: new_end.line_col, lines: None }
    }

    pub(crate) fn offset(&self, offset: TextSize) -> TextSize {
        let shifted = i64::from(u32::from(offset)) + i64::from(u32::from(self.new_end.offset))
            - i64::from(u32::from(self.old_end.offset));
        TextSize::new(shifted.max(0) as u32)
    }

    /// New range and location of the next token after the edit.
    pub(crate) fn relocate(
        &mut self,
        range: TextRange,
        loc: SourceLocation,
        text: &str,
    ) -> (TextRange, SourceLocation) {
        let range = TextRange::new(self.offset(range.start()), self.offset(range.end()));
        if let Some(lines) = self.lines {
            let shift = |pos: LineCol| {
                LineCol::new((i64::from(pos.line) + lines).max(0) as u32, pos.column)
            };
            return (range, SourceLocation::new(shift(loc.start), shift(loc.end)));
        }

        let start = self.cursor;
        let end = Point::new(range.start(), start).advance(text).line_col;
        self.cursor = end;
        if end.line != start.line {
            self.lines = Some(i64::from(end.line) - i64::from(loc.end.line));
        }
        (range, SourceLocation::new(start, end))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.old_end == self.new_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(offset: u32, line: u32, column: u32) -> Point {
        Point::new(TextSize::new(offset), LineCol::new(line, column))
    }

    #[test]
    fn advance_counts_each_break_style_once() {
        let start = point(10, 3, 4);
        assert_eq!(start.advance("ab"), point(12, 3, 6));
        assert_eq!(start.advance("a\r\nb"), point(14, 4, 1));
        assert_eq!(start.advance("\r\r"), point(12, 5, 0));
        assert_eq!(start.advance("\n\r\n"), point(13, 5, 0));
    }

    fn relocated(
        shift: &mut Shift,
        start: u32,
        text: &str,
        loc: SourceLocation,
    ) -> (TextRange, SourceLocation) {
        shift.relocate(TextRange::at(start.into(), TextSize::of(text)), loc, text)
    }

    fn loc(start: (u32, u32), end: (u32, u32)) -> SourceLocation {
        SourceLocation::new(LineCol::new(start.0, start.1), LineCol::new(end.0, end.1))
    }

    #[test]
    fn insertion_shift() {
        // "ab|cd\ne" with "X\nYZ" inserted at the bar.
        let at = point(2, 1, 2);
        let mut shift = Shift::new(at, at.advance("X\nYZ"));

        let cd = relocated(&mut shift, 2, "cd", loc((1, 2), (1, 4)));
        assert_eq!(cd, (TextRange::new(6.into(), 8.into()), loc((2, 2), (2, 4))));
        let newline = relocated(&mut shift, 4, "\n", loc((1, 4), (2, 0)));
        assert_eq!(newline, (TextRange::new(8.into(), 9.into()), loc((2, 4), (3, 0))));
        let e = relocated(&mut shift, 5, "e", loc((2, 0), (2, 1)));
        assert_eq!(e, (TextRange::new(9.into(), 10.into()), loc((3, 0), (3, 1))));
    }

    #[test]
    fn removal_shift() {
        // " \na" with the line break removed.
        let start = point(1, 0, 1);
        let mut shift = Shift::new(start.advance("\n"), start);

        let a = relocated(&mut shift, 2, "a", loc((1, 0), (1, 1)));
        assert_eq!(a, (TextRange::new(1.into(), 2.into()), loc((0, 1), (0, 2))));
        assert!(!shift.is_empty());
    }

    #[test]
    fn lines_keep_their_own_numbering() {
        // Leading trivia counts from line 0 while the tokens after it carry
        // 1-based lines; the first line is re-laid, later ones only shift.
        let start = Point::default();
        let mut shift = Shift::new(start.advance("  "), start);

        let a = relocated(&mut shift, 2, "a", loc((1, 2), (1, 3)));
        assert_eq!(a.1, loc((0, 0), (0, 1)));
        let comment = relocated(&mut shift, 3, "/*\n*/", loc((1, 3), (2, 2)));
        assert_eq!(comment.1, loc((0, 1), (1, 2)));
        let b = relocated(&mut shift, 8, "b", loc((2, 2), (2, 3)));
        assert_eq!(b.1, loc((1, 2), (1, 3)));
    }
}
