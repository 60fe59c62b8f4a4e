use std::str::Chars;

use strand_cst::LineCol;
use text_size::{TextLen, TextSize};

pub(crate) const EOF_CHAR: char = '\0';

/// A byte offset with its 1-based line and 0-based byte column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Pos {
    pub(crate) offset: TextSize,
    pub(crate) line_col: LineCol,
}

impl Pos {
    pub(crate) const START: Self = Self { offset: TextSize::new(0), line_col: LineCol::new(1, 0) };
}

pub(crate) struct Cursor<'a> {
    chars: Chars<'a>,
    len: TextSize,
    pos: Pos,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { chars: text.chars(), len: text.text_len(), pos: Pos::START }
    }

    pub(crate) fn pos(&self) -> Pos {
        self.pos
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos.offset == self.len
    }

    pub(crate) fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn second(&self) -> char {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn rest(&self) -> &'a str {
        self.chars.as_str()
    }

    /// Consumes one char. `\r\n` moves to the next line once, on the `\n`.
    pub(crate) fn advance(&mut self) -> char {
        let Some(c) = self.chars.next() else { return EOF_CHAR };
        self.pos.offset += c.text_len();
        match c {
            '\n' => self.pos.line_col = LineCol::new(self.pos.line_col.line + 1, 0),
            '\r' if self.peek() != '\n' => {
                self.pos.line_col = LineCol::new(self.pos.line_col.line + 1, 0);
            }
            _ => self.pos.line_col.column += c.len_utf8() as u32,
        }
        c
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
    }
}
