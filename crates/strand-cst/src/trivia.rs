//! Classification of the text between two tokens.

use text_size::TextRange;

use crate::TokenKind;
use crate::location::{Point, SourceLocation};
use crate::token::Token;

/// Kinds of synthesized trivia.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriviaPieceKind {
    WhiteSpace,
    LineBreak,
}

impl TriviaPieceKind {
    pub fn token_kind(self) -> TokenKind {
        match self {
            Self::WhiteSpace => TokenKind::WhiteSpace,
            Self::LineBreak => TokenKind::LineBreak,
        }
    }
}

/// A trivia fragment borrowed from the classified text.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TriviaPiece<'a> {
    pub kind: TriviaPieceKind,
    pub text: &'a str,
}

impl<'a> TriviaPiece<'a> {
    fn new(kind: TriviaPieceKind, text: &'a str) -> Self {
        Self { kind, text }
    }
}

/// Splits `text` into whitespace runs and single line breaks.
///
/// A pending buffer collects characters until a line break ends it. `\r\n` is
/// one break, a `\r` followed by anything else is a break of its own. The
/// pieces concatenate back to `text`, no `WhiteSpace` piece contains `\r` or
/// `\n`, and every `LineBreak` piece is exactly one of `\n`, `\r`, `\r\n`.
pub fn classify(text: &str) -> Vec<TriviaPiece<'_>> {
    let mut pieces = Vec::new();
    // The buffer is `text[buf_start..idx]`; `pending_cr` means it is exactly "\r".
    let mut buf_start = 0;
    let mut pending_cr = false;

    for (idx, ch) in text.char_indices() {
        match ch {
            '\n' => {
                if pending_cr {
                    // DOS break.
                    pieces.push(TriviaPiece::new(TriviaPieceKind::LineBreak, &text[buf_start..=idx]));
                } else {
                    flush(&mut pieces, &text[buf_start..idx], false);
                    pieces.push(TriviaPiece::new(TriviaPieceKind::LineBreak, &text[idx..=idx]));
                }
                buf_start = idx + 1;
                pending_cr = false;
            }
            '\r' => {
                flush(&mut pieces, &text[buf_start..idx], pending_cr);
                buf_start = idx;
                pending_cr = true;
            }
            _ => {
                if pending_cr {
                    // Mac break.
                    flush(&mut pieces, &text[buf_start..idx], true);
                    buf_start = idx;
                    pending_cr = false;
                }
            }
        }
    }
    flush(&mut pieces, &text[buf_start..], pending_cr);

    pieces
}

/// Emits the pending buffer; a buffer holding a lone `\r` is a line break.
fn flush<'a>(pieces: &mut Vec<TriviaPiece<'a>>, buf: &'a str, pending_cr: bool) {
    if buf.is_empty() {
        return;
    }
    let kind = if pending_cr { TriviaPieceKind::LineBreak } else { TriviaPieceKind::WhiteSpace };
    pieces.push(TriviaPiece::new(kind, buf));
}

/// Classifies `text` into detached trivia tokens laid out from `start`.
pub(crate) fn tokens(text: &str, start: Point) -> impl Iterator<Item = Token> + '_ {
    let mut point = start;
    classify(text).into_iter().map(move |piece| {
        let end = point.advance(piece.text);
        let token = Token::synthesized(
            piece.kind.token_kind(),
            piece.text,
            TextRange::new(point.offset, end.offset),
            SourceLocation::new(point.line_col, end.line_col),
        );
        point = end;
        token
    })
}

#[cfg(test)]
mod tests {
    use expect_test::{Expect, expect};
    use text_size::TextSize;

    use super::*;
    use crate::location::LineCol;

    fn check(text: &str, expect: Expect) {
        let actual = classify(text)
            .iter()
            .map(|piece| format!("{:?}({:?})", piece.kind, piece.text))
            .collect::<Vec<_>>()
            .join(" ");
        expect.assert_eq(&actual);
    }

    #[test]
    fn mac_breaks_around_whitespace() {
        check(
            "\r\r  \t\t  \r",
            expect![[r#"LineBreak("\r") LineBreak("\r") WhiteSpace("  \t\t  ") LineBreak("\r")"#]],
        );
    }

    #[test]
    fn dos_and_unix_breaks() {
        check("\r\n\n", expect![[r#"LineBreak("\r\n") LineBreak("\n")"#]]);
        check("  \n\t", expect![[r#"WhiteSpace("  ") LineBreak("\n") WhiteSpace("\t")"#]]);
        check(" \r\n ", expect![[r#"WhiteSpace(" ") LineBreak("\r\n") WhiteSpace(" ")"#]]);
        check("\n\r", expect![[r#"LineBreak("\n") LineBreak("\r")"#]]);
    }

    #[test]
    fn whitespace_only() {
        check("", expect![[""]]);
        check(" \t\t ", expect![[r#"WhiteSpace(" \t\t ")"#]]);
    }

    #[test]
    fn tokens_continue_from_start_point() {
        let start = Point::new(TextSize::new(5), LineCol::new(2, 3));
        let tokens = tokens(" \r\n\t", start).collect::<Vec<_>>();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].range(), TextRange::new(5.into(), 6.into()));
        assert_eq!(tokens[0].loc(), SourceLocation::new(LineCol::new(2, 3), LineCol::new(2, 4)));
        assert_eq!(tokens[1].kind(), TokenKind::LineBreak);
        assert_eq!(tokens[1].range(), TextRange::new(6.into(), 8.into()));
        assert_eq!(tokens[1].loc(), SourceLocation::new(LineCol::new(2, 4), LineCol::new(3, 0)));
        assert_eq!(tokens[2].loc(), SourceLocation::new(LineCol::new(3, 0), LineCol::new(3, 1)));
    }
}
