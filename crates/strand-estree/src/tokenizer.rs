use strand_cst::{CommentKind, ParseError, RawComment, SourceLocation, TokenKind};
use text_size::TextRange;

use crate::cursor::{Cursor, Pos};

const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "finally", "for", "function", "if", "import", "in", "instanceof",
    "let", "new", "return", "super", "switch", "this", "throw", "try", "typeof", "var", "void",
    "while", "with",
];

/// Longest first.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==", "!=",
    "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
    "<<", ">>", "**", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-", "*", "/", "%",
    "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

#[derive(Debug, Clone)]
pub(crate) struct Lexeme {
    pub(crate) kind: TokenKind,
    pub(crate) range: TextRange,
    pub(crate) start: Pos,
    pub(crate) end: Pos,
    /// A line break separates this token from the previous one.
    pub(crate) newline_before: bool,
}

pub(crate) struct Tokenized {
    pub(crate) tokens: Vec<Lexeme>,
    pub(crate) comments: Vec<RawComment>,
    pub(crate) end: Pos,
}

pub(crate) fn tokenize(text: &str) -> Result<Tokenized, ParseError> {
    Tokenizer { text, cursor: Cursor::new(text), tokens: Vec::new(), comments: Vec::new() }.run()
}

struct Tokenizer<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    tokens: Vec<Lexeme>,
    comments: Vec<RawComment>,
}

impl Tokenizer<'_> {
    fn run(mut self) -> Result<Tokenized, ParseError> {
        loop {
            let newline_before = self.trivia()?;
            if self.cursor.is_eof() {
                break;
            }
            let start = self.cursor.pos();
            let kind = self.token(start)?;
            let end = self.cursor.pos();
            self.tokens.push(Lexeme {
                kind,
                range: TextRange::new(start.offset, end.offset),
                start,
                end,
                newline_before,
            });
        }
        Ok(Tokenized { tokens: self.tokens, comments: self.comments, end: self.cursor.pos() })
    }

    /// Skips whitespace and collects comments. Returns whether a line break
    /// was crossed.
    fn trivia(&mut self) -> Result<bool, ParseError> {
        let mut newline = false;
        loop {
            match self.cursor.peek() {
                '\n' | '\r' => {
                    newline = true;
                    self.cursor.advance();
                }
                '/' if self.cursor.second() == '/' => {
                    let start = self.cursor.pos();
                    self.cursor.advance_while(|c| c != '\n' && c != '\r');
                    self.comment(CommentKind::Line, start);
                }
                '/' if self.cursor.second() == '*' => {
                    let start = self.cursor.pos();
                    self.cursor.advance();
                    self.cursor.advance();
                    while !self.cursor.rest().starts_with("*/") {
                        if self.cursor.is_eof() {
                            return Err(illegal(start, self.cursor.pos()));
                        }
                        if matches!(self.cursor.advance(), '\n' | '\r') {
                            newline = true;
                        }
                    }
                    self.cursor.advance();
                    self.cursor.advance();
                    self.comment(CommentKind::Block, start);
                }
                c if c.is_whitespace() => {
                    self.cursor.advance();
                }
                _ => return Ok(newline),
            }
        }
    }

    fn comment(&mut self, kind: CommentKind, start: Pos) {
        let end = self.cursor.pos();
        let range = TextRange::new(start.offset, end.offset);
        let text = &self.text[range];
        let value = match kind {
            CommentKind::Line => &text[2..],
            CommentKind::Block => &text[2..text.len() - 2],
        };
        self.comments.push(RawComment {
            kind,
            value: value.to_owned(),
            range,
            loc: SourceLocation::new(start.line_col, end.line_col),
        });
    }

    fn token(&mut self, start: Pos) -> Result<TokenKind, ParseError> {
        let kind = match self.cursor.peek() {
            c if is_ident_start(c) => {
                self.cursor.advance_while(is_ident_continue);
                match &self.text[TextRange::new(start.offset, self.cursor.pos().offset)] {
                    "true" | "false" => TokenKind::Boolean,
                    "null" => TokenKind::Null,
                    word if KEYWORDS.contains(&word) => TokenKind::Keyword,
                    _ => TokenKind::Identifier,
                }
            }
            '0'..='9' => self.number(start)?,
            '.' if self.cursor.second().is_ascii_digit() => self.number(start)?,
            quote @ ('"' | '\'') => self.string(start, quote)?,
            _ => {
                let rest = self.cursor.rest();
                let Some(punctuator) = PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) else {
                    self.cursor.advance();
                    return Err(illegal(start, self.cursor.pos()));
                };
                for _ in 0..punctuator.len() {
                    self.cursor.advance();
                }
                TokenKind::Punctuator
            }
        };
        Ok(kind)
    }

    fn number(&mut self, start: Pos) -> Result<TokenKind, ParseError> {
        if self.cursor.peek() == '0' && matches!(self.cursor.second(), 'x' | 'X') {
            self.cursor.advance();
            self.cursor.advance();
            self.cursor.advance_while(|c| c.is_ascii_hexdigit());
        } else {
            self.cursor.advance_while(|c| c.is_ascii_digit());
            if self.cursor.peek() == '.' {
                self.cursor.advance();
                self.cursor.advance_while(|c| c.is_ascii_digit());
            }
            if matches!(self.cursor.peek(), 'e' | 'E') {
                self.cursor.advance();
                if matches!(self.cursor.peek(), '+' | '-') {
                    self.cursor.advance();
                }
                self.cursor.advance_while(|c| c.is_ascii_digit());
            }
        }
        if is_ident_start(self.cursor.peek()) {
            self.cursor.advance();
            return Err(illegal(start, self.cursor.pos()));
        }
        Ok(TokenKind::Numeric)
    }

    fn string(&mut self, start: Pos, quote: char) -> Result<TokenKind, ParseError> {
        self.cursor.advance();
        loop {
            if self.cursor.is_eof() {
                return Err(illegal(start, self.cursor.pos()));
            }
            match self.cursor.advance() {
                c if c == quote => return Ok(TokenKind::String),
                '\\' => {
                    if self.cursor.advance() == '\r' && self.cursor.peek() == '\n' {
                        self.cursor.advance();
                    }
                }
                '\n' | '\r' => return Err(illegal(start, self.cursor.pos())),
                _ => {}
            }
        }
    }
}

fn illegal(start: Pos, end: Pos) -> ParseError {
    ParseError::new("Unexpected token ILLEGAL", TextRange::new(start.offset, end.offset), start.line_col)
}

fn is_ident_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_alphanumeric()
}

/// Cooked value of a string literal, quotes included in `raw`.
pub(crate) fn unescape(raw: &str) -> String {
    let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else { break };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' | 'u' => {
                let digits = if escaped == 'x' { 2 } else { 4 };
                let hex: String = chars.by_ref().take(digits).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(c) => out.push(c),
                    None => {
                        out.push(escaped);
                        out.push_str(&hex);
                    }
                }
            }
            // Line continuation.
            '\r' => {
                chars.next_if_eq(&'\n');
            }
            '\n' => {}
            other => out.push(other),
        }
    }
    out
}

/// The JSON value of a numeric literal: an integer when it is one.
pub(crate) fn number_value(raw: &str) -> serde_json::Value {
    let value = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).map_or(f64::NAN, |value| value as f64),
        None => raw.parse::<f64>().unwrap_or(f64::NAN),
    };
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        serde_json::Value::from(value as i64)
    } else {
        serde_json::Value::from(value)
    }
}

#[cfg(test)]
mod tests {
    use expect_test::{Expect, expect};
    use strand_cst::LineCol;
    use text_size::TextSize;

    use super::*;

    fn check(text: &str, expect: Expect) {
        let Tokenized { tokens, comments, .. } = tokenize(text).unwrap();
        let mut actual = tokens
            .iter()
            .map(|token| format!("{:?} {:?}", token.kind, &text[token.range]))
            .collect::<Vec<_>>();
        actual.extend(comments.iter().map(|comment| format!("{:?} {:?}", comment.kind, comment.value)));
        expect.assert_eq(&actual.join("\n"));
    }

    #[test]
    fn words_and_literals() {
        check(
            "var x = null || true; return 'a\\'b' + 0x1f + .5e-3",
            expect![[r#"
                Keyword "var"
                Identifier "x"
                Punctuator "="
                Null "null"
                Punctuator "||"
                Boolean "true"
                Punctuator ";"
                Keyword "return"
                String "'a\\'b'"
                Punctuator "+"
                Numeric "0x1f"
                Punctuator "+"
                Numeric ".5e-3""#]],
        );
    }

    #[test]
    fn longest_punctuator_wins() {
        check(
            "a >>>= b !== c?.d",
            expect![[r#"
                Identifier "a"
                Punctuator ">>>="
                Identifier "b"
                Punctuator "!=="
                Identifier "c"
                Punctuator "?."
                Identifier "d""#]],
        );
    }

    #[test]
    fn comments_are_collected_apart() {
        check(
            "//foo\n(x /* y */)\n//bar",
            expect![[r#"
                Punctuator "("
                Identifier "x"
                Punctuator ")"
                Line "foo"
                Block " y "
                Line "bar""#]],
        );
    }

    #[test]
    fn newline_before_is_tracked() {
        let Tokenized { tokens, .. } = tokenize("a\r\nb /*\n*/ c d").unwrap();
        let flags = tokens.iter().map(|token| token.newline_before).collect::<Vec<_>>();
        assert_eq!(flags, [false, true, true, false]);
        assert_eq!(tokens[1].start.line_col, LineCol::new(2, 0));
    }

    #[test]
    fn illegal_input() {
        let err = tokenize("a = 'open").err().unwrap();
        assert_eq!(err.message, "Unexpected token ILLEGAL");
        assert_eq!(err.range, TextRange::new(TextSize::new(4), TextSize::new(9)));

        let err = tokenize("x /* never closed").err().unwrap();
        assert_eq!(err.loc, LineCol::new(1, 2));

        assert!(tokenize("a # b").is_err());
        assert!(tokenize("3in").is_err());
    }

    #[test]
    fn literal_values() {
        assert_eq!(unescape(r#""a\nb\x41B\\""#), "a\nbAB\\");
        assert_eq!(unescape("'it\\'s'"), "it's");
        assert_eq!(number_value("123"), serde_json::json!(123));
        assert_eq!(number_value("1.5"), serde_json::json!(1.5));
        assert_eq!(number_value("0x1f"), serde_json::json!(31));
        assert_eq!(number_value("1e3"), serde_json::json!(1000));
    }
}
