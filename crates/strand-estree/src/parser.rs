use drop_bomb::DropBomb;
use serde_json::{Map, Value, json};
use strand_cst::{ParseError, RawToken, SourceLocation, TokenKind};
use text_size::TextRange;

use crate::cursor::Pos;
use crate::tokenizer::Lexeme;

/// Token-level parser state. The first error ends the parse: the parser
/// jumps to the end of input so every open production unwinds and completes.
pub(crate) struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Lexeme>,
    pos: usize,
    last_end: Pos,
    end: Pos,
    error: Option<ParseError>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(text: &'a str, tokens: Vec<Lexeme>, end: Pos) -> Self {
        Self { text, tokens, pos: 0, last_end: Pos::START, end, error: None }
    }

    fn current(&self) -> Option<&Lexeme> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn kind(&self) -> Option<TokenKind> {
        self.current().map(|token| token.kind)
    }

    /// Text of the current token when it is a keyword or a punctuator.
    pub(crate) fn syntax(&self) -> Option<&'a str> {
        let token = self.current()?;
        match token.kind {
            TokenKind::Keyword | TokenKind::Punctuator => Some(&self.text[token.range]),
            _ => None,
        }
    }

    pub(crate) fn at(&self, text: &str) -> bool {
        self.syntax() == Some(text)
    }

    pub(crate) fn at_any(&self, texts: &[&str]) -> bool {
        self.syntax().is_some_and(|syntax| texts.contains(&syntax))
    }

    pub(crate) fn newline_before(&self) -> bool {
        self.current().is_some_and(|token| token.newline_before)
    }

    /// Start of the current token, or the end of input.
    pub(crate) fn position(&self) -> Pos {
        self.current().map_or(self.end, |token| token.start)
    }

    /// Consumes the current token and returns its text.
    pub(crate) fn advance(&mut self) -> &'a str {
        let Some(token) = self.tokens.get(self.pos) else { return "" };
        self.last_end = token.end;
        self.pos += 1;
        &self.text[token.range]
    }

    pub(crate) fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, text: &str) {
        if !self.eat(text) {
            self.error_unexpected();
        }
    }

    /// Reports the current token as unexpected and stops parsing.
    pub(crate) fn error_unexpected(&mut self) {
        if self.error.is_none() {
            let error = match self.current() {
                Some(token) => {
                    let text = &self.text[token.range];
                    let message = match token.kind {
                        TokenKind::Identifier => "Unexpected identifier".to_owned(),
                        TokenKind::Numeric => "Unexpected number".to_owned(),
                        TokenKind::String => "Unexpected string".to_owned(),
                        _ => format!("Unexpected token {text}"),
                    };
                    ParseError::new(message, token.range, token.start.line_col)
                }
                None => ParseError::new(
                    "Unexpected end of input",
                    TextRange::empty(self.end.offset),
                    self.end.line_col,
                ),
            };
            self.error = Some(error);
        }
        self.pos = self.tokens.len();
    }

    pub(crate) fn start(&self) -> Marker {
        Marker::new(self.position())
    }

    /// The consumed tokens, or the first error.
    pub(crate) fn finish(self) -> Result<Vec<RawToken>, ParseError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let text = self.text;
        Ok(self
            .tokens
            .into_iter()
            .map(|token| RawToken {
                kind: token.kind,
                value: text[token.range].to_owned(),
                range: token.range,
                loc: SourceLocation::new(token.start.line_col, token.end.line_col),
            })
            .collect())
    }
}

pub(crate) struct Marker {
    start: Pos,
    bomb: DropBomb,
}

impl Marker {
    fn new(start: Pos) -> Self {
        Self { start, bomb: DropBomb::new("Marker must be completed") }
    }

    /// Builds the node from the marker to the last consumed token. Fields
    /// keep the order given.
    pub(crate) fn complete(
        mut self,
        p: &Parser<'_>,
        kind: &str,
        fields: Vec<(&str, Value)>,
    ) -> CompletedMarker {
        self.bomb.defuse();

        let start = self.start;
        let end = if p.last_end.offset < start.offset { start } else { p.last_end };

        let mut node = Map::new();
        node.insert("type".to_owned(), kind.into());
        for (field, value) in fields {
            node.insert(field.to_owned(), value);
        }
        node.insert("range".to_owned(), json!([u32::from(start.offset), u32::from(end.offset)]));
        node.insert(
            "loc".to_owned(),
            json!({
                "start": { "line": start.line_col.line, "column": start.line_col.column },
                "end": { "line": end.line_col.line, "column": end.line_col.column },
            }),
        );
        CompletedMarker { start, node: Value::Object(node) }
    }
}

pub(crate) struct CompletedMarker {
    start: Pos,
    node: Value,
}

impl CompletedMarker {
    /// Placeholder after an error; never reaches the output.
    pub(crate) fn missing(p: &Parser<'_>) -> Self {
        Self { start: p.position(), node: Value::Null }
    }

    /// A marker starting where this node starts, for a node wrapping it.
    pub(crate) fn precede(&self) -> Marker {
        Marker::new(self.start)
    }

    /// Moves the start used by [`precede`](Self::precede) to an enclosing
    /// parenthesis. The node keeps its own range.
    pub(crate) fn parenthesized(self, start: Pos) -> Self {
        Self { start, ..self }
    }

    pub(crate) fn into_node(self) -> Value {
        self.node
    }
}
