//! Tokens of the unified stream.

use la_arena::Idx;
use text_size::{TextRange, TextSize};

use crate::location::{Point, SourceLocation};
use crate::{CommentKind, Error, RawComment, RawToken, Result, TokenKind};

/// Handle of a token in its [`TokenStream`](crate::TokenStream).
pub type TokenId = Idx<Token>;

/// One token of the stream: a syntax token, a comment, or synthesized trivia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) value: String,
    /// Literal source form, comments only.
    pub(crate) raw: Option<String>,
    pub(crate) range: TextRange,
    pub(crate) loc: SourceLocation,
    pub(crate) prev: Option<TokenId>,
    pub(crate) next: Option<TokenId>,
    pub(crate) index: u32,
    /// Range in the original source; `None` for tokens spliced in later.
    pub(crate) origin: Option<TextRange>,
    pub(crate) attached: bool,
}

impl Token {
    pub(crate) fn synthesized(
        kind: TokenKind,
        value: &str,
        range: TextRange,
        loc: SourceLocation,
    ) -> Self {
        Self {
            kind,
            value: value.to_owned(),
            raw: None,
            range,
            loc,
            prev: None,
            next: None,
            index: 0,
            origin: Some(range),
            attached: true,
        }
    }

    pub(crate) fn from_raw(token: RawToken) -> Self {
        let RawToken { kind, value, range, loc } = token;
        Self {
            kind,
            value,
            raw: None,
            range,
            loc,
            prev: None,
            next: None,
            index: 0,
            origin: Some(range),
            attached: true,
        }
    }

    pub(crate) fn from_comment(comment: RawComment) -> Self {
        let RawComment { kind, value, range, loc } = comment;
        Self {
            kind: kind.token_kind(),
            raw: Some(kind.raw(&value)),
            value,
            range,
            loc,
            prev: None,
            next: None,
            index: 0,
            origin: Some(range),
            attached: true,
        }
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// The display form: `raw` for comments, `value` otherwise.
    #[inline]
    pub fn text(&self) -> &str {
        self.raw.as_deref().unwrap_or(&self.value)
    }

    /// Current range; shifted by edits earlier in the stream.
    #[inline]
    pub fn range(&self) -> TextRange {
        self.range
    }

    #[inline]
    pub fn loc(&self) -> SourceLocation {
        self.loc
    }

    #[inline]
    pub fn prev(&self) -> Option<TokenId> {
        self.prev
    }

    #[inline]
    pub fn next(&self) -> Option<TokenId> {
        self.next
    }

    /// Position in the stream.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Range this token covered when the tree was built.
    #[inline]
    pub fn origin(&self) -> Option<TextRange> {
        self.origin
    }

    /// `false` once the token has been removed.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// A token to splice into an existing stream.
///
/// `range` and `loc` are required: they must describe the token as laid out
/// somewhere (only the length of `range` is checked against the text). The
/// token is re-seated at the edit point when inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewToken {
    pub kind: TokenKind,
    pub value: String,
    pub raw: Option<String>,
    pub range: Option<TextRange>,
    pub loc: Option<SourceLocation>,
}

impl NewToken {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self { kind, value: value.into(), raw: None, range: None, loc: None }
    }

    /// A token laid out on its own at offset 0, line 0, column 0.
    pub fn laid_out(kind: TokenKind, value: impl Into<String>) -> Self {
        let value = value.into();
        let raw = match kind {
            TokenKind::LineComment => Some(CommentKind::Line.raw(&value)),
            TokenKind::BlockComment => Some(CommentKind::Block.raw(&value)),
            _ => None,
        };
        let text = raw.as_deref().unwrap_or(&value);
        let end = Point::default().advance(text);
        Self {
            kind,
            range: Some(TextRange::up_to(end.offset)),
            loc: Some(SourceLocation::new(Default::default(), end.line_col)),
            value,
            raw,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_loc(mut self, loc: SourceLocation) -> Self {
        self.loc = Some(loc);
        self
    }

    /// Checks the token and returns its display text.
    pub(crate) fn validate(&self) -> Result<&str> {
        let invalid = |reason: String| Err(Error::InvalidToken { reason });
        let Some(range) = self.range else {
            return invalid(format!("`{}` token has no range", self.kind));
        };
        if self.loc.is_none() {
            return invalid(format!("`{}` token has no loc", self.kind));
        }
        if self.raw.is_some() && !self.kind.is_comment() {
            return invalid(format!("only comments carry `raw`, got a `{}` token", self.kind));
        }
        if self.kind.is_comment() && self.raw.is_none() {
            return invalid(format!("`{}` token has no raw form", self.kind));
        }
        let text = self.raw.as_deref().unwrap_or(&self.value);
        if range.len() != TextSize::of(text) {
            return invalid(format!(
                "range {range:?} does not fit the {} bytes of {text:?}",
                text.len()
            ));
        }
        Ok(text)
    }

    pub(crate) fn into_token(self, range: TextRange, loc: SourceLocation) -> Token {
        Token {
            kind: self.kind,
            value: self.value,
            raw: self.raw,
            range,
            loc,
            prev: None,
            next: None,
            index: 0,
            origin: None,
            attached: true,
        }
    }
}

impl From<RawToken> for NewToken {
    fn from(token: RawToken) -> Self {
        Self {
            kind: token.kind,
            value: token.value,
            raw: None,
            range: Some(token.range),
            loc: Some(token.loc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LineCol;

    #[test]
    fn missing_fields_are_rejected() {
        let err = NewToken::new(TokenKind::Identifier, "foo").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidToken { .. }), "{err}");

        let err = NewToken::new(TokenKind::Identifier, "foo")
            .with_range(TextRange::up_to(3.into()))
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid token: `Identifier` token has no loc");
    }

    #[test]
    fn range_must_fit_text() {
        let loc = SourceLocation::new(LineCol::new(1, 0), LineCol::new(1, 2));
        let err = NewToken::new(TokenKind::Identifier, "foo")
            .with_range(TextRange::up_to(2.into()))
            .with_loc(loc)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("does not fit"), "{err}");
    }

    #[test]
    fn laid_out_tokens_are_valid() {
        let token = NewToken::laid_out(TokenKind::LineComment, " hi");
        assert_eq!(token.validate().unwrap(), "// hi");

        let token = NewToken::laid_out(TokenKind::LineBreak, "\r\n");
        assert_eq!(token.loc.unwrap().end, LineCol::new(1, 0));
        assert_eq!(token.validate().unwrap(), "\r\n");
    }
}
