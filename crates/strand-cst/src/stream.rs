//! The unified token stream: syntax tokens, comments and synthesized trivia
//! in one doubly linked list that covers the source without gaps.

use std::fmt::{self, Write as _};

use la_arena::Arena;
use text_size::{TextRange, TextSize};

use crate::location::{Point, Shift};
use crate::token::{Token, TokenId};
use crate::{Error, RawComment, RawToken, Result, trivia};

#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    arena: Arena<Token>,
    head: Option<TokenId>,
    tail: Option<TokenId>,
    len: usize,
}

impl TokenStream {
    /// Merges `tokens` and `comments` and fills every gap with trivia.
    ///
    /// Comments are ordered by start offset and placed right after the last
    /// token ending at or before their start. Every range must lie inside
    /// `source`, on char boundaries, after the previous token, and cover
    /// exactly the token's text.
    pub fn build(source: &str, tokens: Vec<RawToken>, comments: Vec<RawComment>) -> Result<Self> {
        let comment_count = comments.len();
        let merged = merge(tokens, comments);

        let mut stream = Self::default();
        let mut prev_end = Point::default();
        for token in merged {
            check_range(source, &token, prev_end.offset)?;
            let gap = &source[TextRange::new(prev_end.offset, token.range.start())];
            for trivia in trivia::tokens(gap, prev_end) {
                stream.push_back(trivia);
            }
            prev_end = Point::new(token.range.end(), token.loc.end);
            stream.push_back(token);
        }
        let rest = &source[usize::from(prev_end.offset)..];
        for trivia in trivia::tokens(rest, prev_end) {
            stream.push_back(trivia);
        }

        tracing::debug!(
            tokens = stream.len,
            comments = comment_count,
            source_len = source.len(),
            "built token stream"
        );
        Ok(stream)
    }

    #[inline]
    pub fn head(&self) -> Option<TokenId> {
        self.head
    }

    #[inline]
    pub fn tail(&self) -> Option<TokenId> {
        self.tail
    }

    /// Number of attached tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Attached tokens from head to tail.
    pub fn iter(&self) -> Tokens<'_> {
        self.range(self.head, self.tail)
    }

    /// Tokens from `first` to `last` inclusive, following `next` links.
    ///
    /// With `last` unset, or not reachable from `first`, the walk runs to the
    /// tail.
    pub fn range(&self, first: Option<TokenId>, last: Option<TokenId>) -> Tokens<'_> {
        Tokens { stream: self, next: first, last }
    }

    /// One line per token: index, kind, range and display text.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        for (_, token) in self.iter() {
            let _ = writeln!(
                out,
                "{} {} {:?} {:?}",
                token.index,
                token.kind,
                token.range,
                token.text()
            );
        }
        out
    }

    fn push_back(&mut self, mut token: Token) -> TokenId {
        token.prev = self.tail;
        token.next = None;
        token.index = self.len as u32;
        let id = self.arena.alloc(token);
        match self.tail {
            Some(tail) => self.arena[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    /// Links `token` right after `anchor`, or at the head when `anchor` is
    /// `None`. Positions are left to the caller.
    pub(crate) fn link_after(&mut self, anchor: Option<TokenId>, mut token: Token) -> TokenId {
        let next = match anchor {
            Some(anchor) => self.arena[anchor].next,
            None => self.head,
        };
        token.prev = anchor;
        token.next = next;
        token.attached = true;
        let id = self.arena.alloc(token);

        match anchor {
            Some(anchor) => self.arena[anchor].next = Some(id),
            None => self.head = Some(id),
        }
        match next {
            Some(next) => self.arena[next].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.len += 1;
        id
    }

    /// Detaches `id`; its former neighbours link directly.
    pub(crate) fn unlink(&mut self, id: TokenId) {
        let (prev, next) = {
            let token = &mut self.arena[id];
            token.attached = false;
            (token.prev.take(), token.next.take())
        };
        match prev {
            Some(prev) => self.arena[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.arena[next].prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Applies `shift` and `index_delta` to `from` and every token after it.
    /// Returns the number of tokens touched.
    pub(crate) fn cascade(&mut self, from: Option<TokenId>, mut shift: Shift, index_delta: i64) -> usize {
        let mut touched = 0;
        let mut cursor = from;
        while let Some(id) = cursor {
            let token = &mut self.arena[id];
            if !shift.is_empty() {
                (token.range, token.loc) = shift.relocate(token.range, token.loc, token.text());
            }
            token.index = (i64::from(token.index) + index_delta).max(0) as u32;
            touched += 1;
            cursor = token.next;
        }
        touched
    }
}

impl std::ops::Index<TokenId> for TokenStream {
    type Output = Token;

    fn index(&self, id: TokenId) -> &Token {
        &self.arena[id]
    }
}

/// Concatenated display text of every attached token.
impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.iter().try_for_each(|(_, token)| f.write_str(token.text()))
    }
}

/// Iterator over a run of linked tokens.
#[derive(Clone)]
pub struct Tokens<'a> {
    stream: &'a TokenStream,
    next: Option<TokenId>,
    last: Option<TokenId>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = (TokenId, &'a Token);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let token = &self.stream.arena[id];
        self.next = if Some(id) == self.last { None } else { token.next };
        Some((id, token))
    }
}

/// Stable merge by start offset; a syntax token wins a tie with a comment.
fn merge(tokens: Vec<RawToken>, mut comments: Vec<RawComment>) -> Vec<Token> {
    comments.sort_by_key(|comment| comment.range.start());

    let mut merged = Vec::with_capacity(tokens.len() + comments.len());
    let mut comments = comments.into_iter().peekable();
    for token in tokens {
        while let Some(comment) =
            comments.next_if(|comment| comment.range.start() < token.range.start())
        {
            merged.push(Token::from_comment(comment));
        }
        merged.push(Token::from_raw(token));
    }
    merged.extend(comments.map(Token::from_comment));
    merged
}

fn check_range(source: &str, token: &Token, prev_end: TextSize) -> Result<()> {
    let range = token.range;
    let (start, end) = (u32::from(range.start()), u32::from(range.end()));
    let what = || format!("{} token {:?}", token.kind, token.text());

    let in_bounds = usize::from(range.end()) <= source.len()
        && source.is_char_boundary(range.start().into())
        && source.is_char_boundary(range.end().into());
    if !in_bounds || range.start() < prev_end {
        return Err(Error::malformed(what(), start, end, source));
    }
    if &source[range] != token.text() {
        return Err(Error::TextMismatch { what: what(), start, end });
    }
    Ok(())
}
