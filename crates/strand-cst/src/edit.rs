//! Mutation: token splices over the stream and node replacements over the
//! original source.
//!
//! The two models are independent. A replacement never touches the token
//! list, and a splice never changes what [`SyntaxTree::source`] renders. Using
//! both over the same region of the original source is an
//! [`Error::EditConflict`].

use text_size::{TextRange, TextSize};

use crate::index::NodeId;
use crate::location::{Point, Shift, SourceLocation};
use crate::token::{NewToken, TokenId};
use crate::{Error, Result, SyntaxTree};

/// Pending text replacements keyed by original range, sorted and disjoint.
#[derive(Debug, Clone, Default)]
pub(crate) struct Replacements {
    edits: Vec<Replacement>,
}

#[derive(Debug, Clone)]
struct Replacement {
    range: TextRange,
    text: String,
}

impl Replacements {
    /// Records `text` for `range`.
    ///
    /// A replacement of the same range overwrites the previous one and a
    /// replacement containing earlier ones supersedes them. Landing inside or
    /// across an earlier replacement is a conflict.
    pub(crate) fn insert(&mut self, range: TextRange, text: String) -> Result<()> {
        if let Some(edit) = self.edits.iter_mut().find(|edit| edit.range == range) {
            edit.text = text;
            return Ok(());
        }
        let mut superseded = Vec::new();
        for (idx, edit) in self.edits.iter().enumerate() {
            if range.contains_range(edit.range) {
                superseded.push(idx);
            } else if edit.range.contains_range(range) || overlaps(edit.range, range) {
                return Err(Error::EditConflict { range });
            }
        }
        for idx in superseded.into_iter().rev() {
            self.edits.remove(idx);
        }
        let at = self.edits.partition_point(|edit| {
            (edit.range.start(), edit.range.end()) <= (range.start(), range.end())
        });
        self.edits.insert(at, Replacement { range, text });
        Ok(())
    }

    pub(crate) fn touches(&self, range: TextRange) -> bool {
        self.edits.iter().any(|edit| touches(edit.range, range))
    }

    /// Renders `source[range]` with every replacement applied.
    ///
    /// A replacement starting inside `range` is emitted whole; bytes of
    /// `range` covered by a replacement that starts before it are dropped.
    pub(crate) fn render(&self, source: &str, range: TextRange) -> String {
        let mut out = String::with_capacity(range.len().into());
        let mut cursor = range.start();
        for edit in &self.edits {
            let (start, end) = (edit.range.start(), edit.range.end());
            let belongs = if edit.range.is_empty() {
                range.start() <= start && start <= range.end()
            } else {
                start < range.end() && range.start() < end
            };
            if !belongs {
                continue;
            }
            if start >= cursor {
                out.push_str(&source[TextRange::new(cursor, start)]);
                out.push_str(&edit.text);
            }
            cursor = cursor.max(end.min(range.end()));
        }
        out.push_str(&source[TextRange::new(cursor, range.end())]);
        out
    }
}

fn overlaps(a: TextRange, b: TextRange) -> bool {
    a.start() < b.end() && b.start() < a.end()
}

/// Whether two edits of the original source interfere. An empty range is an
/// insertion point; it touches a range only strictly inside it.
fn touches(a: TextRange, b: TextRange) -> bool {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => false,
        (true, false) => b.start() < a.start() && a.start() < b.end(),
        (false, true) => a.start() < b.start() && b.start() < a.end(),
        (false, false) => overlaps(a, b),
    }
}

#[derive(Clone, Copy)]
enum Side {
    Before,
    After,
}

impl SyntaxTree {
    /// Splices `token` in right before `target` and shifts every token from
    /// `target` on by the inserted text.
    pub fn insert_before(&mut self, target: TokenId, token: NewToken) -> Result<TokenId> {
        self.insert(target, token, Side::Before)
    }

    /// Splices `token` in right after `target` and shifts every following
    /// token by the inserted text.
    pub fn insert_after(&mut self, target: TokenId, token: NewToken) -> Result<TokenId> {
        self.insert(target, token, Side::After)
    }

    fn insert(&mut self, target: TokenId, token: NewToken, side: Side) -> Result<TokenId> {
        let target_token = &self.tokens[target];
        if !target_token.is_attached() {
            return Err(Error::DetachedToken);
        }
        let text = token.validate()?;

        let (at, anchor, origin) = match side {
            Side::Before => (
                Point::new(target_token.range.start(), target_token.loc.start),
                target_token.prev,
                TextRange::empty(self.origin_start(target)),
            ),
            Side::After => (
                Point::new(target_token.range.end(), target_token.loc.end),
                Some(target),
                TextRange::empty(self.origin_end(target)),
            ),
        };
        let index = match side {
            Side::Before => target_token.index,
            Side::After => target_token.index + 1,
        };
        self.check_splice(origin)?;

        let end = at.advance(text);
        let mut token = token.into_token(
            TextRange::new(at.offset, end.offset),
            SourceLocation::new(at.line_col, end.line_col),
        );
        token.index = index;
        let id = self.tokens.link_after(anchor, token);
        let next = self.tokens[id].next;
        let cascaded = self.tokens.cascade(next, Shift::new(at, end), 1);

        self.spliced.push(origin);
        self.rebind_root();
        tracing::trace!(
            offset = u32::from(at.offset),
            len = u32::from(end.offset - at.offset),
            cascaded,
            "inserted token"
        );
        Ok(id)
    }

    /// Unlinks `target` and shifts every following token back by its text.
    ///
    /// Nodes bound to the token move to its neighbour inside them; a node
    /// whose only token it was no longer covers any token.
    pub fn remove(&mut self, target: TokenId) -> Result<()> {
        let token = &self.tokens[target];
        if !token.is_attached() {
            return Err(Error::DetachedToken);
        }
        let start = Point::new(token.range.start(), token.loc.start);
        let end = Point::new(token.range.end(), token.loc.end);
        let (prev, next) = (token.prev, token.next);
        let origin = match token.origin {
            Some(origin) => origin,
            None => TextRange::empty(self.origin_start(target)),
        };
        self.check_splice(origin)?;

        self.tokens.unlink(target);
        let cascaded = self.tokens.cascade(next, Shift::new(end, start), -1);

        for (_, node) in self.nodes.iter_mut() {
            let Some((first, last)) = node.span else { continue };
            node.span = match (first == target, last == target) {
                (true, true) => None,
                (true, false) => next.map(|next| (next, last)),
                (false, true) => prev.map(|prev| (first, prev)),
                (false, false) => continue,
            };
        }
        self.spliced.push(origin);
        self.rebind_root();
        tracing::trace!(
            offset = u32::from(start.offset),
            len = u32::from(end.offset - start.offset),
            cascaded,
            "removed token"
        );
        Ok(())
    }

    /// Replaces the text of `node`'s original range.
    ///
    /// The replacement shows up in [`SyntaxTree::source`] and
    /// [`SyntaxNode::source`](crate::SyntaxNode::source) of every node around
    /// it; the token list is left alone.
    pub fn update(&mut self, node: NodeId, text: impl Into<String>) -> Result<()> {
        let range = self.nodes[node].range;
        if self.spliced.iter().any(|&spliced| touches(spliced, range)) {
            return Err(Error::EditConflict { range });
        }
        let text = text.into();
        tracing::trace!(?range, len = text.len(), "replaced node text");
        self.edits.insert(range, text)
    }

    fn check_splice(&self, origin: TextRange) -> Result<()> {
        if self.edits.touches(origin) {
            return Err(Error::EditConflict { range: origin });
        }
        Ok(())
    }

    /// Start of `id` in the original source, or the end of the nearest
    /// original token before a spliced one.
    fn origin_start(&self, id: TokenId) -> TextSize {
        let token = &self.tokens[id];
        match token.origin {
            Some(origin) => origin.start(),
            None => token.prev.map_or(TextSize::new(0), |prev| self.origin_end(prev)),
        }
    }

    fn origin_end(&self, id: TokenId) -> TextSize {
        let mut cursor = Some(id);
        while let Some(id) = cursor {
            let token = &self.tokens[id];
            if let Some(origin) = token.origin {
                return origin.end();
            }
            cursor = token.prev;
        }
        TextSize::new(0)
    }

    fn rebind_root(&mut self) {
        let span = self.tokens.head().zip(self.tokens.tail());
        self.nodes[self.root].span = span;
    }
}
