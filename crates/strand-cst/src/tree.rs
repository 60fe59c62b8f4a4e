//! The indexed tree and its node and token handles.

use std::fmt::{self, Write as _};

use la_arena::Arena;
use serde_json::Value;
use text_size::{TextRange, TextSize};

use crate::edit::Replacements;
use crate::index::{self, Indexed, NodeData, NodeId};
use crate::location::SourceLocation;
use crate::options::IndexOptions;
use crate::stream::TokenStream;
use crate::token::{Token, TokenId};
use crate::{Parse, ParseOutput, Result, TokenKind};

/// A lossless tree over one source text.
///
/// The tree owns the source, the token stream and the node arena. Token
/// splices change the stream; node replacements are kept as pending edits
/// over the original source.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) source: Box<str>,
    pub(crate) tokens: TokenStream,
    pub(crate) nodes: Arena<NodeData>,
    pub(crate) root: NodeId,
    pub(crate) edits: Replacements,
    /// Original ranges touched by token splices.
    pub(crate) spliced: Vec<TextRange>,
}

impl SyntaxTree {
    /// Parses `source` and indexes the result with default options.
    pub fn parse(parser: &impl Parse, source: &str) -> Result<Self> {
        Self::parse_with(parser, source, &IndexOptions::default())
    }

    pub fn parse_with(parser: &impl Parse, source: &str, options: &IndexOptions) -> Result<Self> {
        let output = parser.parse(source)?;
        Self::build(source, output, options)
    }

    /// Builds the token stream and indexes the AST of an existing parse.
    pub fn build(source: &str, output: ParseOutput, options: &IndexOptions) -> Result<Self> {
        let ParseOutput { ast, tokens, comments } = output;
        let tokens = TokenStream::build(source, tokens, comments)?;
        let Indexed { nodes, root } = index::index(source, &tokens, ast, options)?;
        Ok(Self {
            source: source.into(),
            tokens,
            nodes,
            root,
            edits: Replacements::default(),
            spliced: Vec::new(),
        })
    }

    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        self.node(self.root)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, id }
    }

    #[inline]
    pub fn token(&self, id: TokenId) -> SyntaxToken<'_> {
        SyntaxToken { tree: self, id }
    }

    /// Every node in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = SyntaxNode<'_>> + '_ {
        self.nodes.iter().map(|(id, _)| self.node(id))
    }

    /// The whole token list, head to tail.
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken<'_>> + '_ {
        self.tokens.iter().map(|(id, _)| self.token(id))
    }

    #[inline]
    pub fn stream(&self) -> &TokenStream {
        &self.tokens
    }

    /// The source the tree was built from, without any edits.
    #[inline]
    pub fn original_source(&self) -> &str {
        &self.source
    }

    /// The original source with pending node replacements applied.
    pub fn source(&self) -> String {
        self.edits.render(&self.source, TextRange::up_to(TextSize::of(&*self.source)))
    }

    /// Concatenated text of the token stream, token splices included.
    pub fn text(&self) -> String {
        self.tokens.to_string()
    }

    /// Indented dump of every node: field, kind, range and text.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        for node in self.nodes() {
            let indent = "  ".repeat(node.depth() as usize);
            let field = node.field().map(|field| format!("{field}: ")).unwrap_or_default();
            let _ = writeln!(out, "{indent}{field}{}@{:?} {:?}", node.kind(), node.range(), node.text());
        }
        out
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tokens, f)
    }
}

/// Node handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl<'a> SyntaxNode<'a> {
    #[inline]
    fn data(self) -> &'a NodeData {
        self.tree.data(self.id)
    }

    #[inline]
    fn wrap(self, id: Option<NodeId>) -> Option<Self> {
        Some(self.tree.node(id?))
    }

    #[inline]
    pub fn id(self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn tree(self) -> &'a SyntaxTree {
        self.tree
    }

    /// Returns the node's `type` tag.
    #[inline]
    pub fn kind(self) -> &'a str {
        &self.data().kind
    }

    /// Returns the name of the parent field that holds this node.
    #[inline]
    pub fn field(self) -> Option<&'a str> {
        self.data().field.as_deref()
    }

    /// Returns the original range, unaffected by edits.
    #[inline]
    pub fn range(self) -> TextRange {
        self.data().range
    }

    #[inline]
    pub fn loc(self) -> SourceLocation {
        self.data().loc
    }

    /// Returns the distance from the root, which has depth 0.
    #[inline]
    pub fn depth(self) -> u32 {
        self.data().depth
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self.id == self.tree.root
    }

    /// Returns a non-node field of the AST node, such as `name` or `operator`.
    #[inline]
    pub fn attr(self, name: &str) -> Option<&'a Value> {
        self.data().attrs.get(name)
    }

    #[inline]
    pub fn parent(self) -> Option<Self> {
        self.wrap(self.data().parent)
    }

    /// Returns the previous node of the same AST array, if any.
    #[inline]
    pub fn prev_sibling(self) -> Option<Self> {
        self.wrap(self.data().prev)
    }

    /// Returns the next node of the same AST array, if any.
    #[inline]
    pub fn next_sibling(self) -> Option<Self> {
        self.wrap(self.data().next)
    }

    /// Iterates child nodes in field order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator + 'a {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| tree.node(id))
    }

    #[inline]
    pub fn first_child(self) -> Option<Self> {
        self.wrap(self.data().children.first().copied())
    }

    /// The next child of this node's parent, across AST fields.
    pub(crate) fn next_in_parent(self) -> Option<Self> {
        let parent = self.parent()?;
        let index = self.data().child_index as usize + 1;
        self.wrap(parent.data().children.get(index).copied())
    }

    /// Returns an iterator of ancestors starting from this node.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = Self> + Clone {
        std::iter::successors(Some(self), |it| it.parent())
    }

    /// Returns the first token of the node, `None` if it covers no token.
    #[inline]
    pub fn start_token(self) -> Option<SyntaxToken<'a>> {
        self.data().span.map(|(first, _)| self.tree.token(first))
    }

    /// Returns the last token of the node, `None` if it covers no token.
    #[inline]
    pub fn end_token(self) -> Option<SyntaxToken<'a>> {
        self.data().span.map(|(_, last)| self.tree.token(last))
    }

    /// Returns the token right before the node.
    pub fn prev_token(self) -> Option<SyntaxToken<'a>> {
        self.start_token()?.prev()
    }

    /// Returns the token right after the node.
    pub fn next_token(self) -> Option<SyntaxToken<'a>> {
        self.end_token()?.next()
    }

    /// Iterates the node's tokens from start token to end token.
    pub fn tokens(self) -> impl Iterator<Item = SyntaxToken<'a>> + 'a {
        let tree = self.tree;
        let tokens = match self.data().span {
            Some((first, last)) => tree.tokens.range(Some(first), Some(last)),
            None => tree.tokens.range(None, None),
        };
        tokens.map(move |(id, _)| tree.token(id))
    }

    /// Concatenated text of the node's tokens, token splices included.
    pub fn text(self) -> String {
        self.to_string()
    }

    /// The original range of the node with pending replacements applied.
    pub fn source(self) -> String {
        self.tree.edits.render(&self.tree.source, self.range())
    }
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tokens().try_for_each(|token| f.write_str(token.text()))
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind(), self.range())
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

/// Token handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'a> {
    tree: &'a SyntaxTree,
    id: TokenId,
}

impl<'a> SyntaxToken<'a> {
    #[inline]
    fn data(self) -> &'a Token {
        &self.tree.tokens[self.id]
    }

    #[inline]
    pub fn id(self) -> TokenId {
        self.id
    }

    #[inline]
    pub fn kind(self) -> TokenKind {
        self.data().kind()
    }

    #[inline]
    pub fn is_trivia(self) -> bool {
        self.kind().is_trivia()
    }

    #[inline]
    pub fn value(self) -> &'a str {
        self.data().value()
    }

    #[inline]
    pub fn raw(self) -> Option<&'a str> {
        self.data().raw()
    }

    /// Returns the display text: `raw` for comments, `value` otherwise.
    #[inline]
    pub fn text(self) -> &'a str {
        self.data().text()
    }

    #[inline]
    pub fn range(self) -> TextRange {
        self.data().range()
    }

    #[inline]
    pub fn loc(self) -> SourceLocation {
        self.data().loc()
    }

    /// Returns the position of the token in the stream.
    #[inline]
    pub fn index(self) -> u32 {
        self.data().index()
    }

    #[inline]
    pub fn is_attached(self) -> bool {
        self.data().is_attached()
    }

    #[inline]
    pub fn prev(self) -> Option<Self> {
        Some(self.tree.token(self.data().prev()?))
    }

    #[inline]
    pub fn next(self) -> Option<Self> {
        Some(self.tree.token(self.data().next()?))
    }
}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?} {:?}", self.kind(), self.range(), self.text())
    }
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxToken<'_> {}
