//! Lossless concrete syntax trees over ESTree-style parser output.
//!
//! A parser hands over an AST, its syntax tokens and its comments. The tree
//! merges them with synthesized whitespace into one linked token list that
//! reproduces the source byte for byte, binds every node to its first and
//! last token, and supports bottom-up and top-down walks as well as in-place
//! edits of the token list.

mod edit;
mod error;
mod index;
mod input;
mod kind;
mod location;
mod options;
mod stream;
mod token;
/// Whitespace and line break classification.
pub mod trivia;
mod tree;
mod walk;

/// Error type and result alias.
pub use error::{Error, Result};
/// Node handles into the arena.
pub use index::{NodeData, NodeId};
/// The contract with an external parser.
pub use input::{Parse, ParseError, ParseOutput, RawComment, RawToken};
/// Token and comment kinds.
pub use kind::{CommentKind, TokenKind};
pub use location::{LineCol, SourceLocation};
/// Index configuration.
pub use options::{IndexOptions, TokenLookup};
/// The unified token list.
pub use stream::{TokenStream, Tokens};
pub use token::{NewToken, Token, TokenId};
/// Primary tree API.
pub use tree::{SyntaxNode, SyntaxToken, SyntaxTree};
/// Traversals.
pub use walk::{
    Preorder, WalkControl, WalkEvent, moonwalk, moonwalk_mut, moonwalk_source, recursive_walk,
    recursive_walk_mut,
};
