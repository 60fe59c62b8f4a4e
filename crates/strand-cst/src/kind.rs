use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Token kinds, named after the `type` tags of ESTree token arrays.
///
/// The last four are never produced by a parser's token list: comments are
/// retagged from the comment array and trivia is synthesized from the gaps.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenKind {
    Boolean,
    Identifier,
    Keyword,
    Null,
    Numeric,
    Punctuator,
    String,
    RegularExpression,
    Template,
    JsxIdentifier,
    JsxText,
    /// Any tag this crate does not know about.
    Unknown,

    LineComment,
    BlockComment,
    WhiteSpace,
    LineBreak,
}

impl TokenKind {
    #[inline]
    pub fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    /// Whitespace and line breaks, the kinds the trivia classifier emits.
    #[inline]
    pub fn is_whitespace(self) -> bool {
        matches!(self, Self::WhiteSpace | Self::LineBreak)
    }

    #[inline]
    pub fn is_trivia(self) -> bool {
        self.is_comment() || self.is_whitespace()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Identifier => "Identifier",
            Self::Keyword => "Keyword",
            Self::Null => "Null",
            Self::Numeric => "Numeric",
            Self::Punctuator => "Punctuator",
            Self::String => "String",
            Self::RegularExpression => "RegularExpression",
            Self::Template => "Template",
            Self::JsxIdentifier => "JSXIdentifier",
            Self::JsxText => "JSXText",
            Self::Unknown => "Unknown",
            Self::LineComment => "LineComment",
            Self::BlockComment => "BlockComment",
            Self::WhiteSpace => "WhiteSpace",
            Self::LineBreak => "LineBreak",
        }
    }

    /// Maps a parser's `type` tag to a kind. Unrecognized tags become `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Boolean" => Self::Boolean,
            "Identifier" => Self::Identifier,
            "Keyword" => Self::Keyword,
            "Null" => Self::Null,
            "Numeric" => Self::Numeric,
            "Punctuator" => Self::Punctuator,
            "String" => Self::String,
            "RegularExpression" => Self::RegularExpression,
            "Template" => Self::Template,
            "JSXIdentifier" => Self::JsxIdentifier,
            "JSXText" => Self::JsxText,
            "LineComment" => Self::LineComment,
            "BlockComment" => Self::BlockComment,
            "WhiteSpace" => Self::WhiteSpace,
            "LineBreak" => Self::LineBreak,
            _ => Self::Unknown,
        }
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TokenKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two comment flavours a parser reports.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum CommentKind {
    Line,
    Block,
}

impl CommentKind {
    pub fn token_kind(self) -> TokenKind {
        match self {
            Self::Line => TokenKind::LineComment,
            Self::Block => TokenKind::BlockComment,
        }
    }

    /// Rebuilds the literal source form of a comment from its inner value.
    pub fn raw(self, value: &str) -> String {
        match self {
            Self::Line => format!("//{value}"),
            Self::Block => format!("/*{value}*/"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tags_deserialize_to_unknown() {
        let kind: TokenKind = serde_json::from_str(r#""Shebang""#).unwrap();
        assert_eq!(kind, TokenKind::Unknown);

        let kind: TokenKind = serde_json::from_str(r#""JSXText""#).unwrap();
        assert_eq!(kind, TokenKind::JsxText);
    }

    #[test]
    fn comment_raw_forms() {
        assert_eq!(CommentKind::Line.raw(" foo"), "// foo");
        assert_eq!(CommentKind::Block.raw("*\n * doc\n "), "/**\n * doc\n */");
        assert!(CommentKind::Block.token_kind().is_trivia());
        assert!(!TokenKind::Punctuator.is_trivia());
    }
}
