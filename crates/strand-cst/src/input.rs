//! The contract with the external parser.
//!
//! A parser hands over an ESTree-shaped AST as JSON together with its flat
//! token and comment arrays. Ranges are `[start, end)` UTF-8 byte offsets.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use strand_errors::Diagnostic;
use text_size::{TextRange, TextSize};

use crate::location::{LineCol, SourceLocation};
use crate::{CommentKind, TokenKind};

/// Anything that can turn source text into a [`ParseOutput`].
pub trait Parse {
    fn parse(&self, source: &str) -> Result<ParseOutput, ParseError>;
}

impl<F> Parse for F
where
    F: Fn(&str) -> Result<ParseOutput, ParseError>,
{
    fn parse(&self, source: &str) -> Result<ParseOutput, ParseError> {
        self(source)
    }
}

/// Everything a parser produces for one source text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParseOutput {
    pub ast: Value,
    pub tokens: Vec<RawToken>,
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

impl ParseOutput {
    /// Splits an esprima-style program that carries `tokens` and `comments`
    /// arrays on its root object.
    pub fn from_program(mut program: Value) -> Result<Self, serde_json::Error> {
        let (tokens, comments) = match program.as_object_mut() {
            Some(root) => (root.remove("tokens"), root.remove("comments")),
            None => (None, None),
        };
        let tokens = match tokens {
            Some(tokens) => serde_json::from_value(tokens)?,
            None => Vec::new(),
        };
        let comments = match comments {
            Some(comments) => serde_json::from_value(comments)?,
            None => Vec::new(),
        };
        Ok(Self { ast: program, tokens, comments })
    }
}

/// A syntax token as reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawToken {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub value: String,
    #[serde(with = "range_pair")]
    pub range: TextRange,
    pub loc: SourceLocation,
}

/// A comment as reported by the parser; `value` excludes the delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawComment {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub value: String,
    #[serde(with = "range_pair")]
    pub range: TextRange,
    pub loc: SourceLocation,
}

/// A syntax error, owned by the parser and passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({loc})")]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
    pub loc: LineCol,
}

impl ParseError {
    pub fn new(message: impl Into<String>, range: TextRange, loc: LineCol) -> Self {
        Self { message: message.into(), range, loc }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.message.clone(), self.range)
    }
}

/// Reads a `[start, end]` offset pair. Ordering is checked by the caller.
pub(crate) fn range_from_pair(value: &Value) -> Option<(u32, u32)> {
    let pair = value.as_array()?;
    let [start, end] = pair.as_slice() else { return None };
    let start = u32::try_from(start.as_u64()?).ok()?;
    let end = u32::try_from(end.as_u64()?).ok()?;
    Some((start, end))
}

mod range_pair {
    use serde::de::Error as _;

    use super::*;

    pub(super) fn serialize<S: Serializer>(range: &TextRange, serializer: S) -> Result<S::Ok, S::Error> {
        [u32::from(range.start()), u32::from(range.end())].serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TextRange, D::Error> {
        let [start, end] = <[u32; 2]>::deserialize(deserializer)?;
        if start > end {
            return Err(D::Error::custom(format!("inverted range [{start}, {end}]")));
        }
        Ok(TextRange::new(TextSize::new(start), TextSize::new(end)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn splits_esprima_program() {
        let program = json!({
            "type": "Program",
            "body": [],
            "range": [0, 5],
            "loc": { "start": { "line": 1, "column": 0 }, "end": { "line": 1, "column": 5 } },
            "tokens": [],
            "comments": [{
                "type": "Block",
                "value": " x ",
                "range": [0, 7],
                "loc": { "start": { "line": 1, "column": 0 }, "end": { "line": 1, "column": 7 } }
            }]
        });

        let output = ParseOutput::from_program(program).unwrap();

        assert!(output.tokens.is_empty());
        assert_eq!(output.comments.len(), 1);
        assert_eq!(output.comments[0].kind, CommentKind::Block);
        assert_eq!(output.comments[0].range, TextRange::new(0.into(), 7.into()));
        assert!(output.ast.get("tokens").is_none());
    }

    #[test]
    fn inverted_token_range_is_rejected() {
        let token = json!({
            "type": "Identifier",
            "value": "x",
            "range": [4, 3],
            "loc": { "start": { "line": 1, "column": 4 }, "end": { "line": 1, "column": 3 } }
        });

        let err = serde_json::from_value::<RawToken>(token).unwrap_err();
        assert!(err.to_string().contains("inverted range"), "{err}");
    }

    #[test]
    fn reads_range_pairs() {
        assert_eq!(range_from_pair(&json!([3, 9])), Some((3, 9)));
        assert_eq!(range_from_pair(&json!([9, 3])), Some((9, 3)));
        assert_eq!(range_from_pair(&json!([3])), None);
        assert_eq!(range_from_pair(&json!("3..9")), None);
    }
}
