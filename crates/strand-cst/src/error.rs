//! Error type for building, indexing and editing a tree.
//!
//! Policy: a range that cannot be placed in the source (inverted, out of
//! bounds, off a char boundary, overlapping the previous token) always
//! raises [`Error::MalformedRange`]. A node with no token before or after it
//! is not missing data; it binds to the list head or tail.

use strand_errors::Diagnostic;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use crate::ParseError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The parser rejected the source.
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("malformed range [{start}, {end}) on {what} (source is {source_len} bytes)")]
    MalformedRange { what: String, start: u32, end: u32, source_len: u32 },

    /// A token whose text differs from the source bytes it claims to cover.
    #[error("{what} does not match the source at [{start}, {end})")]
    TextMismatch { what: String, start: u32, end: u32 },

    #[error("node `{kind}` has no usable `{field}`")]
    MissingField { kind: String, field: &'static str },

    #[error("invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("token is no longer part of the token stream")]
    DetachedToken,

    #[error("edit at {range:?} overlaps an incompatible edit")]
    EditConflict { range: TextRange },
}

impl Error {
    pub(crate) fn malformed(what: impl Into<String>, start: u32, end: u32, source: &str) -> Self {
        Self::MalformedRange {
            what: what.into(),
            start,
            end,
            source_len: source.len().try_into().unwrap_or(u32::MAX),
        }
    }

    /// A source-anchored view of the error, when it points into the source.
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        let range = |start: u32, end: u32| {
            TextRange::new(TextSize::new(start.min(end)), TextSize::new(end.max(start)))
        };
        match self {
            Self::Parse(err) => Some(err.to_diagnostic()),
            Self::MalformedRange { start, end, .. } => {
                Some(Diagnostic::error(self.to_string(), range(*start, *end)).with_label("malformed"))
            }
            Self::TextMismatch { start, end, .. } => {
                Some(Diagnostic::error(self.to_string(), range(*start, *end)))
            }
            Self::EditConflict { range } => {
                Some(Diagnostic::error(self.to_string(), *range).with_label("conflicting edit"))
            }
            Self::MissingField { .. } | Self::InvalidToken { .. } | Self::DetachedToken => None,
        }
    }
}
