use serde_json::Value;
use strand_cst::TokenKind;

use crate::parser::{CompletedMarker, Parser};
use crate::tokenizer::{number_value, unescape};

pub(crate) mod exprs;
pub(crate) mod stmts;

pub(crate) fn identifier(p: &mut Parser<'_>) -> CompletedMarker {
    if p.kind() != Some(TokenKind::Identifier) {
        p.error_unexpected();
        return CompletedMarker::missing(p);
    }
    let m = p.start();
    let name = p.advance();
    m.complete(p, "Identifier", vec![("name", name.into())])
}

/// A property name after `.` or in an object literal; reserved words are
/// allowed.
pub(crate) fn identifier_name(p: &mut Parser<'_>) -> CompletedMarker {
    match p.kind() {
        Some(TokenKind::Identifier | TokenKind::Keyword | TokenKind::Boolean | TokenKind::Null) => {
            let m = p.start();
            let name = p.advance();
            m.complete(p, "Identifier", vec![("name", name.into())])
        }
        _ => identifier(p),
    }
}

pub(crate) fn literal(p: &mut Parser<'_>) -> CompletedMarker {
    let kind = p.kind();
    let m = p.start();
    let raw = p.advance();
    let value = match kind {
        Some(TokenKind::Numeric) => number_value(raw),
        Some(TokenKind::String) => unescape(raw).into(),
        Some(TokenKind::Boolean) => (raw == "true").into(),
        _ => Value::Null,
    };
    m.complete(p, "Literal", vec![("value", value), ("raw", raw.into())])
}

/// Comma separated items up to `ket`; a trailing comma is allowed.
pub(crate) fn delimited(
    p: &mut Parser<'_>,
    bra: &str,
    ket: &str,
    mut item: impl FnMut(&mut Parser<'_>) -> Value,
) -> Vec<Value> {
    p.expect(bra);
    let mut items = Vec::new();
    while !p.at(ket) && !p.at_eof() {
        items.push(item(p));
        if !p.at(ket) {
            p.expect(",");
        }
    }
    p.expect(ket);
    items
}
