use serde_json::Value;
use strand_cst::TokenKind;

use super::{delimited, identifier, identifier_name, literal, stmts};
use crate::parser::{CompletedMarker, Parser};

const ASSIGNMENT_OPERATORS: &[&str] =
    &["=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=", "||=", "??="];

/// Binding power of a binary operator, and whether it builds a
/// `LogicalExpression`.
fn binary_operator(op: &str) -> Option<(u8, bool)> {
    Some(match op {
        "??" => (1, true),
        "||" => (2, true),
        "&&" => (3, true),
        "|" => (4, false),
        "^" => (5, false),
        "&" => (6, false),
        "==" | "!=" | "===" | "!==" => (7, false),
        "<" | ">" | "<=" | ">=" | "instanceof" | "in" => (8, false),
        "<<" | ">>" | ">>>" => (9, false),
        "+" | "-" => (10, false),
        "*" | "/" | "%" => (11, false),
        "**" => (12, false),
        _ => return None,
    })
}

pub(crate) fn expression(p: &mut Parser<'_>) -> CompletedMarker {
    let first = assignment(p);
    if !p.at(",") {
        return first;
    }
    let m = first.precede();
    let mut expressions = vec![first.into_node()];
    while p.eat(",") {
        expressions.push(assignment(p).into_node());
    }
    m.complete(p, "SequenceExpression", vec![("expressions", expressions.into())])
}

pub(crate) fn assignment(p: &mut Parser<'_>) -> CompletedMarker {
    let lhs = conditional(p);
    if !p.at_any(ASSIGNMENT_OPERATORS) {
        return lhs;
    }
    let m = lhs.precede();
    let operator = p.advance();
    let right = assignment(p).into_node();
    m.complete(
        p,
        "AssignmentExpression",
        vec![("operator", operator.into()), ("left", lhs.into_node()), ("right", right)],
    )
}

fn conditional(p: &mut Parser<'_>) -> CompletedMarker {
    let test = binary(p, 0);
    if !p.at("?") {
        return test;
    }
    let m = test.precede();
    p.advance();
    let consequent = assignment(p).into_node();
    p.expect(":");
    let alternate = assignment(p).into_node();
    m.complete(
        p,
        "ConditionalExpression",
        vec![("test", test.into_node()), ("consequent", consequent), ("alternate", alternate)],
    )
}

fn binary(p: &mut Parser<'_>, min_power: u8) -> CompletedMarker {
    let mut lhs = unary(p);

    while let Some((power, logical)) = p.syntax().and_then(binary_operator) {
        if power <= min_power {
            break;
        }
        let m = lhs.precede();
        let operator = p.advance();
        // `**` is right associative.
        let rhs = binary(p, if operator == "**" { power - 1 } else { power }).into_node();
        let kind = if logical { "LogicalExpression" } else { "BinaryExpression" };
        lhs = m.complete(
            p,
            kind,
            vec![("operator", operator.into()), ("left", lhs.into_node()), ("right", rhs)],
        );
    }

    lhs
}

fn unary(p: &mut Parser<'_>) -> CompletedMarker {
    match p.syntax() {
        Some(operator @ ("!" | "~" | "+" | "-" | "typeof" | "void" | "delete")) => {
            let m = p.start();
            p.advance();
            let argument = unary(p).into_node();
            m.complete(
                p,
                "UnaryExpression",
                vec![("operator", operator.into()), ("argument", argument), ("prefix", true.into())],
            )
        }
        Some(operator @ ("++" | "--")) => {
            let m = p.start();
            p.advance();
            let argument = unary(p).into_node();
            m.complete(
                p,
                "UpdateExpression",
                vec![("operator", operator.into()), ("argument", argument), ("prefix", true.into())],
            )
        }
        _ => postfix(p),
    }
}

fn postfix(p: &mut Parser<'_>) -> CompletedMarker {
    let expr = call_or_member(p);
    if !p.at_any(&["++", "--"]) || p.newline_before() {
        return expr;
    }
    let m = expr.precede();
    let operator = p.advance();
    m.complete(
        p,
        "UpdateExpression",
        vec![("operator", operator.into()), ("argument", expr.into_node()), ("prefix", false.into())],
    )
}

fn call_or_member(p: &mut Parser<'_>) -> CompletedMarker {
    let mut expr = if p.at("new") { new_expression(p) } else { primary(p) };
    loop {
        expr = match p.syntax() {
            Some("." | "[") => member(p, expr),
            Some("(") => {
                let m = expr.precede();
                let arguments = delimited(p, "(", ")", |p| assignment(p).into_node());
                m.complete(
                    p,
                    "CallExpression",
                    vec![("callee", expr.into_node()), ("arguments", arguments.into())],
                )
            }
            _ => return expr,
        };
    }
}

/// `object.property` or `object[property]`.
fn member(p: &mut Parser<'_>, object: CompletedMarker) -> CompletedMarker {
    let m = object.precede();
    let computed = p.at("[");
    p.advance();
    let property = if computed {
        let property = expression(p).into_node();
        p.expect("]");
        property
    } else {
        identifier_name(p).into_node()
    };
    m.complete(
        p,
        "MemberExpression",
        vec![("computed", computed.into()), ("object", object.into_node()), ("property", property)],
    )
}

fn new_expression(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance();
    let mut callee = if p.at("new") { new_expression(p) } else { primary(p) };
    while p.at_any(&[".", "["]) {
        callee = member(p, callee);
    }
    let arguments =
        if p.at("(") { delimited(p, "(", ")", |p| assignment(p).into_node()) } else { Vec::new() };
    m.complete(p, "NewExpression", vec![("callee", callee.into_node()), ("arguments", arguments.into())])
}

fn primary(p: &mut Parser<'_>) -> CompletedMarker {
    match p.kind() {
        Some(TokenKind::Identifier) => return identifier(p),
        Some(TokenKind::Numeric | TokenKind::String | TokenKind::Boolean | TokenKind::Null) => {
            return literal(p);
        }
        _ => {}
    }
    match p.syntax() {
        Some("this") => {
            let m = p.start();
            p.advance();
            m.complete(p, "ThisExpression", Vec::new())
        }
        Some("function") => stmts::function(p, "FunctionExpression"),
        Some("(") => {
            let start = p.position();
            p.advance();
            let inner = expression(p);
            p.expect(")");
            inner.parenthesized(start)
        }
        Some("[") => array(p),
        Some("{") => object(p),
        _ => {
            p.error_unexpected();
            CompletedMarker::missing(p)
        }
    }
}

fn array(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance();
    let mut elements = Vec::new();
    while !p.at("]") && !p.at_eof() {
        if p.eat(",") {
            // Elision.
            elements.push(Value::Null);
            continue;
        }
        elements.push(assignment(p).into_node());
        if !p.at("]") {
            p.expect(",");
        }
    }
    p.expect("]");
    m.complete(p, "ArrayExpression", vec![("elements", elements.into())])
}

fn object(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    let properties = delimited(p, "{", "}", |p| property(p).into_node());
    m.complete(p, "ObjectExpression", vec![("properties", properties.into())])
}

fn property(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    let key = match p.kind() {
        Some(TokenKind::String | TokenKind::Numeric) => literal(p),
        _ => identifier_name(p),
    };
    p.expect(":");
    let value = assignment(p).into_node();
    m.complete(
        p,
        "Property",
        vec![
            ("key", key.into_node()),
            ("computed", false.into()),
            ("value", value),
            ("kind", "init".into()),
            ("method", false.into()),
            ("shorthand", false.into()),
        ],
    )
}
