use serde_json::Value;
use strand_cst::TokenKind;

use super::{delimited, exprs, identifier};
use crate::parser::{CompletedMarker, Parser};

pub(crate) fn program(p: &mut Parser<'_>) -> Value {
    let m = p.start();
    let mut body = Vec::new();
    while !p.at_eof() {
        body.push(statement(p));
    }
    m.complete(p, "Program", vec![("body", body.into()), ("sourceType", "script".into())])
        .into_node()
}

fn statement(p: &mut Parser<'_>) -> Value {
    let stmt = match p.syntax() {
        Some("function") => function(p, "FunctionDeclaration"),
        Some("var" | "let" | "const") => variable_declaration(p),
        Some("return") => return_statement(p),
        Some("if") => if_statement(p),
        Some("while") => while_statement(p),
        Some("break") => jump_statement(p, "BreakStatement"),
        Some("continue") => jump_statement(p, "ContinueStatement"),
        Some("throw") => {
            let m = p.start();
            p.advance();
            let argument = exprs::expression(p).into_node();
            consume_semicolon(p);
            m.complete(p, "ThrowStatement", vec![("argument", argument)])
        }
        Some("{") => block(p),
        Some(";") => {
            let m = p.start();
            p.advance();
            m.complete(p, "EmptyStatement", Vec::new())
        }
        _ => {
            let m = p.start();
            let expression = exprs::expression(p).into_node();
            consume_semicolon(p);
            m.complete(p, "ExpressionStatement", vec![("expression", expression)])
        }
    };
    stmt.into_node()
}

/// Automatic semicolon insertion: a missing `;` is fine before `}`, at the
/// end of input, or across a line break.
fn consume_semicolon(p: &mut Parser<'_>) {
    if p.eat(";") || p.at("}") || p.at_eof() || p.newline_before() {
        return;
    }
    p.error_unexpected();
}

pub(crate) fn block(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.expect("{");
    let mut body = Vec::new();
    while !p.at("}") && !p.at_eof() {
        body.push(statement(p));
    }
    p.expect("}");
    m.complete(p, "BlockStatement", vec![("body", body.into())])
}

/// `function name?(params) { body }`, as a declaration or an expression.
pub(crate) fn function(p: &mut Parser<'_>, kind: &str) -> CompletedMarker {
    let m = p.start();
    p.expect("function");
    let id = if kind == "FunctionDeclaration" || p.kind() == Some(TokenKind::Identifier) {
        identifier(p).into_node()
    } else {
        Value::Null
    };
    let params = delimited(p, "(", ")", |p| identifier(p).into_node());
    let body = block(p).into_node();
    m.complete(
        p,
        kind,
        vec![
            ("id", id),
            ("params", params.into()),
            ("body", body),
            ("generator", false.into()),
            ("expression", false.into()),
            ("async", false.into()),
        ],
    )
}

fn variable_declaration(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    let kind = p.advance();
    let mut declarations = Vec::new();
    loop {
        let declarator = p.start();
        let id = identifier(p).into_node();
        let init = if p.eat("=") { exprs::assignment(p).into_node() } else { Value::Null };
        declarations.push(
            declarator.complete(p, "VariableDeclarator", vec![("id", id), ("init", init)]).into_node(),
        );
        if !p.eat(",") {
            break;
        }
    }
    consume_semicolon(p);
    m.complete(p, "VariableDeclaration", vec![("declarations", declarations.into()), ("kind", kind.into())])
}

fn return_statement(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance();
    let argument = if p.at(";") || p.at("}") || p.at_eof() || p.newline_before() {
        Value::Null
    } else {
        exprs::expression(p).into_node()
    };
    consume_semicolon(p);
    m.complete(p, "ReturnStatement", vec![("argument", argument)])
}

fn if_statement(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance();
    p.expect("(");
    let test = exprs::expression(p).into_node();
    p.expect(")");
    let consequent = statement(p);
    let alternate = if p.eat("else") { statement(p) } else { Value::Null };
    m.complete(
        p,
        "IfStatement",
        vec![("test", test), ("consequent", consequent), ("alternate", alternate)],
    )
}

fn while_statement(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance();
    p.expect("(");
    let test = exprs::expression(p).into_node();
    p.expect(")");
    let body = statement(p);
    m.complete(p, "WhileStatement", vec![("test", test), ("body", body)])
}

fn jump_statement(p: &mut Parser<'_>, kind: &str) -> CompletedMarker {
    let m = p.start();
    p.advance();
    let label = if p.kind() == Some(TokenKind::Identifier) && !p.newline_before() {
        identifier(p).into_node()
    } else {
        Value::Null
    };
    consume_semicolon(p);
    m.complete(p, kind, vec![("label", label)])
}
