//! A small JavaScript front end producing ESTree-shaped output.
//!
//! Covers declarations, functions, control flow and the expression grammar
//! short of regular expressions, templates, classes and modules. Ranges are
//! byte offsets, lines are 1-based, columns count bytes.

mod cursor;
mod grammar;
mod parser;
mod tokenizer;

use strand_cst::{Parse, ParseError, ParseOutput};

use crate::parser::Parser;
use crate::tokenizer::Tokenized;

/// Parses `source` into an ESTree program with its tokens and comments.
pub fn parse(source: &str) -> Result<ParseOutput, ParseError> {
    let Tokenized { tokens, comments, end } = tokenizer::tokenize(source)?;
    let mut parser = Parser::new(source, tokens, end);
    let ast = grammar::stmts::program(&mut parser);
    let tokens = parser.finish()?;
    Ok(ParseOutput { ast, tokens, comments })
}

/// [`parse`] behind the [`Parse`] seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstreeParser;

impl Parse for EstreeParser {
    fn parse(&self, source: &str) -> Result<ParseOutput, ParseError> {
        parse(source)
    }
}

#[cfg(test)]
mod tests {
    use expect_test::{Expect, expect};
    use serde_json::Value;

    use super::*;

    /// One line per node: indentation by depth, then the type, range and
    /// scalar fields.
    fn outline(value: &Value, depth: usize, out: &mut String) {
        match value {
            Value::Array(items) => items.iter().for_each(|item| outline(item, depth, out)),
            Value::Object(object) if object.contains_key("type") => {
                let scalars = object
                    .iter()
                    .filter(|(key, value)| {
                        !matches!(key.as_str(), "type" | "range" | "loc")
                            && !value.is_object()
                            && !value.is_array()
                    })
                    .map(|(key, value)| format!(" {key}={value}"))
                    .collect::<String>();
                out.push_str(&format!(
                    "{}{} {}{scalars}\n",
                    "  ".repeat(depth),
                    object["type"].as_str().unwrap_or_default(),
                    object["range"],
                ));
                for (key, value) in object {
                    if value.is_object() || value.is_array() {
                        if key != "range" && key != "loc" {
                            outline(value, depth + 1, out);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn check(source: &str, expect: Expect) {
        let output = parse(source).unwrap();
        let mut actual = String::new();
        outline(&output.ast, 0, &mut actual);
        expect.assert_eq(&actual);
    }

    fn check_error(source: &str, expect: Expect) {
        let err = parse(source).unwrap_err();
        expect.assert_eq(&format!("{err} {:?}", err.range));
    }

    #[test]
    fn function_declaration() {
        check(
            "function fn(x){ return x * 2 }",
            expect![[r#"
                Program [0,30] sourceType="script"
                  FunctionDeclaration [0,30] generator=false expression=false async=false
                    Identifier [9,11] name="fn"
                    Identifier [12,13] name="x"
                    BlockStatement [14,30]
                      ReturnStatement [16,28]
                        BinaryExpression [23,28] operator="*"
                          Identifier [23,24] name="x"
                          Literal [27,28] value=2 raw="2"
            "#]],
        );
    }

    #[test]
    fn parenthesized_function_expression() {
        check(
            "//foo\n(function(){ return 123 })\n//bar",
            expect![[r#"
                Program [6,32] sourceType="script"
                  ExpressionStatement [6,32]
                    FunctionExpression [7,31] id=null generator=false expression=false async=false
                      BlockStatement [17,31]
                        ReturnStatement [19,29]
                          Literal [26,29] value=123 raw="123"
            "#]],
        );
    }

    #[test]
    fn expression_precedence() {
        check(
            "a = b ? c || d && e : -f.g[h](1, 'x') * 2 ** 3;",
            expect![[r#"
                Program [0,47] sourceType="script"
                  ExpressionStatement [0,47]
                    AssignmentExpression [0,46] operator="="
                      Identifier [0,1] name="a"
                      ConditionalExpression [4,46]
                        Identifier [4,5] name="b"
                        LogicalExpression [8,19] operator="||"
                          Identifier [8,9] name="c"
                          LogicalExpression [13,19] operator="&&"
                            Identifier [13,14] name="d"
                            Identifier [18,19] name="e"
                        BinaryExpression [22,46] operator="*"
                          UnaryExpression [22,37] operator="-" prefix=true
                            CallExpression [23,37]
                              MemberExpression [23,29] computed=true
                                MemberExpression [23,26] computed=false
                                  Identifier [23,24] name="f"
                                  Identifier [25,26] name="g"
                                Identifier [27,28] name="h"
                              Literal [30,31] value=1 raw="1"
                              Literal [33,36] value="x" raw="'x'"
                          BinaryExpression [40,46] operator="**"
                            Literal [40,41] value=2 raw="2"
                            Literal [45,46] value=3 raw="3"
            "#]],
        );
    }

    #[test]
    fn statements_and_literals() {
        check(
            "var a = [1,, {k: null}], b;\nif (a) { a++ } else while (!b) break\nnew X",
            expect![[r#"
                Program [0,70] sourceType="script"
                  VariableDeclaration [0,27] kind="var"
                    VariableDeclarator [4,23]
                      Identifier [4,5] name="a"
                      ArrayExpression [8,23]
                        Literal [9,10] value=1 raw="1"
                        ObjectExpression [13,22]
                          Property [14,21] computed=false kind="init" method=false shorthand=false
                            Identifier [14,15] name="k"
                            Literal [17,21] value=null raw="null"
                    VariableDeclarator [25,26] init=null
                      Identifier [25,26] name="b"
                  IfStatement [28,64]
                    Identifier [32,33] name="a"
                    BlockStatement [35,42]
                      ExpressionStatement [37,40]
                        UpdateExpression [37,40] operator="++" prefix=false
                          Identifier [37,38] name="a"
                    WhileStatement [48,64]
                      UnaryExpression [55,57] operator="!" prefix=true
                        Identifier [56,57] name="b"
                      BreakStatement [59,64] label=null
                  ExpressionStatement [65,70]
                    NewExpression [65,70]
                      Identifier [69,70] name="X"
            "#]],
        );
    }

    #[test]
    fn syntax_errors_carry_a_location() {
        check_error("var = 1", expect![[r#"Unexpected token = (1:4) 4..5"#]]);
        check_error("f(a b)", expect![[r#"Unexpected identifier (1:4) 4..5"#]]);
        check_error("if (x", expect![[r#"Unexpected end of input (1:5) 5..5"#]]);
        check_error("return 'a\n", expect![[r#"Unexpected token ILLEGAL (1:7) 7..10"#]]);
    }

    #[test]
    fn tokens_and_comments_are_reported() {
        let output = EstreeParser.parse("a /* b */ + 1 // c").unwrap();
        let tokens = output.tokens.iter().map(|token| token.value.as_str()).collect::<Vec<_>>();
        assert_eq!(tokens, ["a", "+", "1"]);
        assert_eq!(output.comments.len(), 2);
        assert_eq!(output.comments[1].value, " c");
    }
}
