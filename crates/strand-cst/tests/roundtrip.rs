//! Property tests: whatever mix of trivia surrounds the code, the token list
//! reproduces the source and stays contiguous.

use proptest::prelude::*;
use strand_cst::trivia::{TriviaPieceKind, classify};
use strand_cst::{SyntaxTree, moonwalk};
use strand_estree::EstreeParser;

fn trivia_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just(" "),
            Just("\t"),
            Just("\n"),
            Just("\r"),
            Just("\r\n"),
            Just("/* c */"),
            Just("/*\r\n*/"),
            Just("// c\n"),
        ],
        0..6,
    )
    .prop_map(|pieces| pieces.concat())
}

fn statement_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("var a = 1;"),
        Just("f(x, [y,, z]);"),
        Just("if (a) { b() } else c = !d;"),
        Just("function g(p){ return p * 2 }"),
        Just("while (i < 3) i++;"),
        Just("o.k['v'] = \"s\";"),
    ]
}

fn source_strategy() -> impl Strategy<Value = String> {
    (trivia_strategy(), prop::collection::vec((statement_strategy(), trivia_strategy()), 0..5)).prop_map(
        |(leading, statements)| {
            let mut source = leading;
            for (statement, trivia) in statements {
                source.push_str(statement);
                // Keeps two statements from fusing into one token.
                source.push(' ');
                source.push_str(&trivia);
            }
            source
        },
    )
}

proptest! {
    #[test]
    fn classified_trivia_concatenates_back(text in trivia_strategy()) {
        let text = text.replace("/* c */", " ").replace("/*\r\n*/", "\r\n").replace("// c", "\t");
        let pieces = classify(&text);

        prop_assert_eq!(pieces.iter().map(|piece| piece.text).collect::<String>(), text.clone());
        for piece in pieces {
            match piece.kind {
                TriviaPieceKind::WhiteSpace => {
                    prop_assert!(!piece.text.contains(['\r', '\n']), "{:?}", piece.text);
                }
                TriviaPieceKind::LineBreak => {
                    prop_assert!(matches!(piece.text, "\n" | "\r" | "\r\n"), "{:?}", piece.text);
                }
            }
        }
    }

    #[test]
    fn token_list_reproduces_the_source(source in source_strategy()) {
        let tree = SyntaxTree::parse(&EstreeParser, &source).unwrap();
        prop_assert_eq!(tree.text(), source.as_str());

        // Leading trivia is laid out from line 0; from the first parser token
        // on, locations follow the parser's numbering.
        let mut numbered = false;
        let mut tokens = tree.tokens().peekable();
        while let Some(token) = tokens.next() {
            prop_assert_eq!(token.text(), &source[token.range()]);
            numbered |= !token.kind().is_whitespace();
            if let Some(next) = tokens.peek() {
                prop_assert_eq!(token.range().end(), next.range().start());
                prop_assert_eq!(token.index() + 1, next.index());
                if numbered {
                    prop_assert_eq!(token.loc().end, next.loc().start);
                }
            }
        }

        let mut visited = 0;
        moonwalk(&tree, |node| {
            visited += 1;
            if !node.is_root() && !node.range().is_empty() {
                assert_eq!(node.text(), &source[node.range()]);
            }
        });
        prop_assert_eq!(visited, tree.nodes().count());
    }
}
