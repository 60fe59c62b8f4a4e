//! Node indexing: arena allocation of the AST and token binding.

use std::sync::LazyLock;

use la_arena::{Arena, Idx};
use rustc_hash::FxHashSet;
use serde::Deserialize as _;
use serde_json::{Map, Value};
use text_size::{TextRange, TextSize};

use crate::input::range_from_pair;
use crate::location::{LineCol, SourceLocation};
use crate::options::IndexOptions;
use crate::stream::TokenStream;
use crate::token::TokenId;
use crate::{Error, Result};

pub type NodeId = Idx<NodeData>;

/// Field names that hold back references, token lists or derived data.
static EXEMPT_FIELDS: LazyLock<FxHashSet<&'static str>> = LazyLock::new(|| {
    [
        "type", "root", "comments", "tokens", "parent", "next", "prev", "startToken", "endToken",
        "range", "loc",
    ]
    .into_iter()
    .collect()
});

/// An AST node with its structural links and token span.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) kind: Box<str>,
    /// Name of the parent field holding this node.
    pub(crate) field: Option<Box<str>>,
    /// Range at index time, never moved by edits.
    pub(crate) range: TextRange,
    pub(crate) loc: SourceLocation,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) depth: u32,
    /// Position in the parent's `children`.
    pub(crate) child_index: u32,
    /// First and last token, `None` for a node that covers no token.
    pub(crate) span: Option<(TokenId, TokenId)>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attrs: Map<String, Value>,
}

pub(crate) struct Indexed {
    pub(crate) nodes: Arena<NodeData>,
    pub(crate) root: NodeId,
}

/// Allocates every node of `ast` in pre-order and binds it to its tokens.
pub(crate) fn index(
    source: &str,
    stream: &TokenStream,
    ast: Value,
    options: &IndexOptions,
) -> Result<Indexed> {
    let Value::Object(object) = ast else {
        return Err(Error::MissingField { kind: "<root>".to_owned(), field: "type" });
    };
    if !child_is_node(&object) {
        return Err(Error::MissingField { kind: "<root>".to_owned(), field: "type" });
    }

    let binder = Binder::new(stream, options.binary_search(stream.len()));
    let mut indexer = Indexer { source, binder, nodes: Arena::new() };
    let root = indexer.node(object, None, None, 0)?;
    let mut nodes = indexer.nodes;

    if let (Some(head), Some(tail)) = (stream.head(), stream.tail()) {
        let root = &mut nodes[root];
        root.range = TextRange::new(stream[head].range().start(), stream[tail].range().end());
        root.loc = SourceLocation::new(LineCol::default(), stream[tail].loc().end);
        root.span = Some((head, tail));
    }

    tracing::debug!(
        nodes = nodes.len(),
        tokens = stream.len(),
        binary_search = indexer.binder.binary_search,
        "indexed tree"
    );
    Ok(Indexed { nodes, root })
}

fn is_node(value: &Value) -> bool {
    value.get("type").is_some_and(Value::is_string)
}

struct Indexer<'a> {
    source: &'a str,
    binder: Binder,
    nodes: Arena<NodeData>,
}

impl Indexer<'_> {
    fn node(
        &mut self,
        object: Map<String, Value>,
        field: Option<&str>,
        parent: Option<NodeId>,
        depth: u32,
    ) -> Result<NodeId> {
        let kind = object.get("type").and_then(Value::as_str).unwrap_or_default();
        let range = self.range(kind, object.get("range"))?;
        let loc = object
            .get("loc")
            .and_then(|loc| SourceLocation::deserialize(loc).ok())
            .ok_or_else(|| Error::MissingField { kind: kind.to_owned(), field: "loc" })?;

        let id = self.nodes.alloc(NodeData {
            kind: kind.into(),
            field: field.map(Into::into),
            range,
            loc,
            parent,
            prev: None,
            next: None,
            depth,
            child_index: 0,
            span: self.binder.bind(range),
            children: Vec::new(),
            attrs: Map::new(),
        });

        let mut children = Vec::new();
        let mut attrs = Map::new();
        for (key, value) in object {
            if EXEMPT_FIELDS.contains(key.as_str()) {
                continue;
            }
            match value {
                Value::Object(child) if child_is_node(&child) => {
                    children.push(self.node(child, Some(&key), Some(id), depth + 1)?);
                }
                Value::Array(items) if items.iter().any(is_node) => {
                    let mut prev: Option<NodeId> = None;
                    for item in items {
                        let Value::Object(child) = item else {
                            // A hole separates the nodes around it.
                            prev = None;
                            continue;
                        };
                        if !child_is_node(&child) {
                            prev = None;
                            continue;
                        }
                        let child = self.node(child, Some(&key), Some(id), depth + 1)?;
                        if let Some(prev) = prev {
                            self.nodes[prev].next = Some(child);
                            self.nodes[child].prev = Some(prev);
                        }
                        prev = Some(child);
                        children.push(child);
                    }
                }
                value => {
                    attrs.insert(key, value);
                }
            }
        }

        for (child_index, &child) in children.iter().enumerate() {
            self.nodes[child].child_index = child_index as u32;
        }
        let data = &mut self.nodes[id];
        data.children = children;
        data.attrs = attrs;
        Ok(id)
    }

    fn range(&self, kind: &str, value: Option<&Value>) -> Result<TextRange> {
        let missing = || Error::MissingField { kind: kind.to_owned(), field: "range" };
        let (start, end) = range_from_pair(value.ok_or_else(missing)?).ok_or_else(missing)?;

        let source = self.source;
        let placeable = start <= end
            && (end as usize) <= source.len()
            && source.is_char_boundary(start as usize)
            && source.is_char_boundary(end as usize);
        if !placeable {
            return Err(Error::malformed(format!("`{kind}` node"), start, end, source));
        }
        Ok(TextRange::new(TextSize::new(start), TextSize::new(end)))
    }
}

fn child_is_node(object: &Map<String, Value>) -> bool {
    object.get("type").is_some_and(Value::is_string)
}

/// Resolves node ranges to token spans over a snapshot of the stream.
struct Binder {
    order: Vec<TokenId>,
    starts: Vec<TextSize>,
    ends: Vec<TextSize>,
    binary_search: bool,
}

impl Binder {
    fn new(stream: &TokenStream, binary_search: bool) -> Self {
        let mut order = Vec::with_capacity(stream.len());
        let mut starts = Vec::with_capacity(stream.len());
        let mut ends = Vec::with_capacity(stream.len());
        for (id, token) in stream.iter() {
            order.push(id);
            starts.push(token.range().start());
            ends.push(token.range().end());
        }
        Self { order, starts, ends, binary_search }
    }

    /// The start token follows the last token ending at or before the node's
    /// start; the end token precedes the first token starting at or after the
    /// node's end. Either falls back to the list head or tail.
    fn bind(&self, range: TextRange) -> Option<(TokenId, TokenId)> {
        let (first, past_last) = if self.binary_search {
            (
                self.ends.partition_point(|&end| end <= range.start()),
                self.starts.partition_point(|&start| start < range.end()),
            )
        } else {
            (
                self.ends.iter().take_while(|&&end| end <= range.start()).count(),
                self.starts.iter().take_while(|&&start| start < range.end()).count(),
            )
        };
        if first >= past_last {
            return None;
        }
        Some((self.order[first], self.order[past_last - 1]))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::options::TokenLookup;
    use crate::{RawToken, TokenKind};

    fn loc() -> Value {
        json!({ "start": { "line": 1, "column": 0 }, "end": { "line": 1, "column": 0 } })
    }

    fn ident(name: &str, start: u32) -> Value {
        json!({
            "type": "Identifier",
            "name": name,
            "range": [start, start + name.len() as u32],
            "loc": loc(),
        })
    }

    fn stream(source: &str) -> TokenStream {
        let tokens = source
            .match_indices(|c: char| c.is_ascii_alphanumeric())
            .map(|(offset, value)| RawToken {
                kind: TokenKind::Identifier,
                value: value.to_owned(),
                range: TextRange::at(TextSize::new(offset as u32), TextSize::of(value)),
                loc: Default::default(),
            })
            .collect();
        TokenStream::build(source, tokens, Vec::new()).unwrap()
    }

    #[test]
    fn links_array_siblings_and_skips_holes() {
        let source = "a b  c";
        let ast = json!({
            "type": "ArrayExpression",
            "range": [0, 6],
            "loc": loc(),
            "elements": [ident("a", 0), ident("b", 2), null, ident("c", 5)],
            "parent": { "type": "Bogus", "range": [0, 0], "loc": loc() },
        });

        let stream = stream(source);
        let Indexed { nodes, root } = index(source, &stream, ast, &IndexOptions::default()).unwrap();

        let children = &nodes[root].children;
        assert_eq!(children.len(), 3);
        let [a, b, c] = [children[0], children[1], children[2]];
        assert_eq!(nodes[a].next, Some(b));
        assert_eq!(nodes[b].prev, Some(a));
        assert_eq!(nodes[b].next, None);
        assert_eq!(nodes[c].prev, None);
        assert_eq!(nodes[c].depth, 1);
        assert_eq!(nodes[c].field.as_deref(), Some("elements"));
        assert_eq!(nodes[c].attrs.get("name"), Some(&json!("c")));
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn lookup_strategies_agree() {
        let source = " ab  c d  ";
        let stream = stream(source);
        let linear = Binder::new(&stream, false);
        let binary = Binder::new(&stream, true);

        for start in 0..=source.len() as u32 {
            for end in start..=source.len() as u32 {
                let range = TextRange::new(start.into(), end.into());
                assert_eq!(linear.bind(range), binary.bind(range), "{range:?}");
            }
        }
    }

    #[test]
    fn empty_range_binds_no_tokens() {
        let stream = stream("a b");
        let binder = Binder::new(&stream, false);

        assert_eq!(binder.bind(TextRange::empty(1.into())), None);
        let (first, last) = binder.bind(TextRange::new(1.into(), 2.into())).unwrap();
        assert_eq!(stream[first].text(), " ");
        assert_eq!(stream[last].text(), " ");
    }

    #[test]
    fn missing_and_malformed_node_ranges() {
        let stream = stream("ab");
        let options = IndexOptions::with_lookup(TokenLookup::Linear);

        let no_range = json!({ "type": "Program", "loc": loc() });
        let err = index("ab", &stream, no_range, &options).err().unwrap();
        assert!(matches!(err, Error::MissingField { field: "range", .. }), "{err}");

        let past_end = json!({ "type": "Program", "range": [0, 9], "loc": loc() });
        let err = index("ab", &stream, past_end, &options).err().unwrap();
        assert!(matches!(err, Error::MalformedRange { end: 9, .. }), "{err}");

        let not_a_node = json!([1, 2]);
        let err = index("ab", &stream, not_a_node, &options).err().unwrap();
        assert!(matches!(err, Error::MissingField { field: "type", .. }), "{err}");
    }
}
