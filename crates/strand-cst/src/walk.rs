//! Top-down and bottom-up traversal.

use std::cmp::Reverse;

use crate::index::NodeId;
use crate::{Parse, Result, SyntaxNode, SyntaxTree};

/// What a visitor wants after seeing a node.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WalkControl {
    #[default]
    Continue,
    /// Skip this node's children; its siblings are still visited.
    SkipChildren,
}

impl From<()> for WalkControl {
    fn from((): ()) -> Self {
        Self::Continue
    }
}

impl From<bool> for WalkControl {
    /// `false` stops descent, as a visitor returning "stop" would.
    fn from(descend: bool) -> Self {
        if descend { Self::Continue } else { Self::SkipChildren }
    }
}

pub struct Preorder<'a> {
    start: SyntaxNode<'a>,
    next: Option<WalkEvent<'a>>,
    skip_subtree: bool,
}

impl<'a> Preorder<'a> {
    pub fn new(start: SyntaxNode<'a>) -> Self {
        Self { start, next: Some(WalkEvent::Enter(start)), skip_subtree: false }
    }

    /// Skips the children of the node entered last.
    pub fn skip_subtree(&mut self) {
        self.skip_subtree = true;
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = WalkEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.skip_subtree {
            self.next = self.next.take().and_then(|next| match next {
                WalkEvent::Enter(first_child) => first_child.parent().map(WalkEvent::Leave),
                WalkEvent::Leave(parent) => Some(WalkEvent::Leave(parent)),
            });
            self.skip_subtree = false;
        }

        let next = self.next.take();

        self.next = next.and_then(|event| {
            Some(match event {
                WalkEvent::Enter(node) => match node.first_child() {
                    Some(child) => WalkEvent::Enter(child),
                    None => WalkEvent::Leave(node),
                },
                WalkEvent::Leave(node) => {
                    if node == self.start {
                        return None;
                    }

                    match node.next_in_parent() {
                        Some(sibling) => WalkEvent::Enter(sibling),
                        None => WalkEvent::Leave(node.parent()?),
                    }
                }
            })
        });

        next
    }
}

#[derive(Clone, Copy, Debug)]
pub enum WalkEvent<'a> {
    Enter(SyntaxNode<'a>),
    Leave(SyntaxNode<'a>),
}

/// Visits `node` and its descendants top-down, each before its children.
///
/// A visitor returning [`WalkControl::SkipChildren`] (or `false`) prunes only
/// that branch.
pub fn recursive_walk<'a, R>(node: SyntaxNode<'a>, mut visit: impl FnMut(SyntaxNode<'a>) -> R)
where
    R: Into<WalkControl>,
{
    let mut preorder = Preorder::new(node);
    while let Some(event) = preorder.next() {
        if let WalkEvent::Enter(node) = event {
            if visit(node).into() == WalkControl::SkipChildren {
                preorder.skip_subtree();
            }
        }
    }
}

/// Like [`recursive_walk`], but hands the visitor the tree mutably.
///
/// Edits never add or drop nodes, so the walk stays valid whatever the
/// visitor splices or replaces.
pub fn recursive_walk_mut<R>(
    tree: &mut SyntaxTree,
    node: NodeId,
    mut visit: impl FnMut(&mut SyntaxTree, NodeId) -> Result<R>,
) -> Result<()>
where
    R: Into<WalkControl>,
{
    let mut stack = vec![node];
    while let Some(id) = stack.pop() {
        if visit(tree, id)?.into() == WalkControl::SkipChildren {
            continue;
        }
        stack.extend(tree.node(id).children().rev().map(SyntaxNode::id));
    }
    Ok(())
}

/// Node ids ordered deepest first, pre-order within a depth.
fn moonwalk_order(tree: &SyntaxTree) -> Vec<NodeId> {
    let mut order: Vec<_> = tree.nodes().map(|node| (Reverse(node.depth()), node.id())).collect();
    order.sort_by_key(|&(depth, _)| depth);
    order.into_iter().map(|(_, id)| id).collect()
}

/// Visits every node bottom-up: each node after all of its descendants and
/// before all of its ancestors, the root last.
pub fn moonwalk<'a>(tree: &'a SyntaxTree, mut visit: impl FnMut(SyntaxNode<'a>)) {
    for id in moonwalk_order(tree) {
        visit(tree.node(id));
    }
}

/// Parses `source`, moonwalks the new tree and hands it back.
pub fn moonwalk_source(
    parser: &impl Parse,
    source: &str,
    visit: impl FnMut(SyntaxNode<'_>),
) -> Result<SyntaxTree> {
    let tree = SyntaxTree::parse(parser, source)?;
    moonwalk(&tree, visit);
    Ok(tree)
}

/// [`moonwalk`] with mutable access to the tree.
pub fn moonwalk_mut(
    tree: &mut SyntaxTree,
    mut visit: impl FnMut(&mut SyntaxTree, NodeId) -> Result<()>,
) -> Result<()> {
    for id in moonwalk_order(tree) {
        visit(tree, id)?;
    }
    Ok(())
}
