//! Read-only views over a built forest
//!
//! This is the traversal contract for the matching engine: try root siblings in
//! declaration order, recurse into the children of a node that matched, and
//! treat a run of same-named siblings as ordered alternates, advancing only
//! while `has_next_alternate` chains continue.

use super::node::{DecoderNode, NodeArena, NodeId};
use crate::types::DecoderDefinition;

/// Read-only view over one sibling list (a forest's roots or a child list)
#[derive(Debug, Clone, Copy)]
pub struct ForestView<'a> {
    arena: &'a NodeArena,
    list: &'a [NodeId],
}

impl<'a> ForestView<'a> {
    pub(crate) fn new(arena: &'a NodeArena, list: &'a [NodeId]) -> Self {
        Self { arena, list }
    }

    /// Number of nodes in this list
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Node at `position`, in declaration order
    pub fn get(&self, position: usize) -> Option<NodeRef<'a>> {
        self.list
            .get(position)
            .map(|&id| NodeRef::new(self.arena, id))
    }

    /// First node of the list
    pub fn first(&self) -> Option<NodeRef<'a>> {
        self.get(0)
    }

    /// All nodes, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let arena = self.arena;
        let list = self.list;
        list.iter().map(move |&id| NodeRef::new(arena, id))
    }

    /// All nodes named `name`, in declaration order
    pub fn find(&self, name: &str) -> Vec<NodeRef<'a>> {
        self.iter().filter(|node| node.name() == name).collect()
    }

    /// Names of the nodes, in declaration order
    pub fn names(&self) -> Vec<&'a str> {
        self.iter().map(|node| node.name()).collect()
    }
}

/// Handle to one node, borrowed from its catalog
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    arena: &'a NodeArena,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn new(arena: &'a NodeArena, id: NodeId) -> Self {
        Self { arena, id }
    }

    fn node(&self) -> &'a DecoderNode {
        self.arena.node(self.id)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn definition(&self) -> &'a DecoderDefinition {
        self.node().definition()
    }

    pub fn name(&self) -> &'a str {
        &self.definition().name
    }

    pub fn has_next_alternate(&self) -> bool {
        self.node().has_next_alternate()
    }

    /// View over this node's child list
    pub fn children(&self) -> ForestView<'a> {
        ForestView::new(self.arena, self.node().children())
    }

    /// The next node in the same sibling list
    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.node()
            .next_sibling()
            .map(|id| NodeRef::new(self.arena, id))
    }

    /// This node followed by its alternates, in the order the matcher tries them
    pub fn alternates(&self) -> Alternates<'a> {
        Alternates {
            current: Some(*self),
        }
    }
}

/// Iterator over an alternate chain, see [`NodeRef::alternates`]
#[derive(Debug, Clone)]
pub struct Alternates<'a> {
    current: Option<NodeRef<'a>>,
}

impl<'a> Iterator for Alternates<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;

        if current.has_next_alternate() {
            // Unrelated siblings may sit between two alternates
            let mut cursor = current.next_sibling();
            while let Some(candidate) = cursor {
                if candidate.name() == current.name() {
                    self.current = Some(candidate);
                    break;
                }
                cursor = candidate.next_sibling();
            }
        }

        Some(current)
    }
}
