//! Decoder nodes and the arena that owns them
//!
//! Nodes are addressed by stable [`NodeId`] indices into a single arena per
//! catalog. A node holds its child list and the id of its next sibling, so a
//! failed insert never leaves a dangling link behind.

use crate::types::{CatalogError, DecoderDefinition, Result};
use std::sync::Arc;

/// Stable index of a node inside its catalog's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// A tree node wrapping one decoder definition
#[derive(Debug, Clone)]
pub struct DecoderNode {
    /// Shared with every other node created from the same definition
    definition: Arc<DecoderDefinition>,
    /// Child list, in declaration order
    children: Vec<NodeId>,
    /// Next node in the sibling list this node belongs to
    next: Option<NodeId>,
    /// Set once a later same-named sibling is appended as an alternate
    has_next_alternate: bool,
}

impl DecoderNode {
    fn new(definition: Arc<DecoderDefinition>) -> Self {
        Self {
            definition,
            children: Vec::new(),
            next: None,
            has_next_alternate: false,
        }
    }

    /// The wrapped definition
    pub fn definition(&self) -> &DecoderDefinition {
        &self.definition
    }

    /// Ids of the child nodes, in declaration order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Id of the next sibling, if any
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next
    }

    /// True if a later sibling with the same name is an alternate pattern
    pub fn has_next_alternate(&self) -> bool {
        self.has_next_alternate
    }

    pub(crate) fn set_next_sibling(&mut self, next: NodeId) {
        self.next = Some(next);
    }

    pub(crate) fn mark_next_alternate(&mut self) {
        self.has_next_alternate = true;
    }

    pub(crate) fn take_children(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn restore_children(&mut self, children: Vec<NodeId>) {
        self.children = children;
    }
}

/// Owner of every node in one catalog
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<DecoderNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a childless node for `definition`
    pub(crate) fn alloc(&mut self, definition: Arc<DecoderDefinition>) -> Result<NodeId> {
        self.nodes
            .try_reserve(1)
            .map_err(|source| CatalogError::AllocationFailure {
                name: definition.name.clone(),
                source,
            })?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(DecoderNode::new(definition));
        Ok(id)
    }

    /// Look up a node; ids are only ever handed out by this arena
    pub fn node(&self, id: NodeId) -> &DecoderNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut DecoderNode {
        &mut self.nodes[id.0]
    }

    /// Iterate every node in allocation order
    pub fn iter(&self) -> impl Iterator<Item = &DecoderNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }
}
