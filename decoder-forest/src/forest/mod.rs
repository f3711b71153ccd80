//! Decoder forests
//!
//! This module contains the node arena, the sibling-list inserter, the parent
//! resolver and the read-only views handed to the matching engine.

pub mod node;
pub mod view;
pub(crate) mod inserter;
pub(crate) mod resolver;

// Re-export key types for convenience
pub use node::{DecoderNode, NodeArena, NodeId};
pub use view::{Alternates, ForestView, NodeRef};

/// The two root lists of a catalog and the arena backing them
#[derive(Debug, Clone, Default)]
pub(crate) struct Forests {
    pub(crate) arena: NodeArena,
    /// Roots that apply only when the program name is known
    pub(crate) pn_roots: Vec<NodeId>,
    /// Roots that apply regardless of the program name
    pub(crate) npn_roots: Vec<NodeId>,
}

impl Forests {
    /// Root list for the given scoping
    pub(crate) fn roots(&self, has_program_name: bool) -> &[NodeId] {
        if has_program_name {
            &self.pn_roots
        } else {
            &self.npn_roots
        }
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.pn_roots.clear();
        self.npn_roots.clear();
    }
}
