//! Sibling list insertion
//!
//! Appends a decoder to one sibling list (a forest's roots or a node's
//! children) while enforcing the chain rules for same-named siblings:
//!
//! - a later same-named decoder is an alternate pattern only when both it and
//!   the earlier one carry a regex or an external matcher
//! - an alternate may not declare its own prematch or first-time-seen fields
//! - `AfterPrevRegex` needs a same-named predecessor with a prematch or regex,
//!   so it can never open a list
//!
//! Insertion runs in two phases. The plan phase walks the list and decides
//! everything without touching it; the commit phase allocates the node, links
//! it after the current tail and flags the earlier alternates. A rejected
//! definition leaves the list and its nodes exactly as they were.

use super::node::{NodeArena, NodeId};
use crate::types::{CatalogError, DecoderDefinition, Result};
use std::sync::Arc;

/// Appends definitions to sibling lists
pub(crate) struct ForestInserter;

/// Outcome of comparing the new definition with one same-named sibling
#[derive(Debug)]
enum SiblingVerdict {
    /// The new node extends this sibling's alternate chain
    Alternate {
        /// The sibling can anchor an `AfterPrevRegex` continuation
        anchors: bool,
    },
    /// The definition cannot join this list
    Reject(CatalogError),
}

/// Everything the commit phase needs to apply
#[derive(Debug, Default)]
struct InsertPlan {
    /// Same-named siblings whose `has_next_alternate` flag gets set
    alternates: Vec<NodeId>,
}

impl ForestInserter {
    /// Append `definition` at the tail of `list`
    ///
    /// # Returns
    /// * `Ok(NodeId)` - id of the new node
    /// * `Err(CatalogError)` - the definition was rejected; nothing changed
    pub(crate) fn insert(
        arena: &mut NodeArena,
        list: &mut Vec<NodeId>,
        definition: &Arc<DecoderDefinition>,
    ) -> Result<NodeId> {
        let plan = Self::plan(arena, list, definition)?;
        Self::commit(arena, list, definition, plan)
    }

    fn plan(arena: &NodeArena, list: &[NodeId], definition: &DecoderDefinition) -> Result<InsertPlan> {
        // First entry at this level: nothing to anchor to
        if list.is_empty() {
            if definition.continues_previous_match() {
                return Err(CatalogError::InvalidOffsetAnchor(definition.name.clone()));
            }
            return Ok(InsertPlan::default());
        }

        let mut plan = InsertPlan::default();
        let mut anchored = false;

        for &id in list {
            let sibling = arena.node(id).definition();
            if sibling.name != definition.name {
                continue;
            }

            match Self::check_sibling(sibling, definition) {
                SiblingVerdict::Alternate { anchors } => {
                    anchored |= anchors;
                    plan.alternates.push(id);
                }
                SiblingVerdict::Reject(err) => return Err(err),
            }
        }

        if definition.continues_previous_match() && !anchored {
            return Err(CatalogError::InvalidOffsetAnchor(definition.name.clone()));
        }

        Ok(plan)
    }

    fn check_sibling(sibling: &DecoderDefinition, definition: &DecoderDefinition) -> SiblingVerdict {
        let anchors = sibling.exposes_anchor() && definition.continues_previous_match();

        if definition.has_prematch {
            // The whole chain shares the first decoder's prematch
            SiblingVerdict::Reject(CatalogError::MultipleDefinitionsConflict(
                definition.name.clone(),
            ))
        } else if definition.has_first_time_seen {
            SiblingVerdict::Reject(CatalogError::DuplicateFtsConflict(definition.name.clone()))
        } else if sibling.is_regex_capable() && definition.is_regex_capable() {
            SiblingVerdict::Alternate { anchors }
        } else {
            SiblingVerdict::Reject(CatalogError::DuplicateDecoderName(definition.name.clone()))
        }
    }

    fn commit(
        arena: &mut NodeArena,
        list: &mut Vec<NodeId>,
        definition: &Arc<DecoderDefinition>,
        plan: InsertPlan,
    ) -> Result<NodeId> {
        // Reserve before allocating so a failure leaves no orphan node behind
        list.try_reserve(1)
            .map_err(|source| CatalogError::AllocationFailure {
                name: definition.name.clone(),
                source,
            })?;
        let id = arena.alloc(Arc::clone(definition))?;

        if let Some(&tail) = list.last() {
            arena.node_mut(tail).set_next_sibling(id);
        }
        for sibling in plan.alternates {
            log::trace!(
                "Decoder '{}' (node {}) gains alternate node {}",
                definition.name,
                sibling.index(),
                id.index()
            );
            arena.node_mut(sibling).mark_next_alternate();
        }

        list.push(id);
        Ok(id)
    }
}
