//! Parent resolution across both forests
//!
//! A root-level definition goes to the root list of the forest its
//! program-name scoping selects. A definition with a parent goes under every
//! root node of either forest carrying that name: program-name forest first,
//! then the unscoped forest, each in root order. Parents are only ever
//! resolved against roots, never against deeper descendants.
//!
//! When several roots match and one insert fails, the call stops there and the
//! children already added under earlier matches stay in place.

use super::inserter::ForestInserter;
use super::Forests;
use crate::types::{CatalogError, DecoderDefinition, Result};
use std::sync::Arc;

/// Routes definitions to the sibling list(s) they belong in
pub(crate) struct AttachmentResolver;

impl AttachmentResolver {
    /// Attach `definition` to `forests`
    ///
    /// # Returns
    /// * `Ok(usize)` - number of nodes created (one per matched parent)
    /// * `Err(CatalogError)` - first rejection; earlier parents keep their child
    pub(crate) fn attach(forests: &mut Forests, definition: &Arc<DecoderDefinition>) -> Result<usize> {
        let Some(parent) = definition.parent.as_deref() else {
            let roots = if definition.program_name_scoped {
                &mut forests.pn_roots
            } else {
                &mut forests.npn_roots
            };
            ForestInserter::insert(&mut forests.arena, roots, definition)?;
            return Ok(1);
        };

        let targets: Vec<_> = forests
            .pn_roots
            .iter()
            .chain(forests.npn_roots.iter())
            .copied()
            .filter(|&id| forests.arena.node(id).definition().name == parent)
            .collect();

        if targets.is_empty() {
            return Err(CatalogError::UnknownParent(parent.to_string()));
        }

        for (applied, &target) in targets.iter().enumerate() {
            let mut children = forests.arena.node_mut(target).take_children();
            let outcome = ForestInserter::insert(&mut forests.arena, &mut children, definition);
            forests.arena.node_mut(target).restore_children(children);

            if let Err(err) = outcome {
                if applied > 0 {
                    log::warn!(
                        "Decoder '{}' stays attached under {} of {} '{}' parents after a rejection",
                        definition.name,
                        applied,
                        targets.len(),
                        parent
                    );
                }
                return Err(err);
            }
        }

        Ok(targets.len())
    }
}
