//! Decoder catalog API
//!
//! The catalog owns both decoder forests and is the entry point for loading
//! (`attach`) and reading (`lookup`). Its lifecycle is
//! `Empty -> Loading -> Published`; a published catalog is read-only until
//! `reset` empties it again.

use crate::forest::resolver::AttachmentResolver;
use crate::forest::{ForestView, Forests};
use crate::types::{CatalogError, DecoderDefinition, Result};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Lifecycle state of a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogState {
    /// No attach since creation or the last reset
    Empty,
    /// At least one attach has been made
    Loading,
    /// Read-only; attach is refused until reset
    Published,
}

impl fmt::Display for CatalogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogState::Empty => write!(f, "Empty"),
            CatalogState::Loading => write!(f, "Loading"),
            CatalogState::Published => write!(f, "Published"),
        }
    }
}

/// The program-name-scoped and unscoped decoder forests
#[derive(Debug, Clone)]
pub struct DecoderCatalog {
    forests: Forests,
    state: CatalogState,
}

impl DecoderCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            forests: Forests::default(),
            state: CatalogState::Empty,
        }
    }

    /// Discard every node and return to the `Empty` state
    pub fn reset(&mut self) {
        log::debug!(
            "Resetting decoder catalog ({} nodes discarded)",
            self.forests.arena.len()
        );
        self.forests.clear();
        self.state = CatalogState::Empty;
    }

    /// Attach one decoder definition
    ///
    /// Definitions must be attached in declaration order: sibling order,
    /// alternate chains and offset anchors all depend on it.
    ///
    /// # Returns
    /// * `Ok(())` - the definition was placed in every list it belongs to
    /// * `Err(CatalogError)` - the definition was rejected
    ///
    /// # Example
    /// ```
    /// use decoder_forest::{DecoderCatalog, DecoderDefinition};
    ///
    /// let mut catalog = DecoderCatalog::new();
    /// catalog.attach(DecoderDefinition::new("sshd").with_regex(true)).unwrap();
    /// catalog
    ///     .attach(DecoderDefinition::new("sshd-fail").with_parent("sshd").with_regex(true))
    ///     .unwrap();
    ///
    /// let roots = catalog.lookup(false);
    /// assert_eq!(roots.names(), vec!["sshd"]);
    /// ```
    pub fn attach(&mut self, definition: impl Into<Arc<DecoderDefinition>>) -> Result<()> {
        let definition = definition.into();

        if self.state == CatalogState::Published {
            return Err(CatalogError::CatalogPublished(definition.name.clone()));
        }
        self.state = CatalogState::Loading;

        let created = AttachmentResolver::attach(&mut self.forests, &definition)?;
        log::debug!(
            "Attached decoder '{}' ({}, {} node{})",
            definition.name,
            match (&definition.parent, definition.program_name_scoped) {
                (Some(parent), _) => format!("under '{}'", parent),
                (None, true) => "program-name root".to_string(),
                (None, false) => "unscoped root".to_string(),
            },
            created,
            if created == 1 { "" } else { "s" }
        );
        Ok(())
    }

    /// Mark the catalog read-only
    pub fn publish(&mut self) {
        self.state = CatalogState::Published;
    }

    /// Root list the matching engine should walk for a record
    ///
    /// Records whose program name is known use the program-name forest; all
    /// others use the unscoped forest.
    pub fn lookup(&self, has_program_name: bool) -> ForestView<'_> {
        ForestView::new(&self.forests.arena, self.forests.roots(has_program_name))
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    pub fn is_published(&self) -> bool {
        self.state == CatalogState::Published
    }

    /// Get statistics about the catalog contents
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            pn_roots: self.forests.pn_roots.len(),
            npn_roots: self.forests.npn_roots.len(),
            total_nodes: self.forests.arena.len(),
            alternate_links: self
                .forests
                .arena
                .iter()
                .filter(|node| node.has_next_alternate())
                .count(),
        }
    }
}

impl Default for DecoderCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalog statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    /// Root decoders in the program-name forest
    pub pn_roots: usize,
    /// Root decoders in the unscoped forest
    pub npn_roots: usize,
    /// Nodes in both forests, children included
    pub total_nodes: usize,
    /// Nodes followed by a same-named alternate
    pub alternate_links: usize,
}
