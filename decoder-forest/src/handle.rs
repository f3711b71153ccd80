//! Atomic catalog publication
//!
//! Readers pin the current catalog with [`CatalogHandle::current`] and walk it
//! without locking; the published catalog is never mutated. A reload builds a
//! fresh catalog off to the side and swaps it in with one atomic store, so a
//! reader sees either the previous catalog or the new one, never a partial
//! forest. Reloads are serialized by a lock; lookups never take it.

use crate::catalog::DecoderCatalog;
use crate::config::LoaderConfig;
use crate::loader::{load_definitions, LoadReport};
use crate::types::DecoderDefinition;
use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared, atomically replaceable reference to the published catalog
pub struct CatalogHandle {
    current: ArcSwap<DecoderCatalog>,
    reload_lock: Mutex<()>,
}

impl CatalogHandle {
    /// Create a handle serving an empty published catalog
    pub fn new() -> Self {
        let mut empty = DecoderCatalog::new();
        empty.publish();
        Self {
            current: ArcSwap::from_pointee(empty),
            reload_lock: Mutex::new(()),
        }
    }

    /// The catalog readers should use right now
    pub fn current(&self) -> Arc<DecoderCatalog> {
        self.current.load_full()
    }

    /// Rebuild the catalog from `definitions` and publish it if the load succeeds
    ///
    /// On any rejection the freshly built catalog is dropped and the previously
    /// published one stays authoritative.
    pub fn reload<I, D>(&self, definitions: I, config: &LoaderConfig) -> LoadReport
    where
        I: IntoIterator<Item = D>,
        D: Into<Arc<DecoderDefinition>>,
    {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut catalog = DecoderCatalog::new();
        let report = load_definitions(&mut catalog, definitions, config);

        if report.is_success() {
            self.current.store(Arc::new(catalog));
            log::info!("Published decoder catalog ({} nodes)", report.stats.total_nodes);
        } else {
            log::warn!(
                "Decoder reload failed with {} rejection(s); keeping previous catalog",
                report.rejected.len()
            );
        }

        report
    }

    /// Publish a catalog the caller built itself, returning the one it replaces
    ///
    /// The caller is responsible for only handing over catalogs whose load
    /// succeeded.
    pub fn publish(&self, mut catalog: DecoderCatalog) -> Arc<DecoderCatalog> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);

        catalog.publish();
        log::info!("Published decoder catalog ({} nodes)", catalog.stats().total_nodes);
        self.current.swap(Arc::new(catalog))
    }
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::new()
    }
}
