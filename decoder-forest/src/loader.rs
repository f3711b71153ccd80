//! Full catalog loads
//!
//! Feeds a sequence of definitions into a catalog in declaration order,
//! collects every rejection into a [`LoadReport`], and publishes the catalog
//! only when nothing was rejected.

use crate::catalog::{CatalogStats, DecoderCatalog};
use crate::config::LoaderConfig;
use crate::types::{CatalogError, DecoderDefinition, ErrorKind, Timestamp};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// One rejected definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Position of the definition in the input sequence
    pub index: usize,
    /// Name of the rejected decoder
    pub decoder: String,
    /// Parent it referenced, if any
    pub parent: Option<String>,
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl Rejection {
    fn new(index: usize, definition: &DecoderDefinition, err: &CatalogError) -> Self {
        Self {
            index,
            decoder: definition.name.clone(),
            parent: definition.parent.clone(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of a full load, suitable for operator-facing reports
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Definitions attached successfully
    pub attached: usize,
    /// Definitions rejected, in input order
    pub rejected: Vec<Rejection>,
    /// True if the load stopped before consuming every definition
    pub aborted: bool,
    /// True if the catalog was published
    pub published: bool,
    /// Catalog contents after the load
    pub stats: CatalogStats,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl LoadReport {
    /// True if every definition was attached and the catalog published
    pub fn is_success(&self) -> bool {
        self.published && self.rejected.is_empty()
    }

    /// The first rejection, if any
    pub fn first_rejection(&self) -> Option<&Rejection> {
        self.rejected.first()
    }
}

/// Rebuild `catalog` from `definitions`
///
/// The catalog is reset first, so a load is always a full rebuild. The load
/// stops at the first rejection unless `config` says otherwise, and always
/// stops on a fatal error. The catalog is published only when no definition
/// was rejected; otherwise it is left in the `Loading` state and must not be
/// handed to readers.
pub fn load_definitions<I, D>(
    catalog: &mut DecoderCatalog,
    definitions: I,
    config: &LoaderConfig,
) -> LoadReport
where
    I: IntoIterator<Item = D>,
    D: Into<Arc<DecoderDefinition>>,
{
    let started_at = Utc::now();
    catalog.reset();

    log::info!("Loading decoder catalog");

    let mut attached = 0;
    let mut rejected = Vec::new();
    let mut aborted = false;

    let mut definitions = definitions.into_iter().enumerate().peekable();
    while let Some((index, definition)) = definitions.next() {
        let definition: Arc<DecoderDefinition> = definition.into();

        match catalog.attach(Arc::clone(&definition)) {
            Ok(()) => attached += 1,
            Err(err) => {
                log::warn!("Rejected decoder #{} '{}': {}", index, definition.name, err);
                let fatal = err.kind().is_fatal();
                rejected.push(Rejection::new(index, &definition, &err));

                if fatal || !config.should_continue(rejected.len()) {
                    aborted = definitions.peek().is_some();
                    if fatal {
                        log::error!("Decoder load aborted: {}", err);
                    }
                    break;
                }
            }
        }
    }

    let published = rejected.is_empty();
    if published {
        catalog.publish();
    }

    let stats = catalog.stats();
    log::info!(
        "Decoder catalog load finished: {} attached, {} rejected, {} nodes ({} program-name roots, {} unscoped roots)",
        attached,
        rejected.len(),
        stats.total_nodes,
        stats.pn_roots,
        stats.npn_roots
    );

    LoadReport {
        attached,
        rejected,
        aborted,
        published,
        stats,
        started_at,
        finished_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogState;

    fn regex(name: &str) -> DecoderDefinition {
        DecoderDefinition::new(name).with_regex(true)
    }

    #[test]
    fn test_successful_load_publishes() {
        let mut catalog = DecoderCatalog::new();
        let report = load_definitions(
            &mut catalog,
            vec![regex("sshd"), regex("sshd-fail").with_parent("sshd")],
            &LoaderConfig::new(),
        );

        assert!(report.is_success());
        assert_eq!(report.attached, 2);
        assert!(!report.aborted);
        assert_eq!(catalog.state(), CatalogState::Published);
        assert_eq!(report.stats.total_nodes, 2);
    }

    #[test]
    fn test_stops_at_first_rejection() {
        let mut catalog = DecoderCatalog::new();
        let report = load_definitions(
            &mut catalog,
            vec![
                regex("a"),
                regex("b").with_parent("missing"),
                regex("c"),
            ],
            &LoaderConfig::new(),
        );

        assert!(!report.is_success());
        assert!(report.aborted);
        assert_eq!(report.attached, 1);
        let rejection = report.first_rejection().unwrap();
        assert_eq!(rejection.index, 1);
        assert_eq!(rejection.decoder, "b");
        assert_eq!(rejection.parent.as_deref(), Some("missing"));
        assert_eq!(rejection.kind, ErrorKind::UnknownParent);
        assert_eq!(catalog.state(), CatalogState::Loading);
    }

    #[test]
    fn test_last_definition_rejected_is_not_aborted() {
        let mut catalog = DecoderCatalog::new();
        let report = load_definitions(
            &mut catalog,
            vec![regex("a"), regex("b").with_parent("missing")],
            &LoaderConfig::new(),
        );

        assert!(!report.aborted);
        assert!(!report.published);
    }

    #[test]
    fn test_continue_on_error_collects_every_rejection() {
        let mut catalog = DecoderCatalog::new();
        let report = load_definitions(
            &mut catalog,
            vec![
                regex("a").with_parent("x"),
                regex("b"),
                DecoderDefinition::new("b"),
                regex("c"),
            ],
            &LoaderConfig::new().with_continue_on_error(true),
        );

        assert_eq!(report.attached, 2);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[1].kind, ErrorKind::DuplicateDecoderName);
        assert!(!report.published);
        assert_eq!(catalog.lookup(false).names(), vec!["b", "c"]);
    }

    #[test]
    fn test_load_resets_previous_contents() {
        let mut catalog = DecoderCatalog::new();
        load_definitions(&mut catalog, vec![regex("old")], &LoaderConfig::new());
        let report = load_definitions(&mut catalog, vec![regex("new")], &LoaderConfig::new());

        assert!(report.is_success());
        assert_eq!(catalog.lookup(false).names(), vec!["new"]);
    }

    #[test]
    fn test_report_serializes() {
        let mut catalog = DecoderCatalog::new();
        let report = load_definitions(
            &mut catalog,
            vec![regex("a").with_parent("x")],
            &LoaderConfig::new(),
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rejected"][0]["kind"], "unknown_parent");
        assert_eq!(json["published"], false);
    }
}
