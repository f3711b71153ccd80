//! Decoder Forest Library
//!
//! Builds the decoder trees a log-analysis matching engine walks to classify
//! incoming records. Decoder definitions are attached one at a time, in
//! declaration order, into two forests: one for records whose program name is
//! known and one for all others.
//!
//! # Architecture
//!
//! - A definition without a parent becomes a root of the forest its
//!   program-name scoping selects
//! - A definition with a parent becomes a child of every root of either forest
//!   carrying that name
//! - Consecutive same-named siblings form a chain of alternate patterns, subject
//!   to prematch, first-time-seen and offset-anchor rules
//! - A load is always a full rebuild; a failed load is never published
//!
//! The library does NOT:
//! - Parse decoder rule files
//! - Evaluate prematch/regex patterns against log lines
//! - Remove or update individual decoders
//!
//! # Example Usage
//!
//! ```
//! use decoder_forest::{CatalogHandle, DecoderDefinition, LoaderConfig};
//!
//! let handle = CatalogHandle::new();
//! let report = handle.reload(
//!     vec![
//!         DecoderDefinition::new("sshd").with_program_name(true).with_prematch(true),
//!         DecoderDefinition::new("sshd-fail").with_parent("sshd").with_regex(true),
//!     ],
//!     &LoaderConfig::new(),
//! );
//! assert!(report.is_success());
//!
//! let catalog = handle.current();
//! for root in catalog.lookup(true).iter() {
//!     for child in root.children().iter() {
//!         println!("{} -> {}", root.name(), child.name());
//!     }
//! }
//! ```

// Public modules
pub mod catalog;
pub mod config;
pub mod forest;
pub mod handle;
pub mod loader;
pub mod types;

// Re-export main types for convenience
pub use catalog::{CatalogState, CatalogStats, DecoderCatalog};
pub use config::LoaderConfig;
pub use forest::{Alternates, DecoderNode, ForestView, NodeId, NodeRef};
pub use handle::CatalogHandle;
pub use loader::{load_definitions, LoadReport, Rejection};
pub use types::{CatalogError, DecoderDefinition, ErrorKind, OffsetPolicy, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
