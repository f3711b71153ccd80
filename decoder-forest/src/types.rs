//! Core types for the decoder forest library
//!
//! This module defines the immutable decoder definitions that the catalog is
//! built from, and the errors an attach can produce. Definitions arrive here
//! already parsed - the library never reads rule files or evaluates patterns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;
use std::fmt;

/// Timestamp type used in load reports
pub type Timestamp = DateTime<Utc>;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Where a decoder's pattern starts matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetPolicy {
    /// Pattern is evaluated from the start of the decoded region
    #[default]
    None,
    /// Pattern continues from where the previous same-named decoder stopped
    AfterPrevRegex,
}

/// One decoder's identity and matching capabilities
///
/// Created once by the configuration parser and read-only afterwards. Names are
/// not unique: consecutive siblings may share one to form an alternate chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderDefinition {
    /// Decoder name (shared by every alternate in a chain)
    pub name: String,
    /// Name of the root decoder this one attaches under (None = root level)
    #[serde(default)]
    pub parent: Option<String>,
    /// True if the decoder only applies when the program name is known
    #[serde(default)]
    pub program_name_scoped: bool,
    /// True if the decoder declares a prematch pattern
    #[serde(default)]
    pub has_prematch: bool,
    /// True if the decoder declares its own regex
    #[serde(default)]
    pub has_regex: bool,
    /// True if the decoder delegates extraction to an external (plugin) matcher
    #[serde(default)]
    pub has_external_matcher: bool,
    /// True if the decoder owns first-time-seen bookkeeping
    #[serde(default)]
    pub has_first_time_seen: bool,
    /// Whether the pattern is anchored to a previous match's offset
    #[serde(default)]
    pub offset_policy: OffsetPolicy,
}

impl DecoderDefinition {
    /// Create a root-level, unscoped definition with no capabilities
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            program_name_scoped: false,
            has_prematch: false,
            has_regex: false,
            has_external_matcher: false,
            has_first_time_seen: false,
            offset_policy: OffsetPolicy::None,
        }
    }

    /// Builder method: attach under the root decoder(s) named `parent`
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Builder method: scope the decoder to the program-name forest
    pub fn with_program_name(mut self, scoped: bool) -> Self {
        self.program_name_scoped = scoped;
        self
    }

    /// Builder method: declare a prematch
    pub fn with_prematch(mut self, enabled: bool) -> Self {
        self.has_prematch = enabled;
        self
    }

    /// Builder method: declare a regex
    pub fn with_regex(mut self, enabled: bool) -> Self {
        self.has_regex = enabled;
        self
    }

    /// Builder method: declare an external matcher
    pub fn with_external_matcher(mut self, enabled: bool) -> Self {
        self.has_external_matcher = enabled;
        self
    }

    /// Builder method: declare first-time-seen fields
    pub fn with_first_time_seen(mut self, enabled: bool) -> Self {
        self.has_first_time_seen = enabled;
        self
    }

    /// Builder method: set the offset policy
    pub fn with_offset_policy(mut self, policy: OffsetPolicy) -> Self {
        self.offset_policy = policy;
        self
    }

    /// True if the definition has no parent reference
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True if a chained decoder may continue from this one's match
    pub fn exposes_anchor(&self) -> bool {
        self.has_prematch || self.has_regex
    }

    /// True if the definition carries an own regex or an external matcher
    pub fn is_regex_capable(&self) -> bool {
        self.has_regex || self.has_external_matcher
    }

    /// True if the definition continues from a previous regex match
    pub fn continues_previous_match(&self) -> bool {
        self.offset_policy == OffsetPolicy::AfterPrevRegex
    }
}

/// Errors that can occur while attaching decoders
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Decoder '{0}' shares its name with a sibling and cannot declare its own prematch")]
    MultipleDefinitionsConflict(String),

    #[error("Decoder '{0}' shares its name with a sibling and cannot declare first-time-seen fields")]
    DuplicateFtsConflict(String),

    #[error("Duplicate decoder name '{0}': both definitions need a regex or external matcher")]
    DuplicateDecoderName(String),

    #[error("Decoder '{0}' continues after a previous regex but no same-named predecessor has a prematch or regex")]
    InvalidOffsetAnchor(String),

    #[error("Parent decoder not found among root decoders: {0}")]
    UnknownParent(String),

    #[error("Out of memory while attaching decoder '{name}'")]
    AllocationFailure {
        name: String,
        #[source]
        source: TryReserveError,
    },

    #[error("Catalog is published; reset it before attaching decoder '{0}'")]
    CatalogPublished(String),
}

impl CatalogError {
    /// Error kind, for reports and programmatic matching
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::MultipleDefinitionsConflict(_) => ErrorKind::MultipleDefinitionsConflict,
            CatalogError::DuplicateFtsConflict(_) => ErrorKind::DuplicateFtsConflict,
            CatalogError::DuplicateDecoderName(_) => ErrorKind::DuplicateDecoderName,
            CatalogError::InvalidOffsetAnchor(_) => ErrorKind::InvalidOffsetAnchor,
            CatalogError::UnknownParent(_) => ErrorKind::UnknownParent,
            CatalogError::AllocationFailure { .. } => ErrorKind::AllocationFailure,
            CatalogError::CatalogPublished(_) => ErrorKind::CatalogPublished,
        }
    }

    /// The decoder name carried by the error (the parent name for `UnknownParent`)
    pub fn decoder_name(&self) -> &str {
        match self {
            CatalogError::MultipleDefinitionsConflict(name)
            | CatalogError::DuplicateFtsConflict(name)
            | CatalogError::DuplicateDecoderName(name)
            | CatalogError::InvalidOffsetAnchor(name)
            | CatalogError::UnknownParent(name)
            | CatalogError::CatalogPublished(name) => name,
            CatalogError::AllocationFailure { name, .. } => name,
        }
    }
}

/// Kind of a [`CatalogError`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MultipleDefinitionsConflict,
    DuplicateFtsConflict,
    DuplicateDecoderName,
    InvalidOffsetAnchor,
    UnknownParent,
    AllocationFailure,
    CatalogPublished,
}

impl ErrorKind {
    /// Fatal kinds abort the whole load; all others reject one definition
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorKind::AllocationFailure)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::MultipleDefinitionsConflict => "MultipleDefinitionsConflict",
            ErrorKind::DuplicateFtsConflict => "DuplicateFtsConflict",
            ErrorKind::DuplicateDecoderName => "DuplicateDecoderName",
            ErrorKind::InvalidOffsetAnchor => "InvalidOffsetAnchor",
            ErrorKind::UnknownParent => "UnknownParent",
            ErrorKind::AllocationFailure => "AllocationFailure",
            ErrorKind::CatalogPublished => "CatalogPublished",
        };
        write!(f, "{}", label)
    }
}
