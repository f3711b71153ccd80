//! Loader configuration types
//!
//! This module defines the options the load orchestrator honours. Everything
//! about individual decoders comes from their definitions; these settings
//! only decide what happens when a definition is rejected.

use serde::{Deserialize, Serialize};

/// Configuration for a full catalog load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Keep attaching after a rejected definition (the load still fails)
    #[serde(default)]
    pub continue_on_error: bool,

    /// Optional: stop after this many rejections even when continuing
    #[serde(default)]
    pub max_rejections: Option<usize>,
}

impl LoaderConfig {
    /// Create a loader configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: keep going after a rejection
    pub fn with_continue_on_error(mut self, enabled: bool) -> Self {
        self.continue_on_error = enabled;
        self
    }

    /// Builder method: cap the number of rejections collected
    pub fn with_max_rejections(mut self, limit: usize) -> Self {
        self.max_rejections = Some(limit);
        self
    }

    /// Check whether the load should go on after `rejections` rejections
    pub fn should_continue(&self, rejections: usize) -> bool {
        if !self.continue_on_error {
            return rejections == 0;
        }
        match self.max_rejections {
            Some(limit) => rejections < limit,
            None => true,
        }
    }
}
