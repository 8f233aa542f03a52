//! Orchestrator configuration
//!
//! Mirrors the option dictionary of the Sofomore framework: whether an archive
//! is kept, in which order kernels are picked, and how often progress is
//! displayed. Builder setters follow the usual `Config::new().field(..)` shape.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SofomoreError};
use crate::schedule::UpdateOrder;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SofomoreConfig {
    /// Track every non-dominated point evaluated so far
    pub archive: bool,

    /// Merge the archive into each kernel's indicator front
    pub archive_in_indicator: bool,

    /// Ordering key used to pick kernels in `ask`
    pub update_order: UpdateOrder,

    /// Seed for the random ordering key
    pub seed: Option<u64>,

    /// Display progress every `verb_disp` iterations (0 disables)
    pub verb_disp: usize,
}

impl Default for SofomoreConfig {
    fn default() -> Self {
        Self {
            archive: true,
            archive_in_indicator: false,
            update_order: UpdateOrder::Random,
            seed: None,
            verb_disp: 100,
        }
    }
}

impl SofomoreConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.archive_in_indicator && !self.archive {
            return Err(SofomoreError::Config(
                "archive_in_indicator requires archive = true".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SofomoreError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Enable or disable the archive
    pub fn archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }

    /// Fold the archive into indicator fronts
    pub fn archive_in_indicator(mut self, enabled: bool) -> Self {
        self.archive_in_indicator = enabled;
        self
    }

    /// Set the kernel update order
    pub fn update_order(mut self, order: UpdateOrder) -> Self {
        self.update_order = order;
        self
    }

    /// Seed the random update order
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the display period
    pub fn verb_disp(mut self, every: usize) -> Self {
        self.verb_disp = every;
        self
    }
}
