//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use crate::error::EngineError;
use crate::ledger::DEFAULT_SOFT_CAP;
use serde::{Deserialize, Serialize};

fn default_cache_enabled() -> bool {
    true
}

fn default_sweep_interval() -> f64 {
    60.0
}

fn default_soft_cap() -> usize {
    DEFAULT_SOFT_CAP
}

/// Tunables for [`StatEngine`](crate::StatEngine) and
/// [`StatResolutionFacade`](crate::StatResolutionFacade).
///
/// # Examples
///
/// ```rust
/// use statforge::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{ "cache_sweep_interval": 30.0 }"#).unwrap();
/// assert_eq!(config.cache_sweep_interval, 30.0);
/// assert!(config.cache_enabled);
/// assert_eq!(config.modifier_soft_cap, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cache resolved stat sets between calls.
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// Seconds between wholesale cache invalidations.
    #[serde(default = "default_sweep_interval")]
    pub cache_sweep_interval: f64,

    /// Per-target modifier count above which ledgers log a warning.
    #[serde(default = "default_soft_cap")]
    pub modifier_soft_cap: usize,
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.cache_sweep_interval.is_finite() || self.cache_sweep_interval <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "cache_sweep_interval must be a positive number of seconds, got {}",
                self.cache_sweep_interval
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_enabled: default_cache_enabled(),
            cache_sweep_interval: default_sweep_interval(),
            modifier_soft_cap: default_soft_cap(),
        }
    }
}
