#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! Settable by the host between repair cycles, immutable during one.
//! Validation collects every violation instead of stopping at the first,
//! and a rejected configuration leaves the previous one in force.

use serde::{Deserialize, Serialize};

/// Tunables for the repair engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum overlap magnitude (percent of the smaller block) before a
    /// pair is reported. Default: 0.1.
    pub overlap_threshold_pct: f64,
    /// Slide blocks left to close gaps after overlap repair. Default: false.
    pub auto_fill_gaps: bool,
    /// Keep blocks at their time-derived positions; suppresses gap
    /// filling entirely. Default: false.
    pub preserve_time_positions: bool,
    /// Separation left in front of each moved block, in percent of the
    /// track (same unit as `left`/`width`). Default: 0.0.
    pub padding_pct: f64,
    /// Quiet period after a change notification before a cycle runs.
    /// Default: 100.
    pub debounce_ms: u64,
    /// Sliding window for the feedback-loop breaker. `0` disables loop
    /// detection. Default: 3000.
    pub loop_window_ms: u64,
    /// Cycles tolerated inside one window before the breaker trips.
    /// Must be at least 1. Default: 2.
    pub max_cycles_per_window: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overlap_threshold_pct: 0.1,
            auto_fill_gaps: false,
            preserve_time_positions: false,
            padding_pct: 0.0,
            debounce_ms: 100,
            loop_window_ms: 3000,
            max_cycles_per_window: 2,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration, collecting every violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !self.overlap_threshold_pct.is_finite() || self.overlap_threshold_pct < 0.0 {
            errors.push(format!(
                "overlap_threshold_pct must be finite and >= 0, got {}",
                self.overlap_threshold_pct
            ));
        }
        if !self.padding_pct.is_finite() || self.padding_pct < 0.0 {
            errors.push(format!(
                "padding_pct must be finite and >= 0, got {}",
                self.padding_pct
            ));
        }
        if self.max_cycles_per_window == 0 {
            errors.push("max_cycles_per_window must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

/// Error produced by [`EngineConfig::validate`].
#[derive(Debug)]
pub enum ConfigError {
    /// One message per violated constraint.
    Invalid(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => {
                write!(f, "invalid engine config: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}
