//! Analysis thresholds and their configuration sources.
//!
//! Defaults live in named constants. They can be overridden from a YAML
//! document or from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{Error, Result};

/// Days an in-progress issue may go without updates before it is stale.
pub const DEFAULT_STALE_DAYS: i64 = 5;

/// Relative difference between parent and children story points that is
/// still tolerated.
pub const DEFAULT_POINTS_MISMATCH_TOLERANCE: f64 = 0.10;

/// Largest hierarchy rendered at the FULL token level.
pub const DEFAULT_FULL_MAX_NODES: usize = 25;

/// Largest hierarchy rendered at the DETAILED token level.
pub const DEFAULT_DETAILED_MAX_NODES: usize = 100;

/// Largest hierarchy rendered at the COMPACT token level.
pub const DEFAULT_COMPACT_MAX_NODES: usize = 200;

const STALE_DAYS_ENV: &str = "JIRA_ANALYSIS_STALE_DAYS";
const MISMATCH_TOLERANCE_ENV: &str = "JIRA_ANALYSIS_MISMATCH_TOLERANCE";

/// Node-count limits used to derive a token ceiling from hierarchy size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenThresholds {
    /// Hierarchies with at most this many nodes get the FULL level.
    pub full_max_nodes: usize,
    /// Hierarchies with at most this many nodes get the DETAILED level.
    pub detailed_max_nodes: usize,
    /// Hierarchies with at most this many nodes get the COMPACT level.
    pub compact_max_nodes: usize,
}

impl Default for TokenThresholds {
    fn default() -> Self {
        Self {
            full_max_nodes: DEFAULT_FULL_MAX_NODES,
            detailed_max_nodes: DEFAULT_DETAILED_MAX_NODES,
            compact_max_nodes: DEFAULT_COMPACT_MAX_NODES,
        }
    }
}

/// Configuration for hierarchy analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Staleness window for in-progress issues, in days.
    pub stale_after_days: i64,

    /// Tolerated relative story point mismatch (0.10 = 10%).
    pub points_mismatch_tolerance: f64,

    /// Cap on the number of anomalies reported. `None` reports all.
    pub max_anomalies: Option<usize>,

    /// Node-count limits for deriving the token ceiling.
    pub token_thresholds: TokenThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stale_after_days: DEFAULT_STALE_DAYS,
            points_mismatch_tolerance: DEFAULT_POINTS_MISMATCH_TOLERANCE,
            max_anomalies: None,
            token_thresholds: TokenThresholds::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from a YAML document.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML for this shape or
    /// if the resulting values fail [`AnalysisConfig::validate`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from environment variables.
    ///
    /// Reads:
    /// - `JIRA_ANALYSIS_STALE_DAYS`: staleness window in days (default: 5)
    /// - `JIRA_ANALYSIS_MISMATCH_TOLERANCE`: mismatch tolerance as a fraction (default: 0.10)
    ///
    /// Unparsable or out-of-range values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| env::var(name).ok())
    }

    /// Apply environment-style overrides looked up through `lookup`.
    ///
    /// Empty values are treated as unset. Invalid values are logged and the
    /// current setting is kept.
    #[must_use]
    pub(crate) fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(raw) = var(STALE_DAYS_ENV) {
            match raw.parse::<i64>() {
                Ok(days) if days >= 0 => self.stale_after_days = days,
                _ => {
                    tracing::warn!(
                        env_var = STALE_DAYS_ENV,
                        value = %raw,
                        default = self.stale_after_days,
                        "Invalid value, using default"
                    );
                }
            }
        }

        if let Some(raw) = var(MISMATCH_TOLERANCE_ENV) {
            match raw.parse::<f64>() {
                Ok(tolerance) if tolerance.is_finite() && tolerance >= 0.0 => {
                    self.points_mismatch_tolerance = tolerance;
                }
                _ => {
                    tracing::warn!(
                        env_var = MISMATCH_TOLERANCE_ENV,
                        value = %raw,
                        default = self.points_mismatch_tolerance,
                        "Invalid value, using default"
                    );
                }
            }
        }

        self
    }

    /// Check that every threshold is in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a negative staleness window, a negative
    /// or non-finite tolerance, or token thresholds that are not ascending.
    pub fn validate(&self) -> Result<()> {
        if self.stale_after_days < 0 {
            return Err(Error::Config(format!(
                "staleAfterDays must be non-negative, got {}",
                self.stale_after_days
            )));
        }
        if !self.points_mismatch_tolerance.is_finite() || self.points_mismatch_tolerance < 0.0 {
            return Err(Error::Config(format!(
                "pointsMismatchTolerance must be a non-negative number, got {}",
                self.points_mismatch_tolerance
            )));
        }
        let t = &self.token_thresholds;
        if t.full_max_nodes > t.detailed_max_nodes || t.detailed_max_nodes > t.compact_max_nodes {
            return Err(Error::Config(format!(
                "tokenThresholds must be ascending (full {} <= detailed {} <= compact {})",
                t.full_max_nodes, t.detailed_max_nodes, t.compact_max_nodes
            )));
        }
        Ok(())
    }
}
