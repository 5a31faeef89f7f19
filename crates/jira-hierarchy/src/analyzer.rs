//! One-call analysis pipeline.
//!
//! Chains the builder, metrics calculator, anomaly detector and summarizer.
//! The fetch layer calls this once per tool invocation with data it has
//! already retrieved.

use chrono::{DateTime, Utc};

use crate::anomaly::AnomalyDetector;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::hierarchy::{BuildRequest, build_hierarchy};
use crate::metrics::calculate_metrics;
use crate::summary::{AnalysisOutputMode, FormattedAnalysisOutput, TokenLevel, summarize};

/// Runs the full analysis with one configuration.
#[derive(Debug)]
pub struct HierarchyAnalyzer {
    config: AnalysisConfig,
    detector: AnomalyDetector,
}

impl HierarchyAnalyzer {
    /// Create an analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`AnalysisConfig::validate`].
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let detector = AnomalyDetector::new(config.clone());
        Ok(Self { config, detector })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Build, measure, inspect and render one hierarchy.
    ///
    /// When `ceiling` is `None` it is derived from the hierarchy's node
    /// count using the configured token thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if the request is malformed.
    /// Nothing is rendered in that case.
    pub fn analyze(
        &self,
        request: BuildRequest,
        mode: AnalysisOutputMode,
        ceiling: Option<TokenLevel>,
        now: DateTime<Utc>,
    ) -> Result<FormattedAnalysisOutput> {
        let hierarchy = build_hierarchy(request)?;
        let metrics = calculate_metrics(&hierarchy);
        let anomalies = self.detector.detect(&hierarchy, now);
        let ceiling = ceiling.unwrap_or_else(|| {
            TokenLevel::for_node_count(hierarchy.total_nodes(), &self.config.token_thresholds)
        });

        tracing::debug!(
            root = %hierarchy.root().key(),
            nodes = hierarchy.total_nodes(),
            anomalies = anomalies.len(),
            completion = metrics.completion_percentage,
            ceiling = %ceiling,
            mode = %mode,
            "Analyzed issue hierarchy"
        );

        Ok(summarize(&hierarchy, &metrics, &anomalies, ceiling, mode))
    }
}

impl Default for HierarchyAnalyzer {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        Self {
            detector: AnomalyDetector::new(config.clone()),
            config,
        }
    }
}
