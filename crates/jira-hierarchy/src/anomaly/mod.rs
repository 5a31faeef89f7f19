//! Process anomaly detection.
//!
//! The detector runs a fixed, ordered battery of independent rules over a
//! hierarchy. Each rule is a pure check producing at most one [`Anomaly`].
//! Results are ranked by severity; rules of equal severity keep their
//! registration order.
//!
//! # Rules
//!
//! 1. Points mismatch: root estimate vs. the sum of its children's estimates
//! 2. Unestimated children: immediate children without story points
//! 3. Stale in-progress: in-progress issues without recent updates
//! 4. Unassigned sprint items: open sprint work nobody owns

mod rules;

pub use rules::{PointsMismatch, StaleInProgress, UnassignedSprintItems, UnestimatedChildren};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AnalysisConfig;
use crate::hierarchy::Hierarchy;
use crate::ranking::rank_and_truncate;

/// How urgent an anomaly is. Declaration order is rank order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Needs attention now.
    Critical,
    /// Likely a process problem.
    Warning,
    /// Worth knowing.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// Kind of anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    /// Root estimate disagrees with the children's total.
    PointsMismatch,
    /// Children without estimates.
    UnestimatedChildren,
    /// In-progress issues without recent updates.
    StaleInProgress,
    /// Sprint work without an assignee.
    UnassignedSprintItems,
}

/// A rule-detected deviation from healthy process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    /// Kind of anomaly.
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,

    /// Severity.
    pub severity: Severity,

    /// Short headline.
    pub title: String,

    /// What was found.
    pub description: String,

    /// Keys of affected issues, optionally annotated (e.g. "PROJ-1 (7 days)").
    pub affected_issues: Vec<String>,

    /// Suggested remediation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Inputs shared by every rule.
#[derive(Debug, Clone, Copy)]
pub struct DetectionContext<'a> {
    /// Hierarchy under analysis.
    pub hierarchy: &'a Hierarchy,
    /// Thresholds.
    pub config: &'a AnalysisConfig,
    /// Reference time for age-based rules.
    pub now: DateTime<Utc>,
}

/// A single independent anomaly check.
pub trait AnomalyRule: Send + Sync {
    /// Stable rule name, used in logs.
    fn name(&self) -> &'static str;

    /// Run the check. Must not depend on other rules.
    fn check(&self, ctx: &DetectionContext<'_>) -> Option<Anomaly>;
}

/// Runs an ordered battery of [`AnomalyRule`]s.
pub struct AnomalyDetector {
    config: AnalysisConfig,
    rules: Vec<Box<dyn AnomalyRule>>,
}

impl AnomalyDetector {
    /// Detector with the standard rules, in their standard order.
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_rules(
            config,
            vec![
                Box::new(PointsMismatch),
                Box::new(UnestimatedChildren),
                Box::new(StaleInProgress),
                Box::new(UnassignedSprintItems),
            ],
        )
    }

    /// Detector with a custom rule battery. Registration order breaks ties
    /// between anomalies of equal severity.
    #[must_use]
    pub fn with_rules(config: AnalysisConfig, rules: Vec<Box<dyn AnomalyRule>>) -> Self {
        Self { config, rules }
    }

    /// Names of the registered rules, in order.
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name())
    }

    /// Run every rule and return the findings ranked by severity.
    #[must_use]
    pub fn detect(&self, hierarchy: &Hierarchy, now: DateTime<Utc>) -> Vec<Anomaly> {
        let ctx = DetectionContext {
            hierarchy,
            config: &self.config,
            now,
        };

        let found: Vec<Anomaly> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let anomaly = rule.check(&ctx)?;
                tracing::debug!(
                    rule = rule.name(),
                    severity = %anomaly.severity,
                    affected = anomaly.affected_issues.len(),
                    "Anomaly detected"
                );
                Some(anomaly)
            })
            .collect();

        rank_and_truncate(found, |anomaly| anomaly.severity, self.config.max_anomalies)
    }
}

impl fmt::Debug for AnomalyDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnomalyDetector")
            .field("config", &self.config)
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Run the standard rule battery with `config`.
#[must_use]
pub fn detect_anomalies(
    hierarchy: &Hierarchy,
    config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> Vec<Anomaly> {
    AnomalyDetector::new(config.clone()).detect(hierarchy, now)
}
