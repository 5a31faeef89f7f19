//! Aggregate health metrics over a hierarchy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::StatusCategory;
use crate::hierarchy::Hierarchy;

/// Issue counts per status category.
///
/// Issues in the undefined category only count toward `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusDistribution {
    /// Issues not started.
    pub new: usize,
    /// Issues in progress.
    pub in_progress: usize,
    /// Issues finished.
    pub done: usize,
    /// All issues.
    pub total: usize,
}

/// Aggregate metrics derived from a hierarchy.
///
/// Recomputed on every call and never stored on the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyMetrics {
    /// Number of issues in the hierarchy.
    pub total_issues: usize,
    /// Sum of all story points.
    pub total_story_points: f64,
    /// Issues carrying a story point estimate.
    pub estimated_issues: usize,
    /// Issues without an estimate.
    pub unestimated_issues: usize,
    /// Counts per status category.
    pub status_distribution: StatusDistribution,
    /// Story points of done issues.
    pub completed_story_points: f64,
    /// Story points of issues not done.
    pub remaining_story_points: f64,
    /// Completion in percent, 0 to 100.
    pub completion_percentage: u8,
}

/// Compute metrics for `hierarchy` in a single pre-order walk.
///
/// Completion is point-based when any points exist. Without points it falls
/// back to the share of done issues, since a point ratio over zero estimates
/// says nothing.
#[must_use]
pub fn calculate_metrics(hierarchy: &Hierarchy) -> HierarchyMetrics {
    let mut metrics = HierarchyMetrics::default();

    for node in hierarchy {
        let issue = node.issue();
        metrics.total_issues += 1;

        match issue.story_points {
            Some(points) => {
                metrics.estimated_issues += 1;
                if issue.is_done() {
                    metrics.completed_story_points += points;
                } else {
                    metrics.remaining_story_points += points;
                }
            }
            None => metrics.unestimated_issues += 1,
        }

        let distribution = &mut metrics.status_distribution;
        distribution.total += 1;
        match issue.status.category {
            StatusCategory::New => distribution.new += 1,
            StatusCategory::Indeterminate => distribution.in_progress += 1,
            StatusCategory::Done => distribution.done += 1,
            StatusCategory::Undefined => {}
        }
    }

    // Summing the two halves keeps completed + remaining == total exact.
    metrics.total_story_points = metrics.completed_story_points + metrics.remaining_story_points;
    metrics.completion_percentage = completion_percentage(&metrics);
    metrics
}

fn completion_percentage(metrics: &HierarchyMetrics) -> u8 {
    if metrics.total_story_points > 0.0 {
        percent(metrics.completed_story_points / metrics.total_story_points)
    } else if metrics.status_distribution.done > 0 {
        #[allow(clippy::cast_precision_loss)]
        let ratio = metrics.status_distribution.done as f64 / metrics.total_issues as f64;
        percent(ratio)
    } else {
        0
    }
}

/// Round a ratio in [0, 1] to a whole percentage, half-up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(ratio: f64) -> u8 {
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
