//! The standard anomaly rules.

use super::{Anomaly, AnomalyRule, AnomalyType, DetectionContext, Severity};
use crate::domain::Issue;

/// Slack when comparing a mismatch ratio to the tolerance, so decimal
/// estimates sitting exactly on the boundary are not flagged.
const RATIO_EPSILON: f64 = 1e-9;

/// Root estimate disagrees with the sum of its children's estimates by more
/// than the configured tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointsMismatch;

impl AnomalyRule for PointsMismatch {
    fn name(&self) -> &'static str {
        "points_mismatch"
    }

    fn check(&self, ctx: &DetectionContext<'_>) -> Option<Anomaly> {
        let root = ctx.hierarchy.root();
        let parent_points = root.issue().story_points?;
        let children_points = root.children_story_points();
        // A zero estimate is a placeholder, not a commitment to compare against.
        if parent_points <= 0.0 || children_points <= 0.0 {
            return None;
        }

        let diff = children_points - parent_points;
        let ratio = diff.abs() / parent_points.max(children_points);
        if ratio - ctx.config.points_mismatch_tolerance <= RATIO_EPSILON {
            return None;
        }

        let direction = if diff > 0.0 { "exceeds" } else { "falls short of" };
        Some(Anomaly {
            anomaly_type: AnomalyType::PointsMismatch,
            severity: Severity::Warning,
            title: "Story points mismatch".to_string(),
            description: format!(
                "Children total {children_points} story points, which {direction} \
                 the parent estimate of {parent_points} ({:.0}% difference)",
                ratio * 100.0
            ),
            affected_issues: vec![root.key().to_string()],
            suggestion: Some(if diff > 0.0 {
                "Re-estimate the parent or split the extra scope into a separate issue".to_string()
            } else {
                "Re-estimate the parent or add the missing work as child issues".to_string()
            }),
        })
    }
}

/// Immediate children without a story point estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnestimatedChildren;

impl AnomalyRule for UnestimatedChildren {
    fn name(&self) -> &'static str {
        "unestimated_children"
    }

    fn check(&self, ctx: &DetectionContext<'_>) -> Option<Anomaly> {
        let children = ctx.hierarchy.root().children();
        let unestimated: Vec<String> = children
            .iter()
            .filter(|child| child.issue().story_points.is_none())
            .map(|child| child.key().to_string())
            .collect();
        if unestimated.is_empty() {
            return None;
        }

        let severity = if unestimated.len() * 2 > children.len() {
            Severity::Warning
        } else {
            Severity::Info
        };

        Some(Anomaly {
            anomaly_type: AnomalyType::UnestimatedChildren,
            severity,
            title: "Unestimated child issues".to_string(),
            description: format!(
                "{} of {} child issues have no story points",
                unestimated.len(),
                children.len()
            ),
            affected_issues: unestimated,
            suggestion: Some(
                "Estimate these issues during the next refinement session".to_string(),
            ),
        })
    }
}

/// In-progress issues anywhere in the tree without updates for the
/// configured number of days.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaleInProgress;

impl AnomalyRule for StaleInProgress {
    fn name(&self) -> &'static str {
        "stale_in_progress"
    }

    fn check(&self, ctx: &DetectionContext<'_>) -> Option<Anomaly> {
        let threshold = ctx.config.stale_after_days;
        let stale: Vec<String> = ctx
            .hierarchy
            .iter()
            .map(|node| node.issue())
            .filter(|issue| issue.is_in_progress())
            .filter_map(|issue| {
                let days = (ctx.now - issue.updated?).num_days();
                (days >= threshold).then(|| format!("{} ({days} days)", issue.key))
            })
            .collect();
        if stale.is_empty() {
            return None;
        }

        Some(Anomaly {
            anomaly_type: AnomalyType::StaleInProgress,
            severity: Severity::Warning,
            title: "Stale in-progress issues".to_string(),
            description: format!(
                "{} in-progress issue(s) not updated in {threshold} or more days",
                stale.len()
            ),
            affected_issues: stale,
            suggestion: Some(
                "Check whether these issues are blocked and update or move them".to_string(),
            ),
        })
    }
}

/// Open sprint work with no assignee, anywhere in the tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnassignedSprintItems;

impl AnomalyRule for UnassignedSprintItems {
    fn name(&self) -> &'static str {
        "unassigned_sprint_items"
    }

    fn check(&self, ctx: &DetectionContext<'_>) -> Option<Anomaly> {
        let unassigned: Vec<String> = ctx
            .hierarchy
            .iter()
            .map(|node| node.issue())
            .filter(|issue| is_unowned_sprint_work(issue))
            .map(|issue| issue.key.clone())
            .collect();
        if unassigned.is_empty() {
            return None;
        }

        Some(Anomaly {
            anomaly_type: AnomalyType::UnassignedSprintItems,
            severity: Severity::Info,
            title: "Unassigned sprint items".to_string(),
            description: format!(
                "{} sprint issue(s) are not done and have no assignee",
                unassigned.len()
            ),
            affected_issues: unassigned,
            suggestion: Some("Assign an owner so the sprint commitment is tracked".to_string()),
        })
    }
}

fn is_unowned_sprint_work(issue: &Issue) -> bool {
    issue.sprint.is_some() && !issue.is_done() && issue.assignee.is_none()
}
