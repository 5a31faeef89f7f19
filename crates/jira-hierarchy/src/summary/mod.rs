//! Token-adaptive rendering of an analyzed hierarchy.
//!
//! The caller asks for an [`AnalysisOutputMode`]; the environment imposes a
//! [`TokenLevel`] ceiling. Both map onto [`DetailLevel`] and the lower one is
//! rendered:
//!
//! | Level    | `hierarchy`                        | `children`        | `linkedIssues` |
//! |----------|------------------------------------|-------------------|----------------|
//! | full     | full fields at every depth         | -                 | yes            |
//! | detailed | full root, compact descendants     | -                 | yes            |
//! | compact  | -                                  | immediate, compact| -              |
//! | summary  | -                                  | -                 | -              |

mod level;
mod views;

pub use level::{AnalysisOutputMode, DetailLevel, TokenLevel, effective_level};
pub use views::{CompactIssueView, IssueDetails, LinkedIssueView, NodeView, SprintView};

use schemars::JsonSchema;
use serde::Serialize;

use crate::anomaly::Anomaly;
use crate::hierarchy::Hierarchy;
use crate::metrics::HierarchyMetrics;

/// Headline facts about the analyzed hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Root issue key.
    pub root_key: String,
    /// Root issue summary.
    pub title: String,
    /// Root issue type.
    pub issue_type: String,
    /// Root status name.
    pub status: String,
    /// Key of the root's parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_key: Option<String>,
    /// Nodes in the tree, root included.
    pub total_nodes: usize,
    /// Immediate children of the root.
    pub child_count: usize,
    /// Linked issues kept on the hierarchy.
    pub linked_count: usize,
    /// Number of anomalies found.
    pub anomaly_count: usize,
    /// Whether the child limit was hit.
    pub truncated: bool,
    /// Level the output was rendered at.
    pub detail_level: DetailLevel,
}

/// Final analysis record, ready for direct serialization.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormattedAnalysisOutput {
    /// Headline facts.
    pub summary: AnalysisSummary,
    /// Aggregate metrics.
    pub metrics: HierarchyMetrics,
    /// Anomalies, ranked by severity.
    pub anomalies: Vec<Anomaly>,
    /// Rendered tree (full and detailed levels).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<NodeView>,
    /// Root's immediate children (compact level).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CompactIssueView>>,
    /// Linked issues (detailed level and above).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_issues: Option<Vec<LinkedIssueView>>,
    /// Notes on truncation or a forced downgrade.
    #[serde(rename = "_info", skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Render the analysis at the lower of `ceiling` and `mode`.
///
/// Pure: inputs are only read, and identical inputs produce identical
/// output.
#[must_use]
pub fn summarize(
    hierarchy: &Hierarchy,
    metrics: &HierarchyMetrics,
    anomalies: &[Anomaly],
    ceiling: TokenLevel,
    mode: AnalysisOutputMode,
) -> FormattedAnalysisOutput {
    let requested = mode.detail_level();
    let level = effective_level(ceiling, mode);
    let root = hierarchy.root();

    let tree = match level {
        DetailLevel::Full => Some(NodeView::render(root, |_| true)),
        DetailLevel::Detailed => Some(NodeView::render(root, |node| node.depth() == 0)),
        DetailLevel::Compact | DetailLevel::Summary => None,
    };

    let children = (level == DetailLevel::Compact).then(|| {
        root.children()
            .iter()
            .map(|child| CompactIssueView::from(child.issue()))
            .collect()
    });

    let linked_issues = (level >= DetailLevel::Detailed).then(|| {
        hierarchy
            .linked_issues()
            .iter()
            .map(LinkedIssueView::from)
            .collect()
    });

    let mut notes = Vec::new();
    if let Some(truncation) = hierarchy.truncation_info() {
        notes.push(truncation.to_string());
    }
    if level < requested {
        tracing::info!(
            root = %root.key(),
            requested = %requested,
            effective = %level,
            ceiling = %ceiling,
            nodes = hierarchy.total_nodes(),
            "Output detail reduced to fit token budget"
        );
        notes.push(format!(
            "Output reduced from {requested} to {level} detail to fit the token budget \
             ({} issues in hierarchy)",
            hierarchy.total_nodes()
        ));
    }

    let issue = root.issue();
    FormattedAnalysisOutput {
        summary: AnalysisSummary {
            root_key: issue.key.clone(),
            title: issue.summary.clone(),
            issue_type: issue.issue_type.name.clone(),
            status: issue.status.name.clone(),
            parent_key: hierarchy.parent().map(|parent| parent.key.clone()),
            total_nodes: hierarchy.total_nodes(),
            child_count: root.children().len(),
            linked_count: hierarchy.linked_issues().len(),
            anomaly_count: anomalies.len(),
            truncated: hierarchy.is_truncated(),
            detail_level: level,
        },
        metrics: metrics.clone(),
        anomalies: anomalies.to_vec(),
        hierarchy: tree,
        children,
        linked_issues,
        info: (!notes.is_empty()).then(|| notes.join(" ")),
    }
}
