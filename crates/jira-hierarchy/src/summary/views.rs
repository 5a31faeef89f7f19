//! Serializable projections of hierarchy nodes.

use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::Serialize;

use crate::domain::{Issue, IssueLink, LinkDirection, StatusCategory};
use crate::hierarchy::HierarchyNode;

/// Key, summary, status, type, points and assignee of an issue.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompactIssueView {
    /// Issue key.
    pub key: String,
    /// One-line summary.
    pub summary: String,
    /// Status name.
    pub status: String,
    /// Issue type name.
    #[serde(rename = "type")]
    pub issue_type: String,
    /// Story points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_points: Option<f64>,
    /// Assignee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl From<&Issue> for CompactIssueView {
    fn from(issue: &Issue) -> Self {
        Self {
            key: issue.key.clone(),
            summary: issue.summary.clone(),
            status: issue.status.name.clone(),
            issue_type: issue.issue_type.name.clone(),
            story_points: issue.story_points,
            assignee: issue.assignee.clone(),
        }
    }
}

/// Sprint as rendered in full output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SprintView {
    /// Sprint id.
    pub id: u64,
    /// Sprint name.
    pub name: String,
    /// Sprint state.
    pub state: String,
}

/// Fields added on top of [`CompactIssueView`] in full rendering.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetails {
    /// Status category.
    pub status_category: StatusCategory,
    /// Whether the type is a sub-task type.
    pub is_subtask: bool,
    /// Priority name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Sum of the immediate children's story points.
    pub children_story_points: f64,
    /// Labels.
    pub labels: Vec<String>,
    /// Components.
    pub components: Vec<String>,
    /// Sprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint: Option<SprintView>,
    /// Creation time, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last update time, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl From<&HierarchyNode> for IssueDetails {
    fn from(node: &HierarchyNode) -> Self {
        let issue = node.issue();
        Self {
            status_category: issue.status.category,
            is_subtask: issue.issue_type.is_subtask,
            priority: issue.priority.clone(),
            children_story_points: node.children_story_points(),
            labels: issue.labels.clone(),
            components: issue.components.clone(),
            sprint: issue.sprint.as_ref().map(|sprint| SprintView {
                id: sprint.id,
                name: sprint.name.clone(),
                state: sprint.state.to_string(),
            }),
            created: issue.created.as_ref().map(timestamp),
            updated: issue.updated.as_ref().map(timestamp),
        }
    }
}

/// One rendered node of the hierarchy tree.
///
/// `details` is present for nodes rendered with full fields.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    /// Compact projection of the issue.
    #[serde(flatten)]
    pub issue: CompactIssueView,
    /// Full-field extras.
    #[serde(flatten)]
    pub details: Option<IssueDetails>,
    /// Distance from the root.
    pub depth: usize,
    /// Rendered children.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView>,
}

impl NodeView {
    /// Render `node` and its descendants. `full` decides, per node, whether
    /// full-field details are included.
    pub(crate) fn render(node: &HierarchyNode, full: fn(&HierarchyNode) -> bool) -> Self {
        Self {
            issue: CompactIssueView::from(node.issue()),
            details: full(node).then(|| IssueDetails::from(node)),
            depth: node.depth(),
            children: node
                .children()
                .iter()
                .map(|child| Self::render(child, full))
                .collect(),
        }
    }
}

/// A linked issue as rendered in output.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkedIssueView {
    /// Relationship name.
    pub relationship: String,
    /// Link direction.
    pub direction: LinkDirection,
    /// Issue key.
    pub key: String,
    /// One-line summary.
    pub summary: String,
    /// Status name.
    pub status: String,
    /// Issue type name.
    #[serde(rename = "type")]
    pub issue_type: String,
    /// Priority name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl From<&IssueLink> for LinkedIssueView {
    fn from(link: &IssueLink) -> Self {
        Self {
            relationship: link.relationship.clone(),
            direction: link.direction,
            key: link.issue.key.clone(),
            summary: link.issue.summary.clone(),
            status: link.issue.status.name.clone(),
            issue_type: link.issue.issue_type.name.clone(),
            priority: link.issue.priority.clone(),
        }
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
