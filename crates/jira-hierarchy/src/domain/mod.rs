//! Domain types for Jira issue data.
//!
//! These records are handed over by the issue fetch layer already
//! materialized. They deserialize from camelCase JSON so the fetch layer can
//! pass through what it assembled without an extra mapping step.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Normalized lifecycle bucket of a workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    /// Not started ("To Do" and friends).
    New,

    /// Work has started.
    Indeterminate,

    /// Work is finished.
    Done,

    /// The workflow did not assign a category.
    Undefined,
}

impl StatusCategory {
    /// Lowercase name as used by the Jira REST API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Indeterminate => "indeterminate",
            Self::Done => "done",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "indeterminate" => Ok(Self::Indeterminate),
            "done" => Ok(Self::Done),
            "undefined" => Ok(Self::Undefined),
            other => Err(Error::invalid(
                "status category",
                format!("'{other}' (expected new, indeterminate, done or undefined)"),
            )),
        }
    }
}

/// Workflow status of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
    /// Display name, e.g. "In Review".
    pub name: String,

    /// Category the status belongs to.
    pub category: StatusCategory,
}

impl IssueStatus {
    /// Create a status from a display name and category.
    pub fn new(name: impl Into<String>, category: StatusCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

/// Issue type such as Epic, Story or Sub-task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueType {
    /// Display name.
    pub name: String,

    /// Whether this type is a sub-task type.
    #[serde(default)]
    pub is_subtask: bool,
}

impl IssueType {
    /// Create a standard (non sub-task) issue type.
    pub fn standard(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_subtask: false,
        }
    }

    /// Create a sub-task issue type.
    pub fn subtask(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_subtask: true,
        }
    }
}

/// State of a sprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
    /// Sprint is running.
    Active,

    /// Sprint has been completed.
    Closed,

    /// Sprint is planned but not started.
    Future,
}

impl fmt::Display for SprintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Future => "future",
        })
    }
}

/// Sprint an issue is scheduled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    /// Numeric sprint id.
    pub id: u64,

    /// Sprint name.
    pub name: String,

    /// Sprint state.
    pub state: SprintState,
}

/// Minimal projection of an issue used for parent and linked references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRef {
    /// Issue key, e.g. "PROJ-42".
    pub key: String,

    /// One-line summary.
    pub summary: String,

    /// Workflow status.
    pub status: IssueStatus,

    /// Issue type.
    pub issue_type: IssueType,

    /// Priority name, if set.
    pub priority: Option<String>,
}

/// Direction of an issue link relative to the issue holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// The other issue points at this one ("is blocked by").
    Inward,

    /// This issue points at the other one ("blocks").
    Outward,
}

/// A link from one issue to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLink {
    /// Human-readable relationship, e.g. "blocks" or "relates to".
    pub relationship: String,

    /// Link direction.
    pub direction: LinkDirection,

    /// The linked issue.
    pub issue: IssueRef,
}

/// A Jira issue as fetched from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Issue key, e.g. "PROJ-42".
    pub key: String,

    /// One-line summary.
    pub summary: String,

    /// Workflow status.
    pub status: IssueStatus,

    /// Issue type.
    pub issue_type: IssueType,

    /// Priority name.
    pub priority: Option<String>,

    /// Assignee display name.
    pub assignee: Option<String>,

    /// Labels, in the order Jira returned them.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Component names.
    #[serde(default)]
    pub components: Vec<String>,

    /// Story point estimate.
    pub story_points: Option<f64>,

    /// Sprint the issue is scheduled in.
    pub sprint: Option<Sprint>,

    /// Creation timestamp.
    pub created: Option<DateTime<Utc>>,

    /// Last update timestamp.
    pub updated: Option<DateTime<Utc>>,

    /// Parent issue (epic or parent of a sub-task).
    pub parent: Option<IssueRef>,

    /// Sub-task references.
    #[serde(default)]
    pub subtasks: Vec<IssueRef>,

    /// Issue links.
    #[serde(default)]
    pub links: Vec<IssueLink>,
}

impl Issue {
    /// Create an issue in the "To Do" status with type "Story" and no
    /// optional fields set.
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            status: IssueStatus::new("To Do", StatusCategory::New),
            issue_type: IssueType::standard("Story"),
            priority: None,
            assignee: None,
            labels: Vec::new(),
            components: Vec::new(),
            story_points: None,
            sprint: None,
            created: None,
            updated: None,
            parent: None,
            subtasks: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Set the workflow status.
    #[must_use]
    pub fn with_status(mut self, name: impl Into<String>, category: StatusCategory) -> Self {
        self.status = IssueStatus::new(name, category);
        self
    }

    /// Set the issue type.
    #[must_use]
    pub fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = issue_type;
        self
    }

    /// Set the priority name.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Set the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Set the story point estimate.
    #[must_use]
    pub fn with_story_points(mut self, points: f64) -> Self {
        self.story_points = Some(points);
        self
    }

    /// Set the labels.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the component names.
    #[must_use]
    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = components.into_iter().map(Into::into).collect();
        self
    }

    /// Schedule the issue in a sprint.
    #[must_use]
    pub fn with_sprint(mut self, sprint: Sprint) -> Self {
        self.sprint = Some(sprint);
        self
    }

    /// Set the creation timestamp.
    #[must_use]
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the last update timestamp.
    #[must_use]
    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    /// Set the parent reference.
    #[must_use]
    pub fn with_parent(mut self, parent: IssueRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Add an issue link.
    #[must_use]
    pub fn with_link(
        mut self,
        relationship: impl Into<String>,
        direction: LinkDirection,
        issue: IssueRef,
    ) -> Self {
        self.links.push(IssueLink {
            relationship: relationship.into(),
            direction,
            issue,
        });
        self
    }

    /// Whether the issue is in the done category.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status.category == StatusCategory::Done
    }

    /// Whether the issue is in progress (indeterminate category).
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status.category == StatusCategory::Indeterminate
    }

    /// Project the issue down to a lookup reference.
    #[must_use]
    pub fn to_ref(&self) -> IssueRef {
        IssueRef {
            key: self.key.clone(),
            summary: self.summary.clone(),
            status: self.status.clone(),
            issue_type: self.issue_type.clone(),
            priority: self.priority.clone(),
        }
    }
}
