//! Rooted issue trees.
//!
//! A [`Hierarchy`] owns its root [`HierarchyNode`], and every node owns its
//! children exclusively. Nodes carry no back-pointers. The root's parent and
//! its linked issues are stored once, on the hierarchy, as lookup-only
//! references.
//!
//! Hierarchies are produced by [`build_hierarchy`] and are immutable
//! afterwards.

mod builder;

pub use builder::{BuildRequest, DEFAULT_MAX_CHILDREN, DepthMode, FetchedIssue, build_hierarchy};

use crate::domain::{Issue, IssueLink, IssueRef};

/// One issue in a hierarchy, with its depth and owned children.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    issue: Issue,
    depth: usize,
    children: Vec<HierarchyNode>,
    children_story_points: f64,
}

impl HierarchyNode {
    pub(crate) fn new(issue: Issue, depth: usize, children: Vec<HierarchyNode>) -> Self {
        let children_story_points = children
            .iter()
            .map(|child| child.issue.story_points.unwrap_or(0.0))
            .sum();
        Self {
            issue,
            depth,
            children,
            children_story_points,
        }
    }

    /// The wrapped issue.
    #[must_use]
    pub fn issue(&self) -> &Issue {
        &self.issue
    }

    /// Issue key of the wrapped issue.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.issue.key
    }

    /// Distance from the root (root = 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Children in fetch order.
    #[must_use]
    pub fn children(&self) -> &[HierarchyNode] {
        &self.children
    }

    /// Sum of the immediate children's story points, unestimated children
    /// counting as zero.
    #[must_use]
    pub fn children_story_points(&self) -> f64 {
        self.children_story_points
    }

    /// Pre-order iterator over this node and all of its descendants.
    #[must_use]
    pub fn iter(&self) -> Nodes<'_> {
        Nodes { stack: vec![self] }
    }
}

/// The tree of one root issue plus its fetched descendants and links.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    root: HierarchyNode,
    parent: Option<IssueRef>,
    linked_issues: Vec<IssueLink>,
    total_nodes: usize,
    truncated: bool,
    truncation_info: Option<String>,
}

impl Hierarchy {
    /// The root node.
    #[must_use]
    pub fn root(&self) -> &HierarchyNode {
        &self.root
    }

    /// The root's parent, if it has one.
    #[must_use]
    pub fn parent(&self) -> Option<&IssueRef> {
        self.parent.as_ref()
    }

    /// Issues linked from the root, in link order.
    #[must_use]
    pub fn linked_issues(&self) -> &[IssueLink] {
        &self.linked_issues
    }

    /// Number of nodes in the tree, root included.
    #[must_use]
    pub fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    /// Whether the child limit cut off some children.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Explanation of the truncation, if any.
    #[must_use]
    pub fn truncation_info(&self) -> Option<&str> {
        self.truncation_info.as_deref()
    }

    /// Pre-order iterator over every node.
    #[must_use]
    pub fn iter(&self) -> Nodes<'_> {
        self.root.iter()
    }
}

impl<'a> IntoIterator for &'a Hierarchy {
    type Item = &'a HierarchyNode;
    type IntoIter = Nodes<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over hierarchy nodes.
#[derive(Debug)]
pub struct Nodes<'a> {
    stack: Vec<&'a HierarchyNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a HierarchyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
