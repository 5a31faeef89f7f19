//! Assembly of fetched issue data into a [`Hierarchy`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::{Hierarchy, HierarchyNode};
use crate::domain::Issue;
use crate::error::{Error, Result};

/// Child limit used when the caller does not choose one.
pub const DEFAULT_MAX_CHILDREN: usize = 100;

/// How much of the tree the fetch layer retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthMode {
    /// Root and its immediate children.
    Shallow,

    /// Down to grandchildren.
    #[default]
    Standard,

    /// Down to great-grandchildren.
    Deep,
}

impl DepthMode {
    /// Deepest node depth kept for this mode.
    #[must_use]
    pub fn max_depth(self) -> usize {
        match self {
            Self::Shallow => 1,
            Self::Standard => 2,
            Self::Deep => 3,
        }
    }

    /// Map a numeric level count (1 to 3) onto a mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for anything outside 1..=3, negative
    /// values included.
    pub fn from_levels(levels: i64) -> Result<Self> {
        match levels {
            1 => Ok(Self::Shallow),
            2 => Ok(Self::Standard),
            3 => Ok(Self::Deep),
            _ => Err(Error::invalid(
                "depth",
                format!("{levels} (expected 1, 2 or 3 levels)"),
            )),
        }
    }
}

impl fmt::Display for DepthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shallow => "shallow",
            Self::Standard => "standard",
            Self::Deep => "deep",
        })
    }
}

impl FromStr for DepthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "shallow" => Ok(Self::Shallow),
            "standard" => Ok(Self::Standard),
            "deep" => Ok(Self::Deep),
            other => Err(Error::invalid(
                "depth",
                format!("'{other}' (expected shallow, standard or deep)"),
            )),
        }
    }
}

/// An issue together with the descendants fetched for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedIssue {
    /// The issue itself.
    pub issue: Issue,

    /// Its fetched children, in fetch order.
    #[serde(default)]
    pub children: Vec<FetchedIssue>,
}

impl FetchedIssue {
    /// An issue whose children were not fetched.
    #[must_use]
    pub fn leaf(issue: Issue) -> Self {
        Self {
            issue,
            children: Vec::new(),
        }
    }

    /// An issue with fetched children.
    #[must_use]
    pub fn with_children(issue: Issue, children: Vec<FetchedIssue>) -> Self {
        Self { issue, children }
    }
}

impl From<Issue> for FetchedIssue {
    fn from(issue: Issue) -> Self {
        Self::leaf(issue)
    }
}

/// Everything the builder needs to assemble one hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    /// The root issue, carrying its parent, sub-task and link references.
    pub root: Issue,

    /// Fetched children of the root, in fetch order.
    pub children: Vec<FetchedIssue>,

    /// How deep the fetch went.
    pub depth: DepthMode,

    /// Whether to keep the root's issue links.
    pub include_links: bool,

    /// Maximum number of immediate children to attach.
    pub max_children: usize,

    /// Total children known to exist upstream, when the fetch layer stopped
    /// at its own limit.
    pub total_children: Option<usize>,
}

impl BuildRequest {
    /// Request for `root` with no children, standard depth, links included
    /// and the default child limit.
    #[must_use]
    pub fn new(root: Issue) -> Self {
        Self {
            root,
            children: Vec::new(),
            depth: DepthMode::default(),
            include_links: true,
            max_children: DEFAULT_MAX_CHILDREN,
            total_children: None,
        }
    }

    /// Set the fetched children.
    #[must_use]
    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FetchedIssue>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    /// Set the depth mode.
    #[must_use]
    pub fn with_depth(mut self, depth: DepthMode) -> Self {
        self.depth = depth;
        self
    }

    /// Choose whether links are kept.
    #[must_use]
    pub fn with_links(mut self, include_links: bool) -> Self {
        self.include_links = include_links;
        self
    }

    /// Set the child limit.
    #[must_use]
    pub fn with_max_children(mut self, max_children: usize) -> Self {
        self.max_children = max_children;
        self
    }

    /// Record the upstream child total.
    #[must_use]
    pub fn with_total_children(mut self, total: usize) -> Self {
        self.total_children = Some(total);
        self
    }
}

/// Assemble fetched issues into a [`Hierarchy`].
///
/// The root lands at depth 0 and each supplied child at depth 1. Deeper
/// descendants are kept down to the depth mode's limit. Only the first
/// `max_children` children are attached; when more existed the hierarchy is
/// marked truncated with an explanatory message.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `max_children` is zero, if any story
/// point value is negative or not finite, or if an issue key appears more
/// than once in the tree.
pub fn build_hierarchy(request: BuildRequest) -> Result<Hierarchy> {
    let BuildRequest {
        root,
        children,
        depth,
        include_links,
        max_children,
        total_children,
    } = request;

    if max_children == 0 {
        return Err(Error::invalid("maxChildren", "must be at least 1"));
    }
    validate_points(&root)?;

    let available = children
        .len()
        .max(total_children.unwrap_or(0))
        .max(root.subtasks.len());

    let mut seen = HashSet::from([root.key.clone()]);
    let mut total_nodes = 1;
    let max_depth = depth.max_depth();

    let attached = children
        .into_iter()
        .take(max_children)
        .map(|child| attach(child, 1, max_depth, &mut seen, &mut total_nodes))
        .collect::<Result<Vec<_>>>()?;

    let shown = attached.len();
    let truncated = available > max_children;
    let truncation_info = truncated.then(|| {
        format!("Showing {shown} of {available} child issues (limit: {max_children})")
    });

    let parent = root.parent.clone();
    let linked_issues = if include_links {
        root.links.clone()
    } else {
        Vec::new()
    };

    if truncated {
        tracing::info!(
            root = %root.key,
            shown,
            available,
            max_children,
            "Child limit reached, hierarchy truncated"
        );
    }
    tracing::debug!(
        root = %root.key,
        depth = %depth,
        total_nodes,
        links = linked_issues.len(),
        "Built issue hierarchy"
    );

    Ok(Hierarchy {
        root: HierarchyNode::new(root, 0, attached),
        parent,
        linked_issues,
        total_nodes,
        truncated,
        truncation_info,
    })
}

fn attach(
    fetched: FetchedIssue,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<String>,
    total_nodes: &mut usize,
) -> Result<HierarchyNode> {
    let FetchedIssue { issue, children } = fetched;

    validate_points(&issue)?;
    if !seen.insert(issue.key.clone()) {
        return Err(Error::invalid(
            "children",
            format!("issue {} appears more than once in the hierarchy", issue.key),
        ));
    }
    *total_nodes += 1;

    let nodes = if depth < max_depth {
        children
            .into_iter()
            .map(|child| attach(child, depth + 1, max_depth, seen, total_nodes))
            .collect::<Result<Vec<_>>>()?
    } else {
        if !children.is_empty() {
            tracing::debug!(
                key = %issue.key,
                dropped = children.len(),
                max_depth,
                "Dropping descendants beyond depth limit"
            );
        }
        Vec::new()
    };

    Ok(HierarchyNode::new(issue, depth, nodes))
}

fn validate_points(issue: &Issue) -> Result<()> {
    match issue.story_points {
        Some(points) if !points.is_finite() || points < 0.0 => Err(Error::invalid(
            "storyPoints",
            format!("{} has {points}, expected a non-negative number", issue.key),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IssueType, LinkDirection, StatusCategory};
    use rstest::rstest;

    fn story(key: &str, points: Option<f64>) -> Issue {
        let issue = Issue::new(key, format!("{key} summary"));
        match points {
            Some(p) => issue.with_story_points(p),
            None => issue,
        }
    }

    fn epic_with_children(count: usize) -> BuildRequest {
        let children = (1..=count).map(|i| story(&format!("STORY-{i}"), Some(1.0)));
        BuildRequest::new(story("EPIC-1", Some(10.0))).with_children(children)
    }

    #[test]
    fn test_build_sets_depth_and_children_points() {
        let request = BuildRequest::new(story("EPIC-1", Some(20.0)))
            .with_children([story("STORY-1", Some(8.0)), story("STORY-2", Some(5.0))]);

        let hierarchy = build_hierarchy(request).expect("valid request should build");

        assert_eq!(hierarchy.root().depth(), 0);
        assert_eq!(hierarchy.total_nodes(), 3);
        assert!(!hierarchy.is_truncated());
        assert!(hierarchy.truncation_info().is_none());
        assert!((hierarchy.root().children_story_points() - 13.0).abs() < f64::EPSILON);
        for child in hierarchy.root().children() {
            assert_eq!(child.depth(), 1);
        }
    }

    #[test]
    fn test_build_preserves_fetch_order() {
        let request = BuildRequest::new(story("EPIC-1", None)).with_children([
            story("STORY-3", None),
            story("STORY-1", None),
            story("STORY-2", None),
        ]);

        let hierarchy = build_hierarchy(request).expect("valid request should build");
        let keys: Vec<&str> = hierarchy.root().children().iter().map(HierarchyNode::key).collect();
        assert_eq!(keys, vec!["STORY-3", "STORY-1", "STORY-2"]);
    }

    #[test]
    fn test_build_truncates_at_max_children() {
        let request = epic_with_children(5).with_max_children(3);

        let hierarchy = build_hierarchy(request).expect("valid request should build");

        assert_eq!(hierarchy.root().children().len(), 3);
        assert_eq!(hierarchy.total_nodes(), 4);
        assert!(hierarchy.is_truncated());
        assert_eq!(
            hierarchy.truncation_info(),
            Some("Showing 3 of 5 child issues (limit: 3)")
        );
    }

    #[test]
    fn test_build_uses_upstream_total_for_truncation() {
        let request = epic_with_children(2)
            .with_max_children(2)
            .with_total_children(40);

        let hierarchy = build_hierarchy(request).expect("valid request should build");

        assert!(hierarchy.is_truncated());
        assert_eq!(
            hierarchy.truncation_info(),
            Some("Showing 2 of 40 child issues (limit: 2)")
        );
    }

    #[test]
    fn test_build_exact_limit_is_not_truncated() {
        let hierarchy = build_hierarchy(epic_with_children(3).with_max_children(3))
            .expect("valid request should build");
        assert!(!hierarchy.is_truncated());
    }

    #[test]
    fn test_build_rejects_zero_max_children() {
        let err = build_hierarchy(epic_with_children(1).with_max_children(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "maxChildren", .. }));
    }

    #[rstest]
    #[case::negative(-1.0)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn test_build_rejects_invalid_story_points(#[case] points: f64) {
        let request = BuildRequest::new(story("EPIC-1", None))
            .with_children([story("STORY-1", Some(points))]);

        let err = build_hierarchy(request).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "storyPoints", .. }));
    }

    #[test]
    fn test_build_rejects_duplicate_keys() {
        let request = BuildRequest::new(story("EPIC-1", None))
            .with_children([story("STORY-1", None), story("EPIC-1", None)]);

        let err = build_hierarchy(request).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "children", .. }));
    }

    #[rstest]
    #[case::shallow(DepthMode::Shallow, 2)]
    #[case::standard(DepthMode::Standard, 3)]
    #[case::deep(DepthMode::Deep, 4)]
    fn test_build_respects_depth_mode(#[case] depth: DepthMode, #[case] expected_nodes: usize) {
        let great_grandchild = FetchedIssue::leaf(story("SUB-1", None));
        let grandchild = FetchedIssue::with_children(story("TASK-1", None), vec![great_grandchild]);
        let child = FetchedIssue::with_children(story("STORY-1", None), vec![grandchild]);
        let request = BuildRequest::new(story("EPIC-1", None))
            .with_children([child])
            .with_depth(depth);

        let hierarchy = build_hierarchy(request).expect("valid request should build");

        assert_eq!(hierarchy.total_nodes(), expected_nodes);
        let deepest = hierarchy.iter().map(HierarchyNode::depth).max();
        assert_eq!(deepest, Some(depth.max_depth()));
    }

    #[test]
    fn test_build_links_follow_include_flag() {
        let blocker = story("OPS-7", None).to_ref();
        let root = story("EPIC-1", None).with_link("is blocked by", LinkDirection::Inward, blocker);

        let with_links = build_hierarchy(BuildRequest::new(root.clone())).expect("should build");
        assert_eq!(with_links.linked_issues().len(), 1);
        assert_eq!(with_links.linked_issues()[0].issue.key, "OPS-7");

        let without = build_hierarchy(BuildRequest::new(root).with_links(false))
            .expect("should build");
        assert!(without.linked_issues().is_empty());
    }

    #[test]
    fn test_build_keeps_parent_reference() {
        let initiative = Issue::new("INIT-1", "Initiative")
            .with_type(IssueType::standard("Initiative"))
            .with_status("In Progress", StatusCategory::Indeterminate)
            .to_ref();
        let root = story("EPIC-1", None).with_parent(initiative);

        let hierarchy = build_hierarchy(BuildRequest::new(root)).expect("should build");
        assert_eq!(hierarchy.parent().map(|p| p.key.as_str()), Some("INIT-1"));
    }

    #[test]
    fn test_build_counts_subtask_refs_toward_available() {
        let mut root = story("STORY-9", None);
        root.subtasks = (1..=4)
            .map(|i| story(&format!("SUB-{i}"), None).to_ref())
            .collect();
        let request = BuildRequest::new(root)
            .with_children([story("SUB-1", None), story("SUB-2", None)])
            .with_max_children(2);

        let hierarchy = build_hierarchy(request).expect("should build");
        assert!(hierarchy.is_truncated());
    }

    #[rstest]
    #[case::shallow(1, DepthMode::Shallow)]
    #[case::standard(2, DepthMode::Standard)]
    #[case::deep(3, DepthMode::Deep)]
    fn test_depth_mode_from_levels(#[case] levels: i64, #[case] expected: DepthMode) {
        assert_eq!(DepthMode::from_levels(levels).unwrap(), expected);
    }

    #[rstest]
    #[case::negative(-1)]
    #[case::zero(0)]
    #[case::too_deep(4)]
    fn test_depth_mode_from_levels_rejects(#[case] levels: i64) {
        let err = DepthMode::from_levels(levels).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "depth", .. }));
    }

    #[test]
    fn test_depth_mode_parse() {
        assert_eq!("Deep".parse::<DepthMode>().unwrap(), DepthMode::Deep);
        assert!("infinite".parse::<DepthMode>().is_err());
    }
}
