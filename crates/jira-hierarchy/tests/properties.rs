//! Property-based tests for analysis invariants.

mod common;

use common::{days_ago, now};
use jira_hierarchy::analyzer::HierarchyAnalyzer;
use jira_hierarchy::domain::{Issue, StatusCategory};
use jira_hierarchy::hierarchy::{BuildRequest, FetchedIssue, build_hierarchy};
use jira_hierarchy::metrics::calculate_metrics;
use jira_hierarchy::summary::{AnalysisOutputMode, DetailLevel, TokenLevel};
use proptest::prelude::*;

fn category() -> impl Strategy<Value = StatusCategory> {
    prop_oneof![
        Just(StatusCategory::New),
        Just(StatusCategory::Indeterminate),
        Just(StatusCategory::Done),
        Just(StatusCategory::Undefined),
    ]
}

/// Story points as Jira users enter them: small halves, or nothing.
fn points() -> impl Strategy<Value = Option<f64>> {
    prop::option::of((0u32..=40).prop_map(|halves| f64::from(halves) / 2.0))
}

/// Status, points and days since last update.
fn shape() -> impl Strategy<Value = (StatusCategory, Option<f64>, i64)> {
    (category(), points(), 0i64..30)
}

fn make_issue(key: String, (category, points, age): (StatusCategory, Option<f64>, i64)) -> Issue {
    let mut issue = Issue::new(key.clone(), key)
        .with_status(category.as_str(), category)
        .with_updated(days_ago(age));
    if let Some(points) = points {
        issue = issue.with_story_points(points);
    }
    issue
}

/// A root with children, each carrying up to three grandchildren.
fn request() -> impl Strategy<Value = BuildRequest> {
    (
        shape(),
        prop::collection::vec((shape(), prop::collection::vec(shape(), 0..3)), 0..12),
    )
        .prop_map(|(root, children)| {
            let children: Vec<FetchedIssue> = children
                .into_iter()
                .enumerate()
                .map(|(i, (child, grandchildren))| {
                    let grandchildren = grandchildren
                        .into_iter()
                        .enumerate()
                        .map(|(j, sub)| {
                            FetchedIssue::leaf(make_issue(format!("SUB-{i}-{j}"), sub))
                        })
                        .collect();
                    let child = make_issue(format!("STORY-{i}"), child);
                    FetchedIssue::with_children(child, grandchildren)
                })
                .collect();
            BuildRequest::new(make_issue("EPIC-1".to_string(), root)).with_children(children)
        })
}

fn token_level() -> impl Strategy<Value = TokenLevel> {
    prop_oneof![
        Just(TokenLevel::Full),
        Just(TokenLevel::Detailed),
        Just(TokenLevel::Compact),
        Just(TokenLevel::Summary),
    ]
}

fn output_mode() -> impl Strategy<Value = AnalysisOutputMode> {
    prop_oneof![
        Just(AnalysisOutputMode::Full),
        Just(AnalysisOutputMode::Detailed),
        Just(AnalysisOutputMode::Summary),
    ]
}

proptest! {
    /// Property: completed and remaining points partition the total.
    #[test]
    fn prop_points_partition_total(request in request()) {
        let hierarchy = build_hierarchy(request).unwrap();
        let metrics = calculate_metrics(&hierarchy);

        prop_assert_eq!(
            metrics.completed_story_points + metrics.remaining_story_points,
            metrics.total_story_points
        );
        prop_assert!(metrics.completion_percentage <= 100);
        prop_assert_eq!(
            metrics.estimated_issues + metrics.unestimated_issues,
            metrics.total_issues
        );
        prop_assert_eq!(metrics.total_issues, hierarchy.total_nodes());
    }

    /// Property: every node's children total equals the sum over its
    /// immediate children, unestimated children counting as zero.
    #[test]
    fn prop_children_points_sum_immediate_children(request in request()) {
        let hierarchy = build_hierarchy(request).unwrap();

        for node in &hierarchy {
            let expected: f64 = node
                .children()
                .iter()
                .map(|child| child.issue().story_points.unwrap_or(0.0))
                .sum();
            prop_assert_eq!(node.children_story_points(), expected);
        }
    }

    /// Property: anomalies are ordered critical, then warning, then info.
    #[test]
    fn prop_anomalies_ranked_by_severity(request in request()) {
        let output = HierarchyAnalyzer::default()
            .analyze(request, AnalysisOutputMode::Summary, None, now())
            .unwrap();

        prop_assert!(output
            .anomalies
            .windows(2)
            .all(|pair| pair[0].severity <= pair[1].severity));
        prop_assert_eq!(output.summary.anomaly_count, output.anomalies.len());
    }

    /// Property: the rendered level is the lower of ceiling and mode, and
    /// only that level's sections are present.
    #[test]
    fn prop_rendered_level_is_capped(
        request in request(),
        ceiling in token_level(),
        mode in output_mode(),
    ) {
        let output = HierarchyAnalyzer::default()
            .analyze(request, mode, Some(ceiling), now())
            .unwrap();
        let level = output.summary.detail_level;

        prop_assert_eq!(level, ceiling.detail_level().min(mode.detail_level()));
        prop_assert_eq!(output.hierarchy.is_some(), level >= DetailLevel::Detailed);
        prop_assert_eq!(output.linked_issues.is_some(), level >= DetailLevel::Detailed);
        prop_assert_eq!(output.children.is_some(), level == DetailLevel::Compact);
        prop_assert_eq!(output.info.is_some(), level < mode.detail_level());
    }

    /// Property: summary mode never renders tree content, whatever the ceiling.
    #[test]
    fn prop_summary_mode_is_structure_only(request in request(), ceiling in token_level()) {
        let output = HierarchyAnalyzer::default()
            .analyze(request, AnalysisOutputMode::Summary, Some(ceiling), now())
            .unwrap();

        prop_assert_eq!(output.summary.detail_level, DetailLevel::Summary);
        prop_assert!(output.hierarchy.is_none());
        prop_assert!(output.children.is_none());
        prop_assert!(output.linked_issues.is_none());
    }

    /// Property: analysis is deterministic for a fixed reference time.
    #[test]
    fn prop_analysis_is_deterministic(request in request(), mode in output_mode()) {
        let analyzer = HierarchyAnalyzer::default();
        let first = analyzer.analyze(request.clone(), mode, None, now()).unwrap();
        let second = analyzer.analyze(request, mode, None, now()).unwrap();

        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
