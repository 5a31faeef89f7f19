//! Hierarchical Jira issue analysis.
//!
//! This crate turns already-fetched Jira issue data into an analysis record
//! for AI agents. It performs no network I/O, persistence or caching.
//!
//! # Architecture
//!
//! Components are consumed bottom-up:
//!
//! - [`hierarchy`]: assembles a root issue and its fetched descendants into a tree
//! - [`metrics`]: counts, story points and completion over the tree
//! - [`anomaly`]: independent rule checks producing ranked findings
//! - [`summary`]: renders everything at a verbosity capped by a token ceiling
//!
//! [`analyzer::HierarchyAnalyzer`] chains all four in one call.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use jira_hierarchy::analyzer::HierarchyAnalyzer;
//! use jira_hierarchy::domain::{Issue, StatusCategory};
//! use jira_hierarchy::hierarchy::BuildRequest;
//! use jira_hierarchy::summary::{AnalysisOutputMode, TokenLevel};
//!
//! let epic = Issue::new("EPIC-1", "Checkout revamp").with_story_points(8.0);
//! let story = Issue::new("STORY-1", "Card form")
//!     .with_story_points(8.0)
//!     .with_status("Done", StatusCategory::Done);
//!
//! let analyzer = HierarchyAnalyzer::default();
//! let output = analyzer
//!     .analyze(
//!         BuildRequest::new(epic).with_children([story]),
//!         AnalysisOutputMode::Detailed,
//!         Some(TokenLevel::Full),
//!         Utc::now(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(output.metrics.completion_percentage, 50);
//! assert!(output.hierarchy.is_some());
//! ```

#![forbid(unsafe_code)]

pub mod analyzer;
pub mod anomaly;
pub mod config;
pub mod domain;
pub mod error;
pub mod hierarchy;
pub mod metrics;
pub mod ranking;
pub mod summary;

pub use error::{Error, Result};
