//! Common fixtures shared across integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use jira_hierarchy::domain::{Issue, StatusCategory};

/// Fixed reference time so age-based rules are reproducible.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap()
}

/// A time `days` before [`now`].
pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

/// An issue in the given category with a conventional status name.
pub fn issue(key: &str, category: StatusCategory) -> Issue {
    let name = match category {
        StatusCategory::New => "To Do",
        StatusCategory::Indeterminate => "In Progress",
        StatusCategory::Done => "Done",
        StatusCategory::Undefined => "Unknown",
    };
    Issue::new(key, format!("{key} summary")).with_status(name, category)
}

/// An estimated issue in the given category.
pub fn estimated(key: &str, points: f64, category: StatusCategory) -> Issue {
    issue(key, category).with_story_points(points)
}
