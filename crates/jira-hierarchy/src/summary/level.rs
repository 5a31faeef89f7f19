//! Verbosity scales and how they combine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::TokenThresholds;
use crate::error::Error;

/// Shared ordinal scale that both input scales map onto.
///
/// Declaration order is rank order: `Summary < Compact < Detailed < Full`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Summary, metrics and anomalies only.
    Summary,
    /// Root's immediate children as compact projections, no nesting.
    Compact,
    /// Full root, compact nested descendants.
    Detailed,
    /// Full fields at every depth.
    Full,
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Summary => "summary",
            Self::Compact => "compact",
            Self::Detailed => "detailed",
            Self::Full => "full",
        })
    }
}

/// Externally imposed verbosity ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenLevel {
    /// No reduction.
    Full,
    /// Full root, compact descendants.
    Detailed,
    /// Immediate children only.
    Compact,
    /// No child listing.
    Summary,
}

impl TokenLevel {
    /// Position on the shared scale.
    #[must_use]
    pub fn detail_level(self) -> DetailLevel {
        match self {
            Self::Full => DetailLevel::Full,
            Self::Detailed => DetailLevel::Detailed,
            Self::Compact => DetailLevel::Compact,
            Self::Summary => DetailLevel::Summary,
        }
    }

    /// Ceiling appropriate for a hierarchy of `node_count` nodes.
    #[must_use]
    pub fn for_node_count(node_count: usize, thresholds: &TokenThresholds) -> Self {
        if node_count <= thresholds.full_max_nodes {
            Self::Full
        } else if node_count <= thresholds.detailed_max_nodes {
            Self::Detailed
        } else if node_count <= thresholds.compact_max_nodes {
            Self::Compact
        } else {
            Self::Summary
        }
    }
}

impl fmt::Display for TokenLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Full => "FULL",
            Self::Detailed => "DETAILED",
            Self::Compact => "COMPACT",
            Self::Summary => "SUMMARY",
        })
    }
}

impl FromStr for TokenLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FULL" => Ok(Self::Full),
            "DETAILED" => Ok(Self::Detailed),
            "COMPACT" => Ok(Self::Compact),
            "SUMMARY" => Ok(Self::Summary),
            _ => Err(Error::invalid(
                "token level",
                format!("'{s}' (expected FULL, DETAILED, COMPACT or SUMMARY)"),
            )),
        }
    }
}

/// Verbosity requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisOutputMode {
    /// Everything.
    Full,
    /// Full root, compact descendants.
    #[default]
    Detailed,
    /// No child listing.
    Summary,
}

impl AnalysisOutputMode {
    /// Position on the shared scale.
    #[must_use]
    pub fn detail_level(self) -> DetailLevel {
        match self {
            Self::Full => DetailLevel::Full,
            Self::Detailed => DetailLevel::Detailed,
            Self::Summary => DetailLevel::Summary,
        }
    }
}

impl fmt::Display for AnalysisOutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.detail_level(), f)
    }
}

impl FromStr for AnalysisOutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "detailed" => Ok(Self::Detailed),
            "summary" => Ok(Self::Summary),
            _ => Err(Error::invalid(
                "output mode",
                format!("'{s}' (expected full, detailed or summary)"),
            )),
        }
    }
}

/// Level actually rendered: the lower of the ceiling and the request.
#[must_use]
pub fn effective_level(ceiling: TokenLevel, mode: AnalysisOutputMode) -> DetailLevel {
    ceiling.detail_level().min(mode.detail_level())
}
