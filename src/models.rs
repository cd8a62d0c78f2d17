//! Data models for the collect service.
//!
//! This module contains the event status, the normalized team analytics
//! record and the JSON envelopes exchanged over HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of buckets in the hourly histograms.
pub const HOURS_PER_DAY: usize = 24;

/// Process-wide status of the hackathon collection window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// No event is being collected.
    #[default]
    Idle,
    /// Commit activity is being collected.
    Running,
}

impl EventStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, EventStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Idle => "idle",
            EventStatus::Running => "running",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "idle" => Ok(EventStatus::Idle),
            "running" => Ok(EventStatus::Running),
            other => Err(format!("unknown event status: {}", other)),
        }
    }
}

/// A category with a count, e.g. a file extension or a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub value: u64,
}

/// A contributor and the number of commits attributed to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorCount {
    pub name: String,
    pub commits: u64,
}

/// A recent commit with its quality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentCommit {
    pub message: String,
    pub author_name: String,
    /// Quality score on a 0-10 scale.
    pub score: f64,
    pub summary: String,
    pub url: String,
    pub date: String,
}

impl RecentCommit {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}

/// Normalized analytics for one team.
///
/// Every field is always present; only `final_review` is optional, and its
/// absence means no review has been generated yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAnalyticsRecord {
    pub team_name: String,
    pub commit_count: u64,
    pub additions: u64,
    pub deletions: u64,
    /// Percentage, computed upstream.
    pub churn_rate: f64,
    pub productivity_score: f64,
    /// Commits per hour of day, always 24 entries.
    pub hourly_commits: Vec<u64>,
    /// Changed lines per hour of day, always 24 entries.
    pub hourly_volume: Vec<u64>,
    pub file_types: Vec<NamedCount>,
    pub top_files: Vec<NamedCount>,
    pub top_folders: Vec<NamedCount>,
    pub top_contributors: Vec<ContributorCount>,
    pub recent_commits: Vec<RecentCommit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_review: Option<String>,
}

impl TeamAnalyticsRecord {
    /// A record with every metric zeroed.
    pub fn empty(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            commit_count: 0,
            additions: 0,
            deletions: 0,
            churn_rate: 0.0,
            productivity_score: 0.0,
            hourly_commits: vec![0; HOURS_PER_DAY],
            hourly_volume: vec![0; HOURS_PER_DAY],
            file_types: Vec::new(),
            top_files: Vec::new(),
            top_folders: Vec::new(),
            top_contributors: Vec::new(),
            recent_commits: Vec::new(),
            final_review: None,
        }
    }

    /// Net lines changed (additions minus deletions).
    pub fn net_lines(&self) -> i64 {
        self.additions as i64 - self.deletions as i64
    }
}

/// Bucket of a per-commit quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            ScoreBand::Excellent
        } else if score >= 5.0 {
            ScoreBand::Good
        } else if score >= 3.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "🟢",
            ScoreBand::Good => "🟡",
            ScoreBand::Fair => "🟠",
            ScoreBand::Poor => "🔴",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreBand::Excellent => write!(f, "Excellent"),
            ScoreBand::Good => write!(f, "Good"),
            ScoreBand::Fair => write!(f, "Fair"),
            ScoreBand::Poor => write!(f, "Poor"),
        }
    }
}

/// One row of the upstream team list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team_name: String,
    pub commit_count: u64,
    pub additions: u64,
    pub deletions: u64,
}

/// `GET /api/health` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
}

/// Reply of the start, end and status operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: EventStatus,
}

/// Reply of `finalize-team`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub success: bool,
    pub team_name: String,
    pub message: String,
    pub review: String,
}

/// Reply of the analytics query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub data: TeamAnalyticsRecord,
}

/// Reply of the team listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsResponse {
    pub success: bool,
    pub teams: Vec<TeamSummary>,
}

/// Failure envelope for every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
}

/// Metadata about a rendered team report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Team the report covers.
    pub team_name: String,
    /// When the report was rendered.
    pub generated_at: DateTime<Utc>,
    /// Base URL of the analytics provider queried.
    pub source: String,
}

/// A rendered team report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamReport {
    pub metadata: ReportMetadata,
    pub analytics: TeamAnalyticsRecord,
}
