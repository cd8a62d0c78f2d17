//! Team analytics aggregation and statistics.
//!
//! [`TeamAnalyticsAggregator`] fetches a team's raw payload and normalizes
//! it on every call. The free functions derive the figures shown in reports.

use super::normalize::normalize_team_payload;
use super::provider::AnalyticsProvider;
use super::teams::normalize_team_list;
use crate::error::AppError;
use crate::models::{
    ContributorCount, NamedCount, RecentCommit, ScoreBand, TeamAnalyticsRecord, TeamSummary,
};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Read side of the analytics contract. Never caches.
#[derive(Clone)]
pub struct TeamAnalyticsAggregator {
    provider: Arc<dyn AnalyticsProvider>,
}

impl TeamAnalyticsAggregator {
    pub fn new(provider: Arc<dyn AnalyticsProvider>) -> Self {
        Self { provider }
    }

    /// Fetch and normalize the analytics of one team.
    pub async fn team_analytics(&self, team: &str) -> Result<TeamAnalyticsRecord, AppError> {
        let raw = self.provider.fetch_team(team).await?;
        let record = normalize_team_payload(team, raw)?;

        info!(
            "Analytics for '{}': {} commits, +{} -{}",
            team, record.commit_count, record.additions, record.deletions
        );

        Ok(record)
    }

    /// Fetch and normalize the team list.
    pub async fn teams(&self) -> Result<Vec<TeamSummary>, AppError> {
        let raw = self.provider.fetch_teams().await?;
        normalize_team_list(raw)
    }

    pub fn source(&self) -> String {
        self.provider.describe()
    }
}

/// Busiest hour as `(hour, count)`, earliest on ties. `None` when idle.
pub fn peak_hour(hours: &[u64]) -> Option<(usize, u64)> {
    hours
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(hour, count)| (*count, Reverse(*hour)))
}

/// Hours with any activity, in hour order.
pub fn active_hours(hours: &[u64]) -> Vec<(usize, u64)> {
    hours
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Categories sorted by value (highest first), then name.
pub fn sort_by_value(items: &[NamedCount]) -> Vec<NamedCount> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    sorted
}

/// The `n` largest categories.
pub fn top_categories(items: &[NamedCount], n: usize) -> Vec<NamedCount> {
    let mut sorted = sort_by_value(items);
    sorted.truncate(n);
    sorted
}

/// Each contributor as `(name, commits, share)`, share in percent, highest first.
pub fn contributor_shares(contributors: &[ContributorCount]) -> Vec<(String, u64, f64)> {
    let total: u64 = contributors.iter().map(|c| c.commits).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<(String, u64, f64)> = contributors
        .iter()
        .map(|c| {
            let share = c.commits as f64 / total as f64 * 100.0;
            (c.name.clone(), c.commits, share)
        })
        .collect();

    shares.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    shares
}

/// Mean commit score, if any commits are listed.
pub fn average_score(commits: &[RecentCommit]) -> Option<f64> {
    if commits.is_empty() {
        return None;
    }

    let total: f64 = commits.iter().map(|c| c.score).sum();
    Some(total / commits.len() as f64)
}

/// Number of commits per score band.
pub fn score_distribution(commits: &[RecentCommit]) -> HashMap<ScoreBand, usize> {
    let mut dist: HashMap<ScoreBand, usize> = HashMap::new();

    for commit in commits {
        *dist.entry(commit.band()).or_default() += 1;
    }

    dist
}

/// Short plain-text summary of a record.
pub fn generate_summary_text(record: &TeamAnalyticsRecord) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Team: {}", record.team_name));
    lines.push(format!("- Commits: {}", record.commit_count));
    lines.push(format!(
        "- Lines: +{} / -{} (net {})",
        record.additions,
        record.deletions,
        record.net_lines()
    ));
    lines.push(format!("- Churn rate: {:.1}%", record.churn_rate));
    lines.push(format!(
        "- Productivity score: {:.1}",
        record.productivity_score
    ));

    if let Some((hour, count)) = peak_hour(&record.hourly_commits) {
        lines.push(format!("- Peak hour: {:02}:00 ({} commits)", hour, count));
    }

    if let Some(avg) = average_score(&record.recent_commits) {
        lines.push(format!(
            "- Average commit score: {:.1} ({})",
            avg,
            ScoreBand::from_score(avg)
        ));
    }

    lines.join("\n")
}
