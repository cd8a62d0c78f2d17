//! Markdown report generation.
//!
//! This module renders a team's normalized analytics as a Markdown or JSON
//! report.

use crate::analytics::{
    active_hours, average_score, contributor_shares, peak_hour, score_distribution,
    top_categories,
};
use crate::config::ReportConfig;
use crate::models::{
    NamedCount, RecentCommit, ReportMetadata, ScoreBand, TeamAnalyticsRecord, TeamReport,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &TeamReport, config: &ReportConfig) -> String {
    let analytics = &report.analytics;
    let mut output = String::new();

    // Title
    output.push_str(&format!("# Commit Pulse Report: {}\n\n", analytics.team_name));

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(analytics));
    output.push_str(&generate_activity_section(&analytics.hourly_commits));

    output.push_str(&generate_category_section(
        "File Types",
        "Extension",
        &analytics.file_types,
        config.max_categories,
    ));
    output.push_str(&generate_category_section(
        "Top Files",
        "File",
        &analytics.top_files,
        config.max_categories,
    ));
    output.push_str(&generate_category_section(
        "Top Folders",
        "Folder",
        &analytics.top_folders,
        config.max_categories,
    ));

    output.push_str(&generate_contributors_section(analytics));
    output.push_str(&generate_commits_section(
        &analytics.recent_commits,
        config.max_recent_commits,
    ));
    output.push_str(&generate_review_section(analytics.final_review.as_deref()));

    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Team:** {}\n", metadata.team_name));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push('\n');

    section
}

fn generate_summary_section(analytics: &TeamAnalyticsRecord) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Commits | Additions | Deletions | Net Lines | Churn Rate | Productivity |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | +{} | -{} | {} | {:.1}% | {:.1} |\n\n",
        analytics.commit_count,
        analytics.additions,
        analytics.deletions,
        analytics.net_lines(),
        analytics.churn_rate,
        analytics.productivity_score
    ));

    section
}

fn generate_activity_section(hourly_commits: &[u64]) -> String {
    let mut section = String::new();

    section.push_str("## Hourly Activity\n\n");

    let Some((hour, count)) = peak_hour(hourly_commits) else {
        section.push_str("No commit activity recorded yet.\n\n");
        return section;
    };

    section.push_str(&format!(
        "Peak hour: **{:02}:00** with {} commits.\n\n",
        hour, count
    ));

    section.push_str("| Hour | Commits |\n");
    section.push_str("|:---|:---:|\n");
    for (hour, count) in active_hours(hourly_commits) {
        section.push_str(&format!("| {:02}:00 | {} |\n", hour, count));
    }
    section.push('\n');

    section
}

fn generate_category_section(title: &str, label: &str, items: &[NamedCount], max: usize) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));
    section.push_str(&format!("| {} | Count |\n", label));
    section.push_str("|:---|:---:|\n");

    for item in top_categories(items, max) {
        section.push_str(&format!("| `{}` | {} |\n", item.name, item.value));
    }

    if items.len() > max {
        section.push_str(&format!("\n*{} more not shown*\n", items.len() - max));
    }
    section.push('\n');

    section
}

fn generate_contributors_section(analytics: &TeamAnalyticsRecord) -> String {
    let shares = contributor_shares(&analytics.top_contributors);
    if shares.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Contributors\n\n");
    section.push_str("| Contributor | Commits | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");

    for (name, commits, share) in shares {
        section.push_str(&format!("| {} | {} | {:.1}% |\n", name, commits, share));
    }
    section.push('\n');

    section
}

fn generate_commits_section(commits: &[RecentCommit], max: usize) -> String {
    let mut section = String::new();

    section.push_str("## Recent Commits\n\n");

    if commits.is_empty() {
        section.push_str("No commits have been scored yet.\n\n");
        return section;
    }

    if let Some(avg) = average_score(commits) {
        section.push_str(&format!(
            "Average score: **{:.1}** ({})\n\n",
            avg,
            ScoreBand::from_score(avg)
        ));
    }

    let dist = score_distribution(commits);
    section.push_str(&format!(
        "| {} Excellent | {} Good | {} Fair | {} Poor |\n",
        ScoreBand::Excellent.emoji(),
        ScoreBand::Good.emoji(),
        ScoreBand::Fair.emoji(),
        ScoreBand::Poor.emoji(),
    ));
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        dist.get(&ScoreBand::Excellent).copied().unwrap_or(0),
        dist.get(&ScoreBand::Good).copied().unwrap_or(0),
        dist.get(&ScoreBand::Fair).copied().unwrap_or(0),
        dist.get(&ScoreBand::Poor).copied().unwrap_or(0),
    ));

    for commit in commits.iter().take(max) {
        section.push_str(&generate_commit_block(commit));
    }

    if commits.len() > max {
        section.push_str(&format!("*{} older commits not shown*\n\n", commits.len() - max));
    }

    section
}

fn generate_commit_block(commit: &RecentCommit) -> String {
    let mut block = String::new();

    let title = commit.message.lines().next().unwrap_or_default();
    block.push_str(&format!(
        "### {} {:.1} - {}\n\n",
        commit.band().emoji(),
        commit.score,
        title
    ));

    let mut info = vec![format!("Author: {}", commit.author_name)];
    if !commit.date.is_empty() {
        info.push(format!("Date: {}", commit.date));
    }
    block.push_str(&format!("*{}*\n\n", info.join(" | ")));

    if !commit.summary.is_empty() {
        block.push_str(&format!("> {}\n\n", commit.summary));
    }

    if !commit.url.is_empty() {
        block.push_str(&format!("[View commit]({})\n\n", commit.url));
    }

    block
}

fn generate_review_section(review: Option<&str>) -> String {
    let mut section = String::new();

    section.push_str("## Final Review\n\n");
    match review {
        Some(review) => {
            section.push_str(review);
            section.push_str("\n\n");
        }
        None => section.push_str("*Review not generated yet.*\n\n"),
    }

    section
}

fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by Commit Pulse*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &TeamReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
