//! Field-level normalization of an upstream analytics record.
//!
//! Upstream numbers may arrive as integers, floats, numeric strings or
//! `null`; sequences may be missing or contain junk entries. Everything is
//! coerced into [`TeamAnalyticsRecord`] without inventing data: absent
//! numbers become zero and absent sequences become empty.

use super::shape::resolve_record;
use crate::error::AppError;
use crate::models::{
    ContributorCount, NamedCount, RecentCommit, TeamAnalyticsRecord, HOURS_PER_DAY,
};
use serde_json::{Map, Value};
use tracing::warn;

/// Normalize a raw upstream payload for `team`.
pub fn normalize_team_payload(team: &str, raw: Value) -> Result<TeamAnalyticsRecord, AppError> {
    let record = resolve_record(team, raw)?;
    let merged = merge_nested_analytics(record);
    Ok(record_from_map(team, &merged))
}

/// Lift the fields of a nested `analytics` object to the top level.
///
/// Only applies when the nested object carries `hourly_commits` or
/// `commit_count`; nested values replace top-level duplicates.
pub fn merge_nested_analytics(mut record: Map<String, Value>) -> Map<String, Value> {
    let nested = match record.get("analytics") {
        Some(Value::Object(nested)) if has_analytics_fields(nested) => nested.clone(),
        _ => return record,
    };

    for (key, value) in nested {
        record.insert(key, value);
    }

    record
}

/// The nested block counts when `hourly_commits` or `commit_count` is present
/// and non-null. A zero count still qualifies: an explicit `0` from the
/// analytics block overrides a stale top-level figure.
fn has_analytics_fields(nested: &Map<String, Value>) -> bool {
    ["hourly_commits", "commit_count"]
        .iter()
        .any(|key| nested.get(*key).is_some_and(|v| !v.is_null()))
}

/// Build the record from an already resolved and merged object.
pub fn record_from_map(team: &str, map: &Map<String, Value>) -> TeamAnalyticsRecord {
    TeamAnalyticsRecord {
        team_name: team.to_string(),
        commit_count: count_field(map, "commit_count"),
        additions: count_field(map, "additions"),
        deletions: count_field(map, "deletions"),
        churn_rate: float_field(map, "churn_rate"),
        productivity_score: float_field(map, "productivity_score"),
        hourly_commits: hourly_field(map, "hourly_commits"),
        hourly_volume: hourly_field(map, "hourly_volume"),
        file_types: named_counts(map, "file_types"),
        top_files: named_counts(map, "top_files"),
        top_folders: named_counts(map, "top_folders"),
        top_contributors: contributors(map),
        recent_commits: recent_commits(map),
        final_review: map
            .get("final_review")
            .and_then(Value::as_str)
            .map(String::from),
    }
}

/// Non-negative integer from a JSON value, if it holds one.
pub(crate) fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .or(Some(0)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f.round() as u64),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

pub(crate) fn count_field(map: &Map<String, Value>, key: &str) -> u64 {
    map.get(key).and_then(as_count).unwrap_or(0)
}

fn float_field(map: &Map<String, Value>, key: &str) -> f64 {
    map.get(key).and_then(as_float).unwrap_or(0.0)
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// A 24-bucket histogram. Missing means all zeros; short input is padded
/// and long input truncated.
fn hourly_field(map: &Map<String, Value>, key: &str) -> Vec<u64> {
    let mut hours: Vec<u64> = match map.get(key) {
        Some(Value::Array(items)) => items.iter().map(|v| as_count(v).unwrap_or(0)).collect(),
        _ => Vec::new(),
    };

    if !hours.is_empty() && hours.len() != HOURS_PER_DAY {
        warn!(
            "{} has {} buckets, expected {}",
            key,
            hours.len(),
            HOURS_PER_DAY
        );
    }

    hours.resize(HOURS_PER_DAY, 0);
    hours
}

fn array_objects<'a>(
    map: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    map.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn named_counts(map: &Map<String, Value>, key: &str) -> Vec<NamedCount> {
    array_objects(map, key)
        .map(|entry| NamedCount {
            name: string_field(entry, "name"),
            value: count_field(entry, "value"),
        })
        .collect()
}

fn contributors(map: &Map<String, Value>) -> Vec<ContributorCount> {
    array_objects(map, "top_contributors")
        .map(|entry| ContributorCount {
            name: string_field(entry, "name"),
            commits: count_field(entry, "commits"),
        })
        .collect()
}

fn recent_commits(map: &Map<String, Value>) -> Vec<RecentCommit> {
    array_objects(map, "recent_commits")
        .map(|entry| RecentCommit {
            message: string_field(entry, "message"),
            author_name: string_field(entry, "author_name"),
            score: float_field(entry, "score"),
            summary: string_field(entry, "summary"),
            url: string_field(entry, "url"),
            date: string_field(entry, "date"),
        })
        .collect()
}
