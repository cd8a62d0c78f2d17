//! Upstream team list normalization.

use super::normalize::count_field;
use crate::error::AppError;
use crate::models::TeamSummary;
use serde_json::{Map, Value};
use std::cmp::Reverse;
use tracing::debug;

/// Layout of a raw team list.
#[derive(Debug, Clone, PartialEq)]
pub enum TeamListShape {
    /// A bare array of team entries.
    Bare(Vec<Value>),
    /// `{ "teams": [...] }`.
    Keyed(Vec<Value>),
    /// `{ "data": <list> }`.
    Wrapped(Value),
    /// An object with no `teams` list, or `teams: null`; no teams yet.
    Missing,
    /// Anything without a recognizable list.
    Unrecognized,
}

impl TeamListShape {
    pub fn detect(value: Value) -> Self {
        match value {
            Value::Array(items) => TeamListShape::Bare(items),
            Value::Object(mut map) => match (map.remove("teams"), map.remove("data")) {
                (Some(Value::Array(items)), _) => TeamListShape::Keyed(items),
                (_, Some(inner)) if !inner.is_null() => TeamListShape::Wrapped(inner),
                (None | Some(Value::Null), _) => TeamListShape::Missing,
                _ => TeamListShape::Unrecognized,
            },
            _ => TeamListShape::Unrecognized,
        }
    }
}

/// Normalize a raw team list, sorted by commit count (highest first).
pub fn normalize_team_list(raw: Value) -> Result<Vec<TeamSummary>, AppError> {
    let entries = match TeamListShape::detect(raw) {
        TeamListShape::Bare(items) | TeamListShape::Keyed(items) => items,
        TeamListShape::Missing => Vec::new(),
        TeamListShape::Wrapped(inner) => match TeamListShape::detect(inner) {
            TeamListShape::Bare(items) | TeamListShape::Keyed(items) => items,
            TeamListShape::Missing => Vec::new(),
            _ => return Err(unrecognized()),
        },
        TeamListShape::Unrecognized => return Err(unrecognized()),
    };

    let mut teams: Vec<TeamSummary> = entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(team_summary)
        .collect();

    debug!("Normalized {} of {} team entries", teams.len(), entries.len());

    teams.sort_by_key(|t| Reverse(t.commit_count));
    Ok(teams)
}

fn team_summary(entry: &Map<String, Value>) -> Option<TeamSummary> {
    let team_name = entry
        .get("team_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())?
        .to_string();

    Some(TeamSummary {
        team_name,
        commit_count: count_field(entry, "commit_count"),
        additions: count_field(entry, "additions"),
        deletions: count_field(entry, "deletions"),
    })
}

fn unrecognized() -> AppError {
    AppError::UpstreamUnavailable("unrecognized team list payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_sorted_by_commits() {
        let teams = normalize_team_list(json!([
            {"team_name": "Low", "commit_count": 1},
            {"team_name": "High", "commit_count": 10},
            {"team_name": "Mid", "commit_count": 5}
        ]))
        .unwrap();

        let names: Vec<&str> = teams.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn test_keyed_and_wrapped_lists() {
        let keyed = normalize_team_list(json!({"teams": [{"team_name": "A"}]})).unwrap();
        assert_eq!(keyed.len(), 1);
        assert_eq!(keyed[0].commit_count, 0);

        let wrapped =
            normalize_team_list(json!({"data": {"teams": [{"team_name": "A"}]}})).unwrap();
        assert_eq!(keyed, wrapped);

        let wrapped_bare = normalize_team_list(json!({"data": [{"team_name": "A"}]})).unwrap();
        assert_eq!(keyed, wrapped_bare);
    }

    #[test]
    fn test_entries_without_name_are_dropped() {
        let teams = normalize_team_list(json!([
            {"team_name": "  "},
            {"commit_count": 4},
            "junk",
            {"team_name": "Real", "additions": "12"}
        ]))
        .unwrap();

        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team_name, "Real");
        assert_eq!(teams[0].additions, 12);
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert!(normalize_team_list(json!([])).unwrap().is_empty());
        assert!(normalize_team_list(json!({"teams": []})).unwrap().is_empty());
    }

    #[test]
    fn test_missing_list_means_no_teams() {
        assert!(normalize_team_list(json!({"success": true})).unwrap().is_empty());
        assert!(normalize_team_list(json!({"teams": null})).unwrap().is_empty());
        assert!(normalize_team_list(json!({"data": {"success": true}}))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unrecognized_list() {
        assert!(matches!(
            normalize_team_list(json!({"teams": "A, B"})),
            Err(AppError::UpstreamUnavailable(_))
        ));
        assert!(matches!(
            normalize_team_list(json!("teams")),
            Err(AppError::UpstreamUnavailable(_))
        ));
        assert!(matches!(
            normalize_team_list(json!({"data": 3})),
            Err(AppError::UpstreamUnavailable(_))
        ));
    }
}
