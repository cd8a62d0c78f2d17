use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::error::AppError;
use crate::lifecycle::EventController;
use crate::models::{
    AnalyticsResponse, EventResponse, EventStatus, FinalizeResponse, HealthResponse,
    TeamsResponse,
};
use crate::server::state::AppState;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "API is running".to_string(),
    })
}

pub async fn start_event_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EventResponse>, AppError> {
    let status = transition(&state, EventController::start).await?;
    info!("Event started");

    Ok(Json(EventResponse {
        success: true,
        message: Some("Event started".to_string()),
        status,
    }))
}

pub async fn end_event_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EventResponse>, AppError> {
    let status = transition(&state, EventController::end).await?;
    info!("Event stopped");

    Ok(Json(EventResponse {
        success: true,
        message: Some("Event stopped".to_string()),
        status,
    }))
}

pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<EventResponse> {
    Json(EventResponse {
        success: true,
        message: None,
        status: state.events.status(),
    })
}

pub async fn finalize_team_handler(
    State(state): State<Arc<AppState>>,
    Path(team_name): Path<String>,
) -> Result<Json<FinalizeResponse>, AppError> {
    let team = require_team(&team_name)?;

    let review = state.reviewer.review(team).await?;
    let reviewed = state.reviews.record(team, &review);
    info!("Review generated for {} ({} teams reviewed)", team, reviewed);

    Ok(Json(FinalizeResponse {
        success: true,
        team_name: team.to_string(),
        message: format!("Review generated for {}", team),
        review,
    }))
}

pub async fn analytics_handler(
    State(state): State<Arc<AppState>>,
    Path(team_name): Path<String>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let team = require_team(&team_name)?;

    let mut record = state.analytics.team_analytics(team).await?;
    if record.final_review.is_none() {
        record.final_review = state.reviews.get(team);
    }

    Ok(Json(AnalyticsResponse {
        success: true,
        data: record,
    }))
}

pub async fn teams_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TeamsResponse>, AppError> {
    let teams = state.analytics.teams().await?;

    Ok(Json(TeamsResponse {
        success: true,
        teams,
    }))
}

/// Apply a lifecycle transition. With a state file the write blocks, so it
/// runs on the blocking pool.
async fn transition(
    state: &Arc<AppState>,
    apply: fn(&EventController) -> Result<EventStatus, AppError>,
) -> Result<EventStatus, AppError> {
    if !state.events.is_persistent() {
        return apply(&state.events);
    }

    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || apply(&state.events))
        .await
        .map_err(|e| AppError::InternalFault(format!("Event transition task failed: {}", e)))?
}

fn require_team(team_name: &str) -> Result<&str, AppError> {
    let team = team_name.trim();
    if team.is_empty() {
        return Err(AppError::ValidationFailure(
            "team_name must not be empty".to_string(),
        ));
    }
    Ok(team)
}
