//! Error taxonomy shared by the lifecycle controller, the analytics
//! aggregator and the HTTP layer.
//!
//! Every variant is rendered at the handler boundary as the
//! `{success: false, message}` envelope the dashboard expects.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorEnvelope;

#[derive(Error, Debug)]
pub enum AppError {
    /// Unexpected fault while mutating state or serializing a reply.
    #[error("{0}")]
    InternalFault(String),

    /// The requested team has no analytics upstream.
    #[error("No analytics found for team '{team}'")]
    NotFound { team: String },

    /// The analytics provider could not be reached or failed.
    #[error("Analytics provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Malformed request.
    #[error("Invalid request: {0}")]
    ValidationFailure(String),
}

impl AppError {
    pub fn not_found(team: impl Into<String>) -> Self {
        AppError::NotFound { team: team.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::ValidationFailure(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::InternalFault(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::InternalFault(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorEnvelope {
            success: false,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InternalFault("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::not_found("Ghost").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UpstreamUnavailable("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::ValidationFailure("blank".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_fault_echoes_message() {
        let err = AppError::InternalFault("disk full".to_string());
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_not_found_names_team() {
        let err = AppError::not_found("Ghost");
        assert!(err.to_string().contains("'Ghost'"));
    }

    #[tokio::test]
    async fn test_into_response_envelope() {
        let response = AppError::not_found("Ghost").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "No analytics found for team 'Ghost'");
    }
}
