//! HTTP surface of the collect service.
//!
//! Routes mirror the paths the commit-analyzer dashboard calls:
//! `/api/v1/collect/*` for the event lifecycle and `/api/v1/history/*` for
//! team analytics.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub mod routes;
pub mod state;

use crate::config::Config;
use routes::{
    analytics_handler, end_event_handler, finalize_team_handler, health_handler,
    start_event_handler, status_handler, teams_handler,
};
pub use state::AppState;

/// Build the router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.server.cors_origin.as_deref());

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/v1/collect/start-event", post(start_event_handler))
        .route("/api/v1/collect/end-event", post(end_event_handler))
        .route("/api/v1/collect/status", get(status_handler))
        .route("/api/v1/collect/event-status", get(status_handler))
        .route(
            "/api/v1/collect/finalize-team/{team_name}",
            post(finalize_team_handler),
        )
        .route(
            "/api/v1/history/analytics/{team_name}",
            get(analytics_handler),
        )
        .route("/api/v1/history/teams", get(teams_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            warn!("Invalid CORS origin, allowing any: {}", e);
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

/// Run the server until Ctrl+C or SIGTERM.
pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing state...");
    let address = config.server.bind_address();
    let state = AppState::new(config).context("Failed to initialize server state")?;

    info!("Analytics provider: {}", state.analytics.source());
    let status = state.events.status();
    if status.is_running() {
        info!("Resuming a running event");
    } else {
        info!("Event status: {}", status);
    }

    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_bad_origin() {
        // Falls back to any origin instead of panicking.
        let _ = cors_layer(Some("bad\norigin"));
        let _ = cors_layer(Some("https://hackathon.example"));
        let _ = cors_layer(None);
    }
}
