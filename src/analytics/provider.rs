//! Upstream analytics provider.
//!
//! The provider is the external service that computes raw commit statistics
//! per team. It is reached through the [`AnalyticsProvider`] port so the HTTP
//! layer can be exercised against a fake.

use crate::config::UpstreamConfig;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of raw, loosely-typed analytics payloads.
#[async_trait]
pub trait AnalyticsProvider: Send + Sync {
    /// Raw analytics payload for one team.
    async fn fetch_team(&self, team: &str) -> Result<Value, AppError>;

    /// Raw team list.
    async fn fetch_teams(&self) -> Result<Value, AppError>;

    /// Where the payloads come from, for logs and reports.
    fn describe(&self) -> String;
}

/// [`AnalyticsProvider`] backed by the provider's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpAnalyticsProvider {
    client: reqwest::Client,
    base_url: Url,
    timeout_seconds: u64,
}

impl HttpAnalyticsProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::InternalFault(format!("Failed to create HTTP client: {}", e)))?;

        Self::with_client(client, &config.base_url, config.timeout_seconds)
    }

    /// Use a preconfigured client. `timeout_seconds` is only reported in
    /// error messages; the client's own timeout applies.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        timeout_seconds: u64,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::InternalFault(format!("Invalid upstream URL '{}': {}", base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::InternalFault(format!(
                "Invalid upstream URL '{}': cannot be a base",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            timeout_seconds,
        })
    }

    /// Build `<base>/api/v1/history/<segments...>`, percent-encoding each
    /// segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1", "history"]).extend(segments);
        }
        url
    }

    async fn get_json(&self, url: Url, team: Option<&str>) -> Result<Value, AppError> {
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::UpstreamUnavailable(format!(
                    "request timed out after {}s",
                    self.timeout_seconds
                ))
            } else if e.is_connect() {
                AppError::UpstreamUnavailable(format!("cannot connect to {}", self.base_url))
            } else {
                AppError::UpstreamUnavailable(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Analytics provider returned {} for {}: {}", status, url, body);
            return Err(classify_status(status, team));
        }

        response.json::<Value>().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("invalid JSON from analytics provider: {}", e))
        })
    }
}

/// Map a non-success upstream status onto the error taxonomy.
fn classify_status(status: StatusCode, team: Option<&str>) -> AppError {
    match team {
        Some(team) if status.is_client_error() => AppError::not_found(team),
        _ => AppError::UpstreamUnavailable(format!("analytics provider returned {}", status)),
    }
}

#[async_trait]
impl AnalyticsProvider for HttpAnalyticsProvider {
    async fn fetch_team(&self, team: &str) -> Result<Value, AppError> {
        let url = self.endpoint(&["analytics", team]);
        self.get_json(url, Some(team)).await
    }

    async fn fetch_teams(&self) -> Result<Value, AppError> {
        let url = self.endpoint(&["teams"]);
        self.get_json(url, None).await
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str, timeout: Duration) -> HttpAnalyticsProvider {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        HttpAnalyticsProvider::with_client(client, base_url, timeout.as_secs()).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_team_name() {
        let provider = provider("http://localhost:8000", Duration::from_secs(1));
        let url = provider.endpoint(&["analytics", "Team A/B"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/history/analytics/Team%20A%2FB"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let provider = provider("http://localhost:8000/proxy/", Duration::from_secs(1));
        let url = provider.endpoint(&["teams"]);
        assert_eq!(url.as_str(), "http://localhost:8000/proxy/api/v1/history/teams");
    }

    #[test]
    fn test_invalid_base_url() {
        let client = reqwest::Client::new();
        let err = HttpAnalyticsProvider::with_client(client, "not a url", 5).unwrap_err();
        assert!(matches!(err, AppError::InternalFault(_)));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, Some("Ghost")),
            AppError::NotFound { .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, Some("Ghost")),
            AppError::UpstreamUnavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, None),
            AppError::UpstreamUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_fetch_team_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/history/analytics/Team%20A"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"commit_count": 3}]})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server.uri(), Duration::from_secs(5));
        let payload = provider.fetch_team("Team A").await.unwrap();

        assert_eq!(payload["data"][0]["commit_count"], 3);
    }

    #[tokio::test]
    async fn test_fetch_team_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/history/analytics/Ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "nope"})))
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server.uri(), Duration::from_secs(5));
        let err = provider.fetch_team("Ghost").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { ref team } if team == "Ghost"));
    }

    #[tokio::test]
    async fn test_fetch_team_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server.uri(), Duration::from_secs(5));
        let err = provider.fetch_team("Team A").await.unwrap_err();

        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_fetch_team_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server.uri(), Duration::from_millis(200));
        let err = provider.fetch_team("Team A").await.unwrap_err();

        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_fetch_team_invalid_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server.uri(), Duration::from_secs(5));
        let err = provider.fetch_team("Team A").await.unwrap_err();

        assert!(matches!(err, AppError::UpstreamUnavailable(ref m) if m.contains("invalid JSON")));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let provider = provider("http://127.0.0.1:1", Duration::from_secs(2));
        let err = provider.fetch_teams().await.unwrap_err();

        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    }
}
