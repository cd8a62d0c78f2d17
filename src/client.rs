//! Client for a running collect server.
//!
//! Used by the `collect` subcommand. Status replies are read leniently: older
//! servers answered with a bare string, or with `eventStatus` / `isRunning`
//! instead of `status`.

use crate::models::{EventStatus, FinalizeResponse};
use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Derive the event status from a server reply, if it carries one.
pub fn parse_status(body: &Value) -> Option<EventStatus> {
    match body {
        Value::String(s) => s.parse().ok(),
        Value::Object(map) => {
            for key in ["status", "eventStatus"] {
                if let Some(status) = map.get(key).and_then(Value::as_str) {
                    if let Ok(status) = status.parse() {
                        return Some(status);
                    }
                }
            }

            map.get("isRunning").and_then(Value::as_bool).map(|running| {
                if running {
                    EventStatus::Running
                } else {
                    EventStatus::Idle
                }
            })
        }
        _ => None,
    }
}

/// HTTP client for the `/api/v1/collect` endpoints.
pub struct CollectClient {
    http_client: reqwest::Client,
    server_url: Url,
}

impl CollectClient {
    pub fn new(server_url: &str, timeout_seconds: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Self::with_client(http_client, server_url)
    }

    pub fn with_client(http_client: reqwest::Client, server_url: &str) -> Result<Self> {
        let server_url = Url::parse(server_url)
            .with_context(|| format!("Invalid server URL: {}", server_url))?;
        if server_url.cannot_be_a_base() {
            return Err(anyhow!("Invalid server URL: {}", server_url));
        }

        Ok(Self {
            http_client,
            server_url,
        })
    }

    pub async fn start(&self) -> Result<EventStatus> {
        let body = self.send(reqwest::Method::POST, &["start-event"]).await?;
        Ok(parse_status(&body).unwrap_or(EventStatus::Running))
    }

    pub async fn end(&self) -> Result<EventStatus> {
        let body = self.send(reqwest::Method::POST, &["end-event"]).await?;
        Ok(parse_status(&body).unwrap_or(EventStatus::Idle))
    }

    pub async fn status(&self) -> Result<EventStatus> {
        let body = self.send(reqwest::Method::GET, &["status"]).await?;
        parse_status(&body).ok_or_else(|| anyhow!("Server reply carries no event status"))
    }

    pub async fn finalize(&self, team: &str) -> Result<FinalizeResponse> {
        let body = self
            .send(reqwest::Method::POST, &["finalize-team", team])
            .await?;
        serde_json::from_value(body).context("Failed to parse finalize reply")
    }

    /// `<server>/api/v1/collect/<segments...>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.server_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1", "collect"]).extend(segments);
        }
        url
    }

    async fn send(&self, method: reqwest::Method, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url);

        let response = self
            .http_client
            .request(method, url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("Request to {} timed out", url)
                } else if e.is_connect() {
                    anyhow!("Cannot connect to collect server at {}", self.server_url)
                } else {
                    anyhow!("Failed to send request: {}", e)
                }
            })?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Invalid reply from {} ({})", url, status))?;

        let success = body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(status.is_success());

        if !status.is_success() || !success {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            return Err(anyhow!("Server returned {}: {}", status, message));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CollectClient {
        let http_client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("Failed to create HTTP client");
        CollectClient::with_client(http_client, &format!("{}/", server.uri())).unwrap()
    }

    #[test]
    fn test_parse_status_variants() {
        assert_eq!(parse_status(&json!("running")), Some(EventStatus::Running));
        assert_eq!(
            parse_status(&json!({"success": true, "status": "idle"})),
            Some(EventStatus::Idle)
        );
        assert_eq!(
            parse_status(&json!({"eventStatus": "running"})),
            Some(EventStatus::Running)
        );
        assert_eq!(
            parse_status(&json!({"isRunning": true})),
            Some(EventStatus::Running)
        );
        assert_eq!(
            parse_status(&json!({"isRunning": false})),
            Some(EventStatus::Idle)
        );
        assert_eq!(parse_status(&json!({"success": true})), None);
        assert_eq!(parse_status(&json!(42)), None);
    }

    #[test]
    fn test_parse_status_skips_unknown_values() {
        assert_eq!(
            parse_status(&json!({"status": "ok", "eventStatus": "running"})),
            Some(EventStatus::Running)
        );
    }

    #[test]
    fn test_endpoint_encodes_team() {
        let client =
            CollectClient::with_client(reqwest::Client::new(), "http://localhost:4000").unwrap();
        let url = client.endpoint(&["finalize-team", "Team A/B"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:4000/api/v1/collect/finalize-team/Team%20A%2FB"
        );
    }

    #[test]
    fn test_invalid_server_url() {
        assert!(CollectClient::with_client(reqwest::Client::new(), "localhost").is_err());
    }

    #[tokio::test]
    async fn test_start_and_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/collect/start-event"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": true, "message": "Event started", "status": "running"}),
            ))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/collect/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"isRunning": true})))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);
        assert_eq!(client.start().await.unwrap(), EventStatus::Running);
        assert_eq!(client.status().await.unwrap(), EventStatus::Running);
    }

    #[tokio::test]
    async fn test_end_falls_back_to_idle() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/collect/end-event"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);
        assert_eq!(client.end().await.unwrap(), EventStatus::Idle);
    }

    #[tokio::test]
    async fn test_failure_envelope_surfaces_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/collect/start-event"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"success": false, "message": "disk full"})),
            )
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);
        let err = client.start().await.unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn test_finalize() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/collect/finalize-team/Team%20A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "team_name": "Team A",
                "message": "Review generated for Team A",
                "review": "Looks good"
            })))
            .mount(&mock_server)
            .await;

        let client = client(&mock_server);
        let reply = client.finalize("Team A").await.unwrap();
        assert_eq!(reply.team_name, "Team A");
        assert_eq!(reply.review, "Looks good");
    }
}
