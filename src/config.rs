//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.commitpulse.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".commitpulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream analytics provider settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Team review settings.
    #[serde(default)]
    pub review: ReviewConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origin. Any origin when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_origin: Option<String>,

    /// File that keeps the event status across restarts.
    /// The status is kept in memory only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: None,
            state_file: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

/// Upstream analytics provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the analytics provider.
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_upstream_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    15
}

/// Team review settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Text returned by the placeholder review generator.
    #[serde(default = "default_review_message")]
    pub message: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            message: default_review_message(),
        }
    }
}

fn default_review_message() -> String {
    crate::review::DEFAULT_REVIEW.to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum recent commits listed.
    #[serde(default = "default_max_recent_commits")]
    pub max_recent_commits: usize,

    /// Maximum rows per category table (file types, files, folders).
    #[serde(default = "default_max_categories")]
    pub max_categories: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_recent_commits: default_max_recent_commits(),
            max_categories: default_max_categories(),
        }
    }
}

fn default_max_recent_commits() -> usize {
    10
}

fn default_max_categories() -> usize {
    8
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.upstream_url {
            self.upstream.base_url = url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.upstream.timeout_seconds = timeout;
        }

        if let crate::cli::Command::Serve(ref serve) = args.command {
            if let Some(ref host) = serve.host {
                self.server.host = host.clone();
            }
            if let Some(port) = serve.port {
                self.server.port = port;
            }
            if let Some(ref state_file) = serve.state_file {
                self.server.state_file = Some(state_file.clone());
            }
        }
    }

    /// Check values that neither the file parser nor the CLI rejects.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.timeout_seconds == 0 {
            bail!("upstream.timeout_seconds must be at least 1 second");
        }

        let url = &self.upstream.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("upstream.base_url must start with 'http://' or 'https://'");
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command, ServeArgs};

    fn serve_args(port: Option<u16>) -> Args {
        Args {
            config: None,
            verbose: false,
            quiet: false,
            upstream_url: Some("http://analytics.internal:9000".to_string()),
            timeout: None,
            command: Command::Serve(ServeArgs {
                host: None,
                port,
                state_file: Some(PathBuf::from("event.json")),
            }),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.upstream.base_url, "http://localhost:8000");
        assert_eq!(config.upstream.timeout_seconds, 15);
        assert!(config.server.state_file.is_none());
        assert_eq!(config.review.message, crate::review::DEFAULT_REVIEW);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
port = 5050
cors_origin = "https://hackathon.example"
state_file = "/var/lib/commit-pulse/event.json"

[upstream]
base_url = "https://analytics.example"
timeout_seconds = 30

[report]
max_recent_commits = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.server.cors_origin.as_deref(),
            Some("https://hackathon.example")
        );
        assert_eq!(
            config.server.state_file,
            Some(PathBuf::from("/var/lib/commit-pulse/event.json"))
        );
        assert_eq!(config.upstream.base_url, "https://analytics.example");
        assert_eq!(config.upstream.timeout_seconds, 30);
        assert_eq!(config.report.max_recent_commits, 5);
        assert_eq!(config.report.max_categories, 8);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.server.port = 5050;

        config.merge_with_args(&serve_args(None));
        assert_eq!(config.upstream.base_url, "http://analytics.internal:9000");
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.server.state_file, Some(PathBuf::from("event.json")));

        config.merge_with_args(&serve_args(Some(6060)));
        assert_eq!(config.server.port, 6060);
        assert_eq!(config.server.bind_address(), "0.0.0.0:6060");
    }

    #[test]
    fn test_validate_merged_config() {
        assert!(Config::default().validate().is_ok());

        let config: Config = toml::from_str("[upstream]\ntimeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());

        let mut config: Config =
            toml::from_str("[upstream]\nbase_url = \"analytics:8000\"\n").unwrap();
        assert!(config.validate().is_err());

        config.upstream.base_url = "https://analytics.example".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[upstream]"));
        assert!(toml_str.contains("[review]"));
        assert!(toml_str.contains("[report]"));
    }
}
