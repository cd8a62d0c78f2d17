//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Commit Pulse - hackathon event lifecycle and team commit analytics
///
/// Runs the collect API used by the commit-analyzer dashboard, and renders
/// team analytics reports from the upstream analytics provider.
///
/// Examples:
///   commit-pulse serve --port 4000
///   commit-pulse report "Team A" --format json -o team-a.json
///   commit-pulse teams
///   commit-pulse collect start --server http://localhost:4000
///   commit-pulse init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .commitpulse.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base URL of the upstream analytics provider
    #[arg(long, global = true, value_name = "URL", env = "COMMIT_PULSE_UPSTREAM")]
    pub upstream_url: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the collect API server
    Serve(ServeArgs),

    /// Render a team's analytics report
    Report(ReportArgs),

    /// List teams by commit count
    Teams,

    /// Drive the event lifecycle of a running server
    Collect(CollectArgs),

    /// Generate a default .commitpulse.toml configuration file
    InitConfig,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long, value_name = "PORT", env = "COMMIT_PULSE_PORT")]
    pub port: Option<u16>,

    /// Persist the event status to this file
    #[arg(long, value_name = "FILE")]
    pub state_file: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Team name as registered upstream
    pub team: String,

    /// Output format (markdown, json)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CollectArgs {
    /// Base URL of the collect server
    #[arg(
        long,
        default_value = "http://localhost:4000",
        value_name = "URL",
        env = "COMMIT_PULSE_SERVER"
    )]
    pub server: String,

    #[command(subcommand)]
    pub action: CollectAction,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CollectAction {
    /// Start the event
    Start,
    /// End the event
    End,
    /// Show the event status
    Status,
    /// Generate the review for a team
    Finalize {
        /// Team name
        team: String,
    },
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.upstream_url {
            if !is_http_url(url) {
                return Err("Upstream URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        match self.command {
            Command::Report(ref report) if report.team.trim().is_empty() => {
                Err("Team name must not be empty".to_string())
            }
            Command::Collect(ref collect) => {
                if !is_http_url(&collect.server) {
                    return Err("Server URL must start with 'http://' or 'https://'".to_string());
                }
                match collect.action {
                    CollectAction::Finalize { ref team } if team.trim().is_empty() => {
                        Err("Team name must not be empty".to_string())
                    }
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
