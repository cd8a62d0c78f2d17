//! Commit Pulse - hackathon event lifecycle and team commit analytics
//!
//! Serves the collect API used by the commit-analyzer dashboard and renders
//! team analytics reports from the upstream analytics provider.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, upstream or server failure)

mod analytics;
mod cli;
mod client;
mod config;
mod error;
mod lifecycle;
mod models;
mod report;
mod review;
mod server;

use analytics::{generate_summary_text, HttpAnalyticsProvider, TeamAnalyticsAggregator};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, CollectAction, CollectArgs, Command, OutputFormat, ReportArgs};
use client::CollectClient;
use config::{Config, CONFIG_FILE};
use models::{ReportMetadata, TeamReport};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if let Command::InitConfig = args.command {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Commit Pulse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .commitpulse.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the upstream URL, port, state file, and more.");
    Ok(())
}

/// Initialize logging on stderr. `RUST_LOG` wins over the verbosity flags.
fn init_logging(args: &Args) {
    let result = if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .try_init()
            .map_err(|e| e.to_string())
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(args.log_level())
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .compact()
            .finish();

        tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    match args.command {
        Command::Serve(_) => server::start_server(config).await,
        Command::Report(ref report) => handle_report(&config, report).await,
        Command::Teams => handle_teams(&config).await,
        Command::Collect(ref collect) => handle_collect(&config, collect).await,
        Command::InitConfig => handle_init_config(),
    }
}

fn aggregator(config: &Config) -> Result<TeamAnalyticsAggregator> {
    let provider = HttpAnalyticsProvider::new(&config.upstream)
        .context("Failed to create analytics provider")?;
    Ok(TeamAnalyticsAggregator::new(Arc::new(provider)))
}

/// Fetch a team's analytics and render the report.
async fn handle_report(config: &Config, args: &ReportArgs) -> Result<()> {
    let aggregator = aggregator(config)?;
    let team = args.team.trim();

    info!("Fetching analytics for {} from {}", team, aggregator.source());
    let analytics = aggregator.team_analytics(team).await?;

    let report = TeamReport {
        metadata: ReportMetadata {
            team_name: team.to_string(),
            generated_at: Utc::now(),
            source: aggregator.source(),
        },
        analytics,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;

            println!("\n📊 {}", generate_summary_text(&report.analytics));
            println!("\n✅ Report saved to: {}", path.display());
        }
        None => println!("{}", output),
    }

    Ok(())
}

/// Print the team list, busiest first.
async fn handle_teams(config: &Config) -> Result<()> {
    let aggregator = aggregator(config)?;
    let teams = aggregator.teams().await?;

    if teams.is_empty() {
        println!("No teams found at {}", aggregator.source());
        return Ok(());
    }

    println!("{:<4} {:<30} {:>8} {:>10} {:>10}", "#", "Team", "Commits", "Additions", "Deletions");
    for (i, team) in teams.iter().enumerate() {
        println!(
            "{:<4} {:<30} {:>8} {:>10} {:>10}",
            i + 1,
            team.team_name,
            team.commit_count,
            format!("+{}", team.additions),
            format!("-{}", team.deletions)
        );
    }
    println!("\nTotal: {} teams", teams.len());

    Ok(())
}

/// Drive the event lifecycle of a running server.
async fn handle_collect(config: &Config, args: &CollectArgs) -> Result<()> {
    let client = CollectClient::new(&args.server, config.upstream.timeout_seconds)?;

    match args.action {
        CollectAction::Start => {
            let status = client.start().await?;
            println!("🚀 Event started (status: {})", status);
        }
        CollectAction::End => {
            let status = client.end().await?;
            println!("🏁 Event stopped (status: {})", status);
        }
        CollectAction::Status => {
            let status = client.status().await?;
            println!("Event status: {}", status);
        }
        CollectAction::Finalize { ref team } => {
            let reply = client.finalize(team.trim()).await?;
            println!("✅ {}", reply.message);
            println!("\n{}", reply.review);
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
