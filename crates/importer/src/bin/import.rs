use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use importer::{
    ImportContext, ImportJob, ImportReport, JobOutcome, JobRunner, PlayerImportReport,
    TeamImportReport, run_player_import, run_team_import,
    sources::balldontlie::{BallDontLieClient, BallDontLieConfig, DEFAULT_BASE_URL},
};
use storage::{Database, PgRecordStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nba-import")]
#[command(about = "NBA teams and players importer (BallDontLie)", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "BALLDONTLIE_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "BALLDONTLIE_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import all NBA teams
    Teams {
        /// Run through the job wrapper with retries and a deadline
        #[arg(long)]
        background: bool,
    },
    /// Import NBA players page by page
    Players {
        /// Maximum number of players to process
        #[arg(long, default_value_t = 500)]
        limit: u64,

        /// Import every player, ignoring --limit
        #[arg(long, conflicts_with = "limit")]
        all: bool,

        /// Players per request (max 100)
        #[arg(long, default_value_t = 100)]
        per_page: u32,

        #[arg(long)]
        background: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "nba_import={},importer={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ctx = build_context(&cli).await?;

    match cli.command {
        Commands::Teams { background } => {
            if background {
                run_in_background(ctx, ImportJob::Teams).await?;
            } else {
                tracing::info!("Starting NBA teams import...");
                let report = run_team_import(&ctx)
                    .await
                    .context("Teams import failed")?;
                log_team_summary(&report);
            }
        }
        Commands::Players {
            limit,
            all,
            per_page,
            background,
        } => {
            let limit = (!all).then_some(limit);
            if background {
                run_in_background(ctx, ImportJob::Players { per_page, limit }).await?;
            } else {
                tracing::info!(
                    "Starting NBA players import (limit: {}, per page: {})...",
                    limit.map_or("none".to_string(), |l| l.to_string()),
                    per_page
                );
                let report = run_player_import(&ctx, per_page, limit)
                    .await
                    .context("Players import failed")?;
                log_player_summary(&report);
            }
        }
    }

    Ok(())
}

async fn build_context(cli: &Cli) -> anyhow::Result<ImportContext> {
    tracing::info!("Connecting to database...");
    let db = Database::new(&cli.database_url)
        .await
        .context("Failed to initialize database")?;

    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    let config = BallDontLieConfig::new(cli.api_url.clone(), cli.api_key.clone());
    let client = BallDontLieClient::new(config).context("Failed to build BallDontLie client")?;

    Ok(ImportContext::new(
        Arc::new(client),
        Arc::new(PgRecordStore::new(db)),
    ))
}

async fn run_in_background(ctx: ImportContext, job: ImportJob) -> anyhow::Result<()> {
    let handle = JobRunner::new(ctx).dispatch(job);
    tracing::info!(
        "{} queued (max {} attempts, {}s deadline per attempt)",
        job.name(),
        job.max_attempts(),
        job.timeout().as_secs()
    );

    match handle.await.context("Import job panicked")? {
        JobOutcome::Completed { attempts, report } => {
            tracing::info!("{} finished after {} attempt(s)", job.name(), attempts);
            match report {
                ImportReport::Teams(report) => log_team_summary(&report),
                ImportReport::Players(report) => log_player_summary(&report),
            }
            Ok(())
        }
        JobOutcome::Failed { attempts, error } => Err(anyhow::Error::new(error)
            .context(format!("{} failed after {} attempt(s)", job.name(), attempts))),
    }
}

fn log_team_summary(report: &TeamImportReport) {
    tracing::info!("Teams import completed");
    tracing::info!("  {:<10} {:>6}", "Imported", report.imported);
    tracing::info!("  {:<10} {:>6}", "Updated", report.updated);
    tracing::info!("  {:<10} {:>6}", "Errors", report.errors);
    tracing::info!("  {:<10} {:>6}", "Total", report.total);
}

fn log_player_summary(report: &PlayerImportReport) {
    tracing::info!("Players import completed");
    tracing::info!("  {:<16} {:>6}", "Imported", report.imported);
    tracing::info!("  {:<16} {:>6}", "Updated", report.updated);
    tracing::info!("  {:<16} {:>6}", "Errors", report.errors);
    tracing::info!("  {:<16} {:>6}", "Total processed", report.total_processed);
    tracing::info!("  {:<16} {:>6}", "API requests", report.request_count);
}
