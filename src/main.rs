mod api;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod services;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::{AnalysisEngine, Renderer};

#[derive(Parser)]
#[command(name = "matchup-analyzer")]
#[command(about = "Mock football matchup statistics and betting-style recommendations")]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// List the leagues of the configured catalog
    Leagues,
    /// List the teams of a league
    Teams {
        #[arg(short, long)]
        league: String,
    },
    /// Show a team's most recent results in a league
    Matches {
        /// League id
        #[arg(short, long)]
        league: String,
        /// Team id or name
        #[arg(short, long)]
        team: String,
        /// Number of matches to list
        #[arg(long, default_value_t = models::SAMPLE_SIZE)]
        last: u32,
    },
    /// Analyse a matchup between two teams of a league
    Analyze {
        /// League id or name
        #[arg(short, long)]
        league: String,
        /// Home team id or name
        #[arg(long)]
        home: String,
        /// Away team id or name
        #[arg(long)]
        away: String,
        /// Seed for reproducible statistics
        #[arg(short, long)]
        seed: Option<u64>,
        /// Print the raw report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create the SQLite schema and load the built-in catalog
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    cli.config.validate()?;

    let engine = Arc::new(cli.config.build_engine()?);

    match cli.command {
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database at {}", cli.config.database_url);
            db::init_database(&cli.config.database_url).await?;
        }
        Some(Commands::Leagues) => {
            let catalog = cli.config.build_catalog().await?;
            cli::show_leagues(catalog).await?;
        }
        Some(Commands::Teams { league }) => {
            tracing::info!("Listing teams for league: {}", league);
            let catalog = cli.config.build_catalog().await?;
            cli::show_teams(catalog, &league).await?;
        }
        Some(Commands::Matches { league, team, last }) => {
            let catalog = cli.config.build_catalog().await?;
            cli::show_matches(catalog, &league, &team, last).await?;
        }
        Some(Commands::Analyze {
            league,
            home,
            away,
            seed,
            json,
        }) => {
            tracing::info!("Analysing {} vs {} in {}", home, away, league);
            let catalog = cli.config.build_catalog().await?;
            let args = cli::AnalyzeArgs {
                league: &league,
                home: &home,
                away: &away,
                seed,
                json,
            };
            cli::analyze(catalog, engine, Renderer::local(cli.config.language), args).await?;
        }
        Some(Commands::Serve { port }) => serve(&cli.config, engine, port).await?,
        None => {
            // Default to serving
            serve(&cli.config, engine, 3000).await?;
        }
    }

    Ok(())
}

async fn serve(config: &AppConfig, engine: Arc<AnalysisEngine>, port: u16) -> Result<()> {
    tracing::info!("Starting matchup analyzer API server on port {}", port);
    let state = api::AppState {
        catalog: config.build_catalog().await?,
        engine,
        language: config.language,
    };
    api::serve(port, state).await
}
