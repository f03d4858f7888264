use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use trivia_api::db::{self, transfer};
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database URL, overrides the configured one
    #[clap(long)]
    database_url: Option<String>,
    /// Configuration file
    #[clap(long)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import categories.csv and questions.csv from a directory
    Import { path: PathBuf },
    /// Export categories.csv and questions.csv into a directory
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&settings.log_level);

    let url = cli.database_url.unwrap_or(settings.database_url);
    let pool = db::establish_connection(&url)
        .await
        .with_context(|| format!("Cannot connect to {url}"))?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run db migrations")?;

    match cli.command {
        Commands::Export { path } => transfer::export_data(&pool, &path)
            .await
            .context("Cannot export"),
        Commands::Import { path } => transfer::import_data(&pool, &path)
            .await
            .map(|_| ())
            .context("Cannot import"),
    }
}
