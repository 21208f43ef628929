mod analyze;
mod ingest;
mod reviews;

use clap::{Parser, Subcommand};
use reviewdb_core::{AppConfig, ConfigError};
use tracing_subscriber::EnvFilter;

use crate::analyze::AnalyzeArgs;
use crate::reviews::ReviewsCommands;

#[derive(Debug, Parser)]
#[command(name = "reviewdb")]
#[command(about = "Customer review analysis: language, sentiment and topics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a CSV of reviews
    Analyze(AnalyzeArgs),
    /// Browse stored reviews
    Reviews {
        #[command(subcommand)]
        command: ReviewsCommands,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse first so --help and usage errors never depend on the environment.
    let cli = Cli::parse();
    let Some((command, config)) = configure(cli, reviewdb_core::load_app_config)? else {
        println!("reviewdb: run `reviewdb --help` for commands");
        return Ok(());
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Analyze(args) => analyze::run_analyze(&config, &args).await?,
        Commands::Reviews { command } => {
            let pool = connect(&config).await?;
            match command {
                ReviewsCommands::List {
                    topic,
                    sentiment,
                    source,
                    limit,
                } => {
                    reviews::run_reviews_list(
                        &pool,
                        topic.as_deref(),
                        sentiment.as_deref(),
                        source.as_deref(),
                        limit,
                    )
                    .await?;
                }
                ReviewsCommands::Summary => reviews::run_reviews_summary(&pool).await?,
            }
        }
        Commands::Db { command } => match command {
            DbCommands::Migrate => {
                let pool = connect_without_migrations(&config).await?;
                let applied = reviewdb_db::run_migrations(&pool).await?;
                println!("migrations applied: {applied}");
            }
            DbCommands::Ping => {
                let pool = connect_without_migrations(&config).await?;
                reviewdb_db::ping(&pool).await?;
                println!("database ok");
            }
        },
    }

    Ok(())
}

/// Pair the parsed command with its configuration.
///
/// `load_config` runs only when there is a command to execute.
fn configure<F>(cli: Cli, load_config: F) -> anyhow::Result<Option<(Commands, AppConfig)>>
where
    F: FnOnce() -> Result<AppConfig, ConfigError>,
{
    let Some(command) = cli.command else {
        return Ok(None);
    };
    let config = load_config()?;
    Ok(Some((command, config)))
}

async fn connect_without_migrations(config: &AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool_config = reviewdb_db::PoolConfig::from_app_config(config);
    let pool = reviewdb_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

/// Connect and bring the schema up to date.
pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = connect_without_migrations(config).await?;
    let applied = reviewdb_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "database migrations applied");
    }
    Ok(pool)
}

#[cfg(test)]
mod tests;
