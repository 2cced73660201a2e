mod report;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use outage_core::DEFAULT_WINDOW_HOURS;
use outage_summary::{AnthropicClient, TextGenerator};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "outage-cli")]
#[command(about = "Outage dashboard operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Print technical-support call counts per area
    Areas {
        /// Trailing window size in hours
        #[arg(long, default_value_t = DEFAULT_WINDOW_HOURS)]
        hours: i64,
    },
    /// Generate an incident summary for one area
    Summarize {
        /// Five-digit area code (e.g., 06105)
        #[arg(long)]
        area: String,
        /// Trailing window size in hours
        #[arg(long, default_value_t = DEFAULT_WINDOW_HOURS)]
        hours: i64,
        /// Use the terse network-team alert wording instead of the analyst overview
        #[arg(long)]
        alert: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = outage_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = outage_db::PoolConfig::from_app_config(&config);
    let pool = outage_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Migrate => {
            let applied = outage_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
        Commands::Areas { hours } => report::run_areas(&pool, hours).await?,
        Commands::Summarize { area, hours, alert } => {
            let generator = AnthropicClient::from_config(&config)?
                .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
            if generator.is_none() {
                tracing::warn!("ANTHROPIC_API_KEY is not set; summary generation will fail");
            }
            report::run_summarize(pool, generator, &area, hours, alert).await?;
        }
    }

    Ok(())
}
