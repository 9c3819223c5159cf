mod analyze;
mod catalog;
mod output;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "trendseo")]
#[command(about = "Keyword research and SEO scoring for product listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rank base and related keywords for one product
    Analyze {
        /// Product title
        #[arg(long)]
        title: String,
        /// Product category label
        #[arg(long, default_value = "")]
        category: String,
        /// Score base keywords with an assumed interest instead of fetching trends
        #[arg(long)]
        skip_trends: bool,
        /// Rows to show (defaults to TRENDSEO_DISPLAY_LIMIT)
        #[arg(long)]
        top: Option<usize>,
        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score a single keyword against a known interest value
    Score {
        #[arg(long)]
        keyword: String,
        /// Relative search interest, 0-100
        #[arg(long)]
        interest: f64,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Quick single-request keyword suggestions for a title
    Quick {
        #[arg(long)]
        title: String,
        #[arg(long)]
        json: bool,
    },
    /// Analyze every catalog product tagged for an update
    Catalog {
        /// Stop after this many tagged products
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        skip_trends: bool,
        /// Rows to show per product (defaults to TRENDSEO_DISPLAY_LIMIT)
        #[arg(long)]
        top: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = trendseo_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let profile = Arc::new(trendseo_core::load_market_profile(
        config.market_path.as_deref(),
    )?);
    tracing::debug!(market = %profile.name, "configuration loaded");

    match cli.command {
        Commands::Analyze {
            title,
            category,
            skip_trends,
            top,
            json,
        } => {
            let pipeline = analyze::build_pipeline(&config, profile)?;
            let limit = top.unwrap_or(config.display_limit);
            analyze::run_analyze(&pipeline, &title, &category, skip_trends, limit, json).await?;
        }
        Commands::Score {
            keyword,
            interest,
            title,
            category,
        } => analyze::run_score(profile, &keyword, interest, &title, &category)?,
        Commands::Quick { title, json } => {
            let pipeline = analyze::build_pipeline(&config, profile)?;
            analyze::run_quick(&pipeline, &title, json).await?;
        }
        Commands::Catalog {
            limit,
            skip_trends,
            top,
        } => {
            let display = top.unwrap_or(config.display_limit);
            catalog::run_catalog(&config, profile, limit, skip_trends, display).await?;
        }
    }

    Ok(())
}
