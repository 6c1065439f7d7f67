//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod browse;
pub mod config;
pub mod feedback;
pub mod search;

use crate::backend::{get_backend, HttpBackend};
use crate::config::Config;
use crate::error::Result;
use crate::search::{CoordinatorConfig, SearchCoordinator};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Find gluten-free restaurants, cafes and bakeries nearby
#[derive(Parser)]
#[command(name = "gf-finder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search places around a coordinate, a city or your location
    Search(search::SearchArgs),

    /// Interactive session: change city, filter or location and watch results
    Browse(browse::BrowseArgs),

    /// Send feedback to the maintainers
    Feedback(feedback::FeedbackArgs),

    /// List the filters on offer
    Filters,

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Search(args) => search::run(args).await,
        Commands::Browse(args) => browse::run(args).await,
        Commands::Feedback(args) => feedback::run(args).await,
        Commands::Filters => search::list_filters(),
        Commands::Config(args) => config::run(args),
    }
}

/// Log to stderr so results on stdout stay clean; `RUST_LOG` overrides
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Coordinator wired to the configured HTTP backend
pub(crate) fn build_coordinator(config: &Config) -> Result<SearchCoordinator<HttpBackend>> {
    let backend = Arc::new(get_backend(config)?);
    let settings = CoordinatorConfig::from_config(config)?;
    Ok(SearchCoordinator::new(backend, settings))
}
