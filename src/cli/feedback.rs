//! Feedback command handler

use crate::backend::{get_backend, PlacesBackend};
use crate::config::Config;
use crate::error::Result;
use clap::Args;
use tracing::info;

/// Feedback command arguments
#[derive(Args)]
pub struct FeedbackArgs {
    /// Message text; multiple words are joined with spaces
    #[arg(required = true)]
    pub content: Vec<String>,
}

/// Run the feedback command
pub async fn run(args: FeedbackArgs) -> Result<()> {
    let config = Config::load()?;
    let backend = get_backend(&config)?;

    let content = args.content.join(" ");
    backend.submit_feedback(&content).await?;
    info!(chars = content.len(), "Feedback submitted");

    println!("Thanks for your feedback!");
    Ok(())
}
