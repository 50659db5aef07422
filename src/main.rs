mod commands;
mod components;
mod config;
mod error;
mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting Eventbotti");

    // Load configuration
    let config = startup::load_config().await?;

    // Start the bot
    startup::start_bot(config).await
}
