//! Invoicely Server Binary

use anyhow::{bail, Result};
use invoicely_server::config::{load_config, validate_config};
use invoicely_server::Server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = load_config()?;
    if let Err(errors) = validate_config(&config) {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration: {}", messages.join("; "));
    }

    invoicely_common_log::init(config.logging.to_log_config())?;

    info!("Starting Invoicely Server v{}", env!("CARGO_PKG_VERSION"));

    // Create and run server
    let server = Server::new(config).await?;
    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}
