//! cmdwire: remote command execution over a JSON line protocol
//!
//! One binary, two roles:
//! - `cmdwire serve` listens for connections and executes each framed
//!   command through the host shell, one session task per client
//! - `cmdwire connect` prompts the operator for command lines and
//!   displays each result
//!
//! Configuration via CLI arguments or TOML file.

mod client;
mod config;
mod executor;
mod protocol;
mod server;

use config::{Config, Mode};
use server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match config.mode {
        Mode::Serve { listen } => {
            info!(address = %listen, "Starting cmdwire server");
            Server::new(listen).run().await
        }
        Mode::Connect { address } => {
            info!(address = %address, "Starting cmdwire client");
            client::run(&address).await
        }
    }
}
