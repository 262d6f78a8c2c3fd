//! Rougechat - Terminal chat client with an HTTP relay
//!
#![doc = "Rougechat - Terminal chat client with an HTTP relay"]
#![doc = "Main entry point for the rougechat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rougechat::cli::{Cli, Commands};
use rougechat::commands;
use rougechat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a data directory on the CLI, mirror it into
    // ROUGECHAT_DATA_DIR so the storage initializer can pick it up. This
    // keeps callers unchanged while allowing `FileStorage::new()` to honor
    // an override.
    if let Some(data_dir) = &cli.data_dir {
        std::env::set_var("ROUGECHAT_DATA_DIR", data_dir);
        tracing::info!(
            "Using data directory override from CLI: {}",
            data_dir.display()
        );
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { new } => {
            tracing::info!("Starting interactive chat mode");
            if new {
                tracing::debug!("Starting with a fresh conversation");
            }

            // Delegate to the chat command handler
            // Moves `config` into the handler (match arms are exclusive)
            commands::chat::run_chat(config, new).await?;
            Ok(())
        }
        Commands::Serve { listen } => {
            tracing::info!("Starting relay server mode");
            if let Some(addr) = &listen {
                tracing::debug!("Using listen override: {}", addr);
            }

            commands::serve::run_serve(config, listen).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rougechat=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
