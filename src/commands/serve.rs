//! Relay server command handler.

use crate::config::{Config, ServerConfig};
use crate::error::Result;
use crate::relay::server;

/// Run the relay server until the process is stopped
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `listen` - Optional CLI override for the listen address
pub async fn run_serve(config: Config, listen: Option<String>) -> Result<()> {
    let server_config = resolve_server_config(config, listen);
    server::run_server(&server_config).await
}

fn resolve_server_config(config: Config, listen: Option<String>) -> ServerConfig {
    let mut server_config = config.server;
    if let Some(listen) = listen {
        server_config.listen = listen;
    }
    server_config
}
