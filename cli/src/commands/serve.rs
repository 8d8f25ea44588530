//! Browser form server command

use crate::config::CliConfigLoader;
use crate::web::{self, DEFAULT_BIND};
use anyhow::{Context, Result};
use clap::Args;
use std::net::SocketAddr;
use tracing::info;

/// Arguments of `scout serve`
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: String,
}

/// Serve the search form until interrupted
pub async fn serve_command(args: ServeArgs, config_loader: CliConfigLoader) -> Result<()> {
    let addr: SocketAddr = args
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", args.bind))?;

    // Fail before binding when credentials are missing
    let config = config_loader.load().await?;
    info!(
        "Using {} model {} (config: {})",
        config.llm.protocol.as_str(),
        config.llm.model,
        config.source
    );

    web::serve(config, addr).await
}
