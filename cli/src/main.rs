//! # scout CLI
//!
//! Command-line and browser front ends for scout - an assistant that finds
//! local events and news.
//!
//! ## Usage
//!
//! - `scout` - Start the interactive console
//! - `scout run --type events --interests jazz --budget 30` - Run one query
//! - `scout serve` - Serve the search form on http://127.0.0.1:8080
//! - `scout tools` - Show available tools

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod output;
mod session;
mod web;

use commands::{console_command, run_command, serve_command, tools_command, RunArgs, ServeArgs};
use config::CliConfigLoader;

/// scout - local event and news discovery
#[derive(Parser)]
#[command(name = "scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find local events and news with an LLM that searches the web for you")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Protocol to use (anthropic, openai)
    #[arg(long, global = true)]
    protocol: Option<String>,

    /// API key override
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long, global = true)]
    model: Option<String>,

    /// Maximum number of model turns per query
    #[arg(long, global = true)]
    max_turns: Option<usize>,

    /// Directory for exported result files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive console (default)
    Console,

    /// Run a single query and print the results
    Run(RunArgs),

    /// Serve the search form in the browser
    Serve(ServeArgs),

    /// Show available tools
    Tools,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(protocol) = &cli.protocol {
        loader = loader.with_protocol_override(protocol.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    if let Some(max_turns) = cli.max_turns {
        loader = loader.with_max_turns_override(max_turns);
    }

    if let Some(dir) = &cli.output_dir {
        loader = loader.with_output_dir_override(dir.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    // A local .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    scout_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);

    match cli.command {
        Some(Commands::Tools) => tools_command().await,
        Some(Commands::Run(args)) => run_command(args, config_loader).await,
        Some(Commands::Serve(args)) => serve_command(args, config_loader).await,
        Some(Commands::Console) | None => console_command(config_loader).await,
    }
}
