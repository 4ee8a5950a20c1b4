//! ai-task-gateway - streaming AI task gateway
//!
//! Loads `.env`, the YAML configuration and CLI overrides, then serves HTTP.

use ai_task_gateway::config::Config;
use ai_task_gateway::server;
use ai_task_gateway::utils::logging::init_logging;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "Streaming AI task gateway")]
struct Args {
    /// YAML configuration file; environment-only configuration when absent
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

async fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::from_env().context("Failed to load configuration from environment")?,
    };

    if let Some(host) = &args.host {
        config.gateway.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.gateway.server.port = port;
    }
    Ok(config)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args).await?;
    init_logging(&config.gateway.logging);
    info!(version = ai_task_gateway::VERSION, "Starting ai-task-gateway");

    server::run_server(config).await.context("Gateway server failed")
}

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is normal outside development
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
