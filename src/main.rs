// Concept Simplifier - HTTP/SSE service entry point

use anyhow::{Context, Result};
use clap::Parser;

use simplifier::config::load_config;
use simplifier::server;

#[derive(Parser, Debug)]
#[command(name = "simplifier")]
#[command(about = "Explain-critique-refine service for beginner-friendly explanations", long_about = None)]
struct Args {
    /// Socket address to listen on (overrides BIND_ADDR / PORT)
    #[arg(long)]
    bind: Option<String>,

    /// Ollama model id (overrides OLLAMA_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Ollama base URL (overrides OLLAMA_HOST)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; RUST_LOG overrides the info default
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration from the environment, then apply CLI overrides
    let mut config = load_config()?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(model) = args.model {
        config.ollama.model = model;
    }
    if let Some(host) = args.host {
        config.ollama.host = host.trim_end_matches('/').to_string();
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    server::serve(config).await
}
