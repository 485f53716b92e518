// Configuration loader
// Builds the runtime Config from environment variables with documented defaults.

use anyhow::{Context, Result};

use super::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_MAX_ITERATIONS, DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SCORE_THRESHOLD,
};
use super::settings::{Config, OllamaConfig, ServerConfig};
use crate::agent::LoopConfig;

/// Load configuration from the environment.
///
/// Recognised variables, all optional:
/// - `OLLAMA_HOST` — Ollama base URL (default `http://localhost:11434`)
/// - `OLLAMA_MODEL` — model tag (default `llama3`)
/// - `OLLAMA_TIMEOUT_SECS` — per-request timeout (default 120)
/// - `BIND_ADDR` — full server socket address (default `127.0.0.1:3001`)
/// - `PORT` — port only, bound on 127.0.0.1; `BIND_ADDR` wins when both are set
/// - `SIMPLIFIER_MAX_ITERATIONS` — fresh-run iteration cap (default 5)
/// - `SIMPLIFIER_THRESHOLD` — stop score on the 0-10 scale (default 8)
///
/// A variable that is set but unparseable is an error, not a silent default.
pub fn load_config() -> Result<Config> {
    let host = match env_var("OLLAMA_HOST") {
        Some(value) => value.trim_end_matches('/').to_string(),
        None => DEFAULT_OLLAMA_HOST.to_string(),
    };
    let model = env_var("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
    let request_timeout_secs =
        parse_var("OLLAMA_TIMEOUT_SECS")?.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    let bind_address = match env_var("BIND_ADDR") {
        Some(addr) => addr,
        None => match parse_var::<u16>("PORT")? {
            Some(port) => format!("127.0.0.1:{port}"),
            None => DEFAULT_BIND_ADDR.to_string(),
        },
    };

    let max_iterations =
        parse_var("SIMPLIFIER_MAX_ITERATIONS")?.unwrap_or(DEFAULT_MAX_ITERATIONS);
    let threshold = parse_var("SIMPLIFIER_THRESHOLD")?.unwrap_or(DEFAULT_SCORE_THRESHOLD);

    let config = Config {
        ollama: OllamaConfig {
            host,
            model,
            request_timeout_secs,
        },
        server: ServerConfig { bind_address },
        agent: LoopConfig {
            max_iterations,
            threshold,
        },
    };

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

/// Read a variable, treating unset and blank as absent.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Read and parse a variable; set-but-unparseable is an error.
fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env_var(name) {
        Some(value) => {
            let parsed = value
                .parse()
                .with_context(|| format!("{name} must be a number, got '{value}'"))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
