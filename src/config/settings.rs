// Configuration structs

use anyhow::bail;
use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::agent::LoopConfig;

/// Runtime configuration, assembled once at process entry and passed down
/// by reference. Nothing below this layer reads the environment.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Ollama backend (endpoint, model, timeout)
    pub ollama: OllamaConfig,

    /// HTTP server (bind address)
    pub server: ServerConfig,

    /// Refinement loop parameters (iteration cap, score threshold)
    pub agent: LoopConfig,
}

/// Ollama backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server, no trailing slash (e.g. "http://localhost:11434")
    pub host: String,

    /// Model tag passed to /api/generate (e.g. "llama3", "mistral")
    pub model: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g. "127.0.0.1:3001")
    pub bind_address: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.ollama.host.starts_with("http://") && !self.ollama.host.starts_with("https://") {
            bail!(
                "Invalid Ollama host: '{}'\n\
                 The host must be a full URL, e.g. http://localhost:11434",
                self.ollama.host
            );
        }

        if self.ollama.model.trim().is_empty() {
            bail!("Ollama model must not be empty (set OLLAMA_MODEL, e.g. \"llama3\")");
        }

        if self.ollama.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }

        // Validate bind address format
        if !self.server.bind_address.contains(':') {
            bail!(
                "Invalid bind address: '{}'\n\
                 Bind address should be in format 'IP:PORT'\n\
                 Examples:\n  \
                 • 127.0.0.1:3001\n  \
                 • 0.0.0.0:3001",
                self.server.bind_address
            );
        }

        // Validate numeric ranges
        if self.agent.max_iterations == 0 {
            bail!("max_iterations must be greater than 0");
        }

        if self.agent.max_iterations > 25 {
            bail!(
                "max_iterations ({}) is unreasonably high\n\
                 Recommended range: 1-10; each iteration costs two model calls",
                self.agent.max_iterations
            );
        }

        if self.agent.threshold > 10 {
            bail!(
                "threshold ({}) is out of range\n\
                 The critic scores explanations on a 0-10 scale",
                self.agent.threshold
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.ollama.model, "llama3");
        assert_eq!(config.server.bind_address, "127.0.0.1:3001");
    }

    #[test]
    fn test_validate_rejects_bare_host() {
        let mut config = Config::default();
        config.ollama.host = "localhost:11434".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = Config::default();
        config.ollama.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bind_address_without_port() {
        let mut config = Config::default();
        config.server.bind_address = "127.0.0.1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let mut config = Config::default();
        config.agent.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_threshold_above_scale() {
        let mut config = Config::default();
        config.agent.threshold = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_threshold_at_scale_top() {
        let mut config = Config::default();
        config.agent.threshold = 10;
        assert!(config.validate().is_ok());
    }
}
