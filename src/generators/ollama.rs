// Ollama API client — non-streaming /api/generate calls

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_structured_response, GenerateError, Generator};
use crate::config::OllamaConfig;

/// Client for a local Ollama server.
///
/// One instance is shared across requests; reqwest pools connections
/// internally. Host and model are injected via [`OllamaConfig`] — nothing
/// here reads the environment.
pub struct OllamaClient {
    client: Client,
    host: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Issue one /api/generate call and return the trimmed reply text.
    async fn request(&self, prompt: &str, json_mode: bool) -> Result<String, GenerateError> {
        let url = format!("{}/api/generate", self.host);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: json_mode.then_some("json"),
        };

        tracing::debug!(%url, json_mode, prompt_chars = prompt.len(), "Sending Ollama request");

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Ollama returned an error status");
            return Err(GenerateError::Backend {
                status,
                body: truncate_body(&body, 600),
            });
        }

        let reply: GenerateResponse = response.json().await?;
        Ok(reply.response.trim().to_string())
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.request(prompt, false).await
    }

    async fn generate_structured(&self, prompt: &str) -> Result<Value, GenerateError> {
        let text = self.request(prompt, true).await?;
        parse_structured_response(&text)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Request body for /api/generate.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    /// "json" switches Ollama into structured-output mode; omitted otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

/// Reply envelope. Ollama sends more fields (timings, context window state);
/// only the generated text matters here.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Keep error bodies log-sized.
fn truncate_body(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.trim().to_string();
    }
    let truncated: String = body.chars().take(max_chars).collect();
    format!("{}…", truncated.trim_end())
}
