// Model invoker seam — one async trait in front of the generation backend

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod ollama;

pub use ollama::OllamaClient;

/// Unified generation interface for the Ollama backend and test doubles.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Plain-text generation. Implementations return the reply trimmed.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;

    /// JSON-mode generation, parsed into a JSON value through
    /// `parse_structured_response`.
    async fn generate_structured(&self, prompt: &str) -> Result<Value, GenerateError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// What can go wrong on a single model call.
///
/// There is no retry layer: the first failure aborts the run that issued
/// the call, and the caller reports it.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The call could not be completed (connect failure, timeout, bad envelope).
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("model backend returned {status}: {body}")]
    Backend {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Structured-mode output that stayed unparseable after fallback extraction.
    #[error("malformed structured response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

/// Parse a structured-mode reply into a JSON value.
///
/// The model is asked for bare JSON but may wrap it in prose or markdown
/// code fences. Strict parse first; on failure, reparse the substring from
/// the first `{` through the last `}`. If neither attempt succeeds the
/// reply is malformed.
pub fn parse_structured_response(text: &str) -> Result<Value, GenerateError> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(err) => match extract_json_object(text) {
            Some(candidate) => {
                serde_json::from_str(candidate).map_err(GenerateError::MalformedResponse)
            }
            None => Err(GenerateError::MalformedResponse(err)),
        },
    }
}

/// The substring spanning the first `{` through the last `}`, if any.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
