// HTTP/SSE transport for the simplification loop
// Serves GET /simplify as a server-sent event stream, plus a health probe

mod handlers;

pub use handlers::create_router;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::agent::{EventSink, LoopConfig, StepEvent};
use crate::config::Config;
use crate::generators::{Generator, OllamaClient};

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn Generator>,
    pub loop_config: LoopConfig,
    /// Model id reported by the health probe.
    pub model: String,
}

/// Step events flow to the SSE forwarder over an unbounded channel. A send
/// failure just means the client went away; the loop notices via `is_closed`.
impl EventSink for UnboundedSender<StepEvent> {
    fn emit(&self, event: StepEvent) {
        let _ = self.send(event);
    }

    fn is_closed(&self) -> bool {
        UnboundedSender::is_closed(self)
    }
}

/// Build the Ollama client, assemble the router, and run the server until
/// the process is stopped.
pub async fn serve(config: Config) -> Result<()> {
    let generator = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
    let state = AppState {
        generator: Arc::new(generator),
        loop_config: config.agent.clone(),
        model: config.ollama.model.clone(),
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        // The browser client is served from another origin.
        .layer(CorsLayer::permissive());

    let addr = &config.server.bind_address;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Concept Simplifier server listening on {addr}");
    tracing::info!(model = %config.ollama.model, host = %config.ollama.host, "Ollama backend");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
