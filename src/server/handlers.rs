// Request handlers — the SSE simplify stream and the health probe

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use futures::stream::{self, Stream};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;

use crate::agent::{RunRequest, SimplifierLoop, StepEvent};

use super::AppState;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/simplify", get(simplify))
        .route("/health", get(health))
        .with_state(state)
}

/// Query parameters for GET /simplify. Names match the browser client's
/// query string.
#[derive(Debug, Deserialize)]
struct SimplifyParams {
    concept: Option<String>,
    feedback: Option<String>,
    #[serde(rename = "lastExplanation")]
    last_explanation: Option<String>,
}

/// GET /simplify — run the loop for one request, streaming step events.
///
/// A missing or blank `concept` is a 400 with a JSON error body and no
/// events. Blank `feedback` / `lastExplanation` count as absent, so they
/// cannot turn a fresh run into a follow-up. The stream ends with one
/// terminal frame: `done` on success, `error` when the run failed.
async fn simplify(State(state): State<AppState>, Query(params): Query<SimplifyParams>) -> Response {
    let Some(concept) = normalize(params.concept) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Concept is required" })),
        )
            .into_response();
    };

    let request = RunRequest {
        concept,
        user_feedback: normalize(params.feedback),
        previous_explanation: normalize(params.last_explanation),
    };

    let runner = SimplifierLoop::new(Arc::clone(&state.generator), state.loop_config.clone());
    let (tx, rx) = mpsc::unbounded_channel::<StepEvent>();

    tokio::spawn(async move {
        match runner.run(&request, &tx).await {
            Ok(outcome) => {
                tracing::debug!(
                    iterations = outcome.history.len(),
                    "Forwarding terminal done frame"
                );
                let _ = tx.send(StepEvent::Done);
            }
            Err(err) => {
                tracing::error!(error = %err, "Simplification run failed");
                let _ = tx.send(StepEvent::Error {
                    message: err.to_string(),
                });
            }
        }
        // tx drops here; the stream below ends once drained.
    });

    Sse::new(event_stream(rx))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// GET /health — liveness probe.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "model": state.model }))
}

/// Adapt the receiver into an SSE stream, one JSON data frame per event.
fn event_stream(
    rx: mpsc::UnboundedReceiver<StepEvent>,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Event::default().json_data(&event), rx))
    })
}

/// Treat blank query values as absent; trim the rest.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
