// Integration tests for the HTTP/SSE transport.
//
// Strategy
// --------
// The router is driven with tower::ServiceExt::oneshot() against canned
// generators, so no Ollama backend is needed. SSE responses are read to
// completion (the stream ends once the loop task finishes and drops its
// sender) and parsed frame by frame.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt; // provides .oneshot()

use simplifier::agent::LoopConfig;
use simplifier::generators::{GenerateError, Generator};
use simplifier::server::{create_router, AppState};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Answers every explain call with the same text and every critic call with
/// a fixed score.
struct CannedGenerator {
    score: f64,
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Ok("A crisp explanation.".to_string())
    }

    async fn generate_structured(&self, _prompt: &str) -> Result<Value, GenerateError> {
        Ok(json!({ "score": self.score, "issues": [], "suggestions": ["trim it"] }))
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Fails every call, as an unreachable backend would.
struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Err(GenerateError::Backend {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "model not loaded".to_string(),
        })
    }

    async fn generate_structured(&self, _prompt: &str) -> Result<Value, GenerateError> {
        Err(GenerateError::Backend {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "model not loaded".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn test_router(generator: Arc<dyn Generator>) -> axum::Router {
    create_router(AppState {
        generator,
        loop_config: LoopConfig::default(),
        model: "test-model".to_string(),
    })
}

async fn oneshot_get(router: axum::Router, uri: &str) -> axum::response::Response {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request");

    router.oneshot(req).await.expect("oneshot failed")
}

/// Read an Axum response body to completion as a UTF-8 string.
async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}

/// Parse the `data:` frames out of an SSE body.
fn sse_frames(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|json| serde_json::from_str(json).expect("frame is not valid JSON"))
        .collect()
}

fn frame_types(frames: &[Value]) -> Vec<String> {
    frames
        .iter()
        .map(|f| f["type"].as_str().unwrap_or("?").to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Request validation
// ---------------------------------------------------------------------------

/// GET /simplify without a concept is a 400 with the exact error body.
#[tokio::test]
async fn test_missing_concept_returns_400() {
    let router = test_router(Arc::new(CannedGenerator { score: 9.0 }));
    let resp = oneshot_get(router, "/simplify").await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_string(resp).await).expect("body is not JSON");
    assert_eq!(body, json!({ "error": "Concept is required" }));
}

/// A blank concept counts as missing.
#[tokio::test]
async fn test_blank_concept_returns_400() {
    let router = test_router(Arc::new(CannedGenerator { score: 9.0 }));
    let resp = oneshot_get(router, "/simplify?concept=%20%20").await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// SSE streaming
// ---------------------------------------------------------------------------

/// The happy path streams the loop's events as SSE data frames and closes
/// with a terminal done frame.
#[tokio::test]
async fn test_simplify_streams_events_then_done() {
    let router = test_router(Arc::new(CannedGenerator { score: 9.0 }));
    let resp = oneshot_get(router, "/simplify?concept=entropy").await;

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        content_type.starts_with("text/event-stream"),
        "expected an SSE content type, got {content_type}"
    );

    let frames = sse_frames(&body_string(resp).await);
    assert_eq!(
        frame_types(&frames),
        vec!["thinking", "explanation", "thinking", "feedback", "stop", "done"]
    );

    assert_eq!(frames[0]["role"], "Explainer");
    assert_eq!(frames[0]["step"], "Initial Explanation");
    assert_eq!(frames[1]["content"], "A crisp explanation.");
    assert_eq!(frames[1]["iteration"], 1);
    assert_eq!(frames[3]["score"], 9.0);
    assert_eq!(frames[4]["reason"], "Threshold reached (9/10)");
}

/// Follow-up parameters (camelCase on the wire) reach the core: the run is
/// capped at 2 iterations, starts in refinement, and ends without a stop
/// frame.
#[tokio::test]
async fn test_simplify_followup_query_params() {
    let router = test_router(Arc::new(CannedGenerator { score: 2.0 }));
    let resp = oneshot_get(
        router,
        "/simplify?concept=entropy&feedback=shorter&lastExplanation=Old+text",
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let frames = sse_frames(&body_string(resp).await);
    let types = frame_types(&frames);

    let explanations = types.iter().filter(|t| *t == "explanation").count();
    assert_eq!(explanations, 2, "follow-up runs cap at 2 iterations");
    assert!(
        !types.iter().any(|t| t == "stop"),
        "follow-up ending at its cap is silent; got {types:?}"
    );
    assert_eq!(types.last().map(String::as_str), Some("done"));

    assert_eq!(frames[0]["step"], "Refinement Iteration 1");
}

/// Blank follow-up parameters count as absent: the run is a fresh one with
/// the full iteration budget.
#[tokio::test]
async fn test_blank_followup_params_are_ignored() {
    let router = test_router(Arc::new(CannedGenerator { score: 2.0 }));
    let resp = oneshot_get(
        router,
        "/simplify?concept=entropy&feedback=&lastExplanation=%20",
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let frames = sse_frames(&body_string(resp).await);
    let types = frame_types(&frames);

    let explanations = types.iter().filter(|t| *t == "explanation").count();
    assert_eq!(explanations, 5, "fresh runs get the full budget");
    assert_eq!(frames[0]["step"], "Initial Explanation");
}

/// A backend failure surfaces as a single terminal error frame after
/// whatever events the loop managed to emit.
#[tokio::test]
async fn test_backend_failure_yields_error_frame() {
    let router = test_router(Arc::new(FailingGenerator));
    let resp = oneshot_get(router, "/simplify?concept=entropy").await;

    assert_eq!(resp.status(), StatusCode::OK, "the stream itself opens fine");
    let frames = sse_frames(&body_string(resp).await);
    let types = frame_types(&frames);

    assert_eq!(types, vec!["thinking", "error"]);
    let message = frames[1]["message"].as_str().expect("error has a message");
    assert!(
        message.contains("model not loaded"),
        "error message should carry the backend body; got: {message}"
    );
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// /health reports ok plus the configured model id.
#[tokio::test]
async fn test_health_endpoint() {
    let router = test_router(Arc::new(CannedGenerator { score: 9.0 }));
    let resp = oneshot_get(router, "/health").await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(resp).await).expect("body is not JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "test-model");
}
