// Loop data model — Role, Critique, IterationRecord, StepEvent, EventSink

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_SCORE_THRESHOLD};

/// Which voice is acting in the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Explainer,
    Refiner,
    Critic,
}

/// The critic's structured verdict on one explanation candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Critique {
    /// Clarity score 0–10 (10 is perfect clarity and flow)
    pub score: f64,
    /// Specific phrases or sections flagged as too complex or dry
    pub issues: Vec<String>,
    /// Concrete tips for making the next revision simpler
    pub suggestions: Vec<String>,
}

impl Critique {
    /// Build a Critique, clamping the score into the valid range.
    pub fn new(score: f64, issues: Vec<String>, suggestions: Vec<String>) -> Self {
        Self {
            score: score.clamp(0.0, 10.0),
            issues,
            suggestions,
        }
    }

    /// Shape a backend JSON value into a Critique.
    ///
    /// Missing fields default (score 0, empty lists). A value that is not an
    /// object, or one with wrongly-typed fields, is a shape error for the
    /// caller to classify.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let raw: RawCritique = serde_json::from_value(value)?;
        Ok(Self::new(raw.score, raw.issues, raw.suggestions))
    }
}

/// Raw JSON shape from the model — allows missing fields, ignores extras
#[derive(Debug, Deserialize)]
struct RawCritique {
    #[serde(default)]
    score: f64,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// One completed explain-critique round
#[derive(Debug, Clone)]
pub struct IterationRecord {
    pub iteration: usize,
    pub explanation: String,
    pub critique: Critique,
}

/// Input to one simplification run
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// The concept the user wants explained
    pub concept: String,
    /// Steering text from the user on a follow-up run, if any
    pub user_feedback: Option<String>,
    /// Explanation from a previous run to refine further, if any
    pub previous_explanation: Option<String>,
}

impl RunRequest {
    pub fn new(concept: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            user_feedback: None,
            previous_explanation: None,
        }
    }

    /// A run is a follow-up when the caller supplies feedback and/or a
    /// previous explanation to build on.
    pub fn is_followup(&self) -> bool {
        self.user_feedback.is_some() || self.previous_explanation.is_some()
    }
}

/// Result returned from `SimplifierLoop::run()`
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The last explanation produced, however the loop ended
    pub final_explanation: String,
    /// One record per iteration actually executed, in order
    pub history: Vec<IterationRecord>,
}

/// Configuration for the refinement loop
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum number of explain-critique iterations for a fresh run
    pub max_iterations: usize,
    /// Score at or above which the loop stops early (0–10)
    pub threshold: u8,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

/// A progress event emitted while a run is in flight.
///
/// Discriminated on the `type` field when serialized to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepEvent {
    /// A phase is about to invoke the model.
    Thinking { role: Role, step: String },
    /// A new explanation candidate, one per iteration.
    Explanation { content: String, iteration: usize },
    /// The critic's verdict, fields flattened onto the event.
    Feedback {
        score: f64,
        issues: Vec<String>,
        suggestions: Vec<String>,
    },
    /// The loop decided to stop early.
    Stop { reason: String },
    /// Terminal success marker. Emitted by the transport, never the loop.
    Done,
    /// Terminal failure marker. Emitted by the transport, never the loop.
    Error { message: String },
}

impl StepEvent {
    /// Build a `feedback` event from a critique.
    pub fn feedback(critique: &Critique) -> Self {
        StepEvent::Feedback {
            score: critique.score,
            issues: critique.issues.clone(),
            suggestions: critique.suggestions.clone(),
        }
    }
}

/// Consumer seam for step events.
///
/// Implementations deliver events fire-and-forget; the loop never waits on a
/// consumer and never learns what transport sits behind the sink.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Delivery failure is the sink's problem.
    fn emit(&self, event: StepEvent);

    /// Whether the consumer has gone away. The loop checks this between
    /// iterations only; an in-flight model call is never interrupted.
    fn is_closed(&self) -> bool {
        false
    }
}
