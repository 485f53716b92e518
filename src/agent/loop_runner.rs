// Refinement loop — iterative explain-critique-refine until clear enough

use std::sync::Arc;

use crate::config::constants::FOLLOWUP_MAX_ITERATIONS;
use crate::generators::{GenerateError, Generator};

use super::prompts;
use super::types::{
    Critique, EventSink, IterationRecord, LoopConfig, Role, RunOutcome, RunRequest, StepEvent,
};

/// The explain-critique-refine loop.
///
/// Drives one simplification run until one of the following conditions is met:
/// - The critic's score reaches the configured threshold
/// - The configured iteration maximum is reached
/// - A follow-up run exhausts its shorter cap
/// - The event consumer goes away (checked between iterations)
pub struct SimplifierLoop {
    generator: Arc<dyn Generator>,
    config: LoopConfig,
}

impl SimplifierLoop {
    pub fn new(generator: Arc<dyn Generator>, config: LoopConfig) -> Self {
        Self { generator, config }
    }

    /// Run the full loop for one request, emitting progress events to `sink`.
    ///
    /// Any generator failure aborts the run immediately: the error propagates,
    /// history stays as completed iterations only, and no terminal event is
    /// emitted here (terminal framing belongs to the transport).
    pub async fn run(
        &self,
        request: &RunRequest,
        sink: &dyn EventSink,
    ) -> Result<RunOutcome, GenerateError> {
        let mut explanation = request.previous_explanation.clone().unwrap_or_default();
        let mut critique: Option<Critique> = None;
        let mut history: Vec<IterationRecord> = Vec::new();

        // Follow-up runs refine existing material and get a short cap
        // instead of the full iteration budget.
        let cap = if request.is_followup() {
            FOLLOWUP_MAX_ITERATIONS
        } else {
            self.config.max_iterations
        };

        tracing::info!(
            concept = %request.concept,
            followup = request.is_followup(),
            cap,
            "Starting simplification run"
        );

        for iteration in 1..=cap {
            // ── 1. Explain / refine ─────────────────────────────────────────
            let fresh_start = iteration == 1 && !request.is_followup();
            let step = if fresh_start {
                "Initial Explanation".to_string()
            } else {
                format!("Refinement Iteration {iteration}")
            };
            // Iteration 1 always announces the Explainer, even when a
            // follow-up goes straight to refinement.
            let role = if iteration == 1 {
                Role::Explainer
            } else {
                Role::Refiner
            };
            sink.emit(StepEvent::Thinking { role, step });

            let prompt = if fresh_start {
                prompts::explain_prompt(&request.concept)
            } else {
                // The user's steering text applies to the first pass only;
                // afterwards the critique drives refinement.
                let user_request = if iteration == 1 {
                    request.user_feedback.as_deref()
                } else {
                    None
                };
                prompts::refine_prompt(
                    &request.concept,
                    &explanation,
                    critique.as_ref(),
                    user_request,
                )
            };

            tracing::debug!(iteration, fresh_start, "Generating explanation");
            explanation = self.generator.generate(&prompt).await?;
            sink.emit(StepEvent::Explanation {
                content: explanation.clone(),
                iteration,
            });

            // ── 2. Critique ─────────────────────────────────────────────────
            sink.emit(StepEvent::Thinking {
                role: Role::Critic,
                step: "Evaluating complexity...".to_string(),
            });
            let verdict_json = self
                .generator
                .generate_structured(&prompts::critique_prompt(&explanation))
                .await?;
            let verdict =
                Critique::from_value(verdict_json).map_err(GenerateError::MalformedResponse)?;
            sink.emit(StepEvent::feedback(&verdict));

            tracing::debug!(iteration, score = verdict.score, "Iteration scored");

            history.push(IterationRecord {
                iteration,
                explanation: explanation.clone(),
                critique: verdict.clone(),
            });

            // ── 3. Stop decision ────────────────────────────────────────────
            if verdict.score >= f64::from(self.config.threshold) {
                sink.emit(StepEvent::Stop {
                    reason: format!("Threshold reached ({}/10)", verdict.score),
                });
                break;
            }
            // The configured maximum, not the follow-up cap: a follow-up that
            // runs out of its shorter budget ends without a stop event.
            if iteration == self.config.max_iterations {
                sink.emit(StepEvent::Stop {
                    reason: "Maximum iterations reached".to_string(),
                });
                break;
            }

            critique = Some(verdict);

            if sink.is_closed() {
                tracing::debug!(iteration, "Event sink closed; ending run early");
                break;
            }
        }

        tracing::info!(iterations = history.len(), "Simplification run complete");

        Ok(RunOutcome {
            final_explanation: explanation,
            history,
        })
    }
}
