// Concept Simplifier core — the explain-critique-refine loop
//
// One run: an Explainer drafts a beginner-friendly explanation, a Critic
// scores it for clarity, and a Refiner reworks it until the score clears
// the threshold or the iteration budget runs out. Progress streams to an
// injected event sink; the loop never knows what transport sits behind it.

pub mod loop_runner;
pub mod prompts;
pub mod types;

pub use loop_runner::SimplifierLoop;
pub use types::{
    Critique, EventSink, IterationRecord, LoopConfig, Role, RunOutcome, RunRequest, StepEvent,
};
