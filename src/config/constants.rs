// Project-wide constants
//
// Centralised here so port numbers and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Default base URL of the Ollama server.
///
/// Ollama serves on 11434 out of the box; override with `OLLAMA_HOST`.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Default model tag requested from Ollama.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Default per-request timeout for model calls, in seconds.
///
/// Local models can take minutes per completion on modest hardware,
/// and a cold model load adds more on the first call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default bind address for the HTTP server (localhost only).
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";

/// Default maximum refinement iterations for a fresh run.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Default critic score (out of 10) at which a run stops early.
pub const DEFAULT_SCORE_THRESHOLD: u8 = 8;

/// Iteration cap for follow-up runs seeded with prior state.
pub const FOLLOWUP_MAX_ITERATIONS: usize = 2;
