//! Optional external text-scoring oracle.
//!
//! This module provides:
//! * [`TextOracle`] — async trait implemented by all oracle backends.
//! * [`ApiOracle`] — OpenAI-compatible REST API client.
//! * [`PromptBuilder`] — builds bounded scoring prompts.
//! * [`OracleCache`] — bounded session cache of oracle scores.
//! * [`OracleError`] — error variants for oracle calls.
//!
//! The oracle is never a hard dependency: the [`Scorer`](crate::analysis::Scorer)
//! swallows every [`OracleError`] and falls back to heuristics.

pub mod cache;
pub mod client;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use cache::OracleCache;
pub use client::{parse_score, ApiOracle, OracleError, TextOracle};
pub use prompt::PromptBuilder;
