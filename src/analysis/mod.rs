//! Message analysis: context extraction, heuristic scoring and the
//! [`Scorer`] that combines them with the optional oracle.
//!
//! * [`extract_sentence`] / [`surrounding_words`] — pure context extractors.
//! * [`MatchContext`] — text around one trigger match.
//! * [`heuristic_score`] — lexical fallback scoring.
//! * [`Scorer`] — exclusion check, oracle delegation, heuristic fallback.
//! * [`AnalysisResult`] / [`AnalysisReason`] — scorer output.

pub mod context;
pub mod heuristic;
pub mod scorer;

pub use context::{extract_sentence, surrounding_words, MatchContext, DEFAULT_WINDOW};
pub use heuristic::{heuristic_score, BASE_SCORE};
pub use scorer::{AnalysisReason, AnalysisResult, Scorer};
