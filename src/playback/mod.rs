//! Playback module: decides which matched sounds actually play.
//!
//! # Architecture
//!
//! ```text
//! chat message
//!      │
//!      ▼
//! PlaybackScheduler::handle_message()
//!      │
//!      ├─ Scorer::best_match per enabled sound     (analysis)
//!      ├─ threshold, score order, cooldown, cap   (EngineState)
//!      └─ pick_index → BufferCache → AudioBackend (audio)
//! ```
//!
//! [`EngineState`] holds everything that lives for a session: cooldown
//! timestamps, the last variation per sound, unresolved dispatches and the
//! decoded buffer cache.

pub mod scheduler;
pub mod state;
pub mod variation;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use scheduler::{Candidate, DispatchOutcome, PlaybackScheduler, PlaybackStatus, SchedulerError};
pub use state::EngineState;
pub use variation::pick_index;
