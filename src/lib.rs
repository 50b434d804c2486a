//! Context-triggered sound effects for chat messages.
//!
//! A message is matched against a catalog of sound definitions, each match is
//! scored for how likely the sound-bearing word really describes the event,
//! and the survivors are played subject to cooldowns and a concurrency cap.

pub mod analysis;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod oracle;
pub mod playback;
