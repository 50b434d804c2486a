//! Null (silent) audio backend.
//!
//! Accepts any non-empty byte buffer as a one-second silent mono sound and
//! discards playback.  Used when no audio output is compiled in or available;
//! the engine keeps making decisions and logging them.

use std::sync::atomic::{AtomicU64, Ordering};

use super::backend::{AudioBackend, AudioError, DecodedSound, PlaybackHandle};

const SILENT_RATE: u32 = 8_000;

pub struct NullBackend {
    next_handle: AtomicU64,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
        }
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for NullBackend {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedSound, AudioError> {
        if bytes.is_empty() {
            return Err(AudioError::Decode("empty buffer".into()));
        }
        Ok(DecodedSound::new(1, SILENT_RATE, vec![0.0; SILENT_RATE as usize]))
    }

    fn play(&self, sound: &DecodedSound, volume: f32) -> Result<PlaybackHandle, AudioError> {
        let handle = PlaybackHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        log::debug!(
            "audio(null): handle={} len={:.2}s volume={volume:.2}",
            handle.0,
            sound.duration().as_secs_f32()
        );
        Ok(handle)
    }
}
