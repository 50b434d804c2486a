//! The `AudioBackend` seam: decode a byte buffer, play a decoded sound.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Errors reported by asset sources and audio backends.
///
/// `Clone` so one failed shared load can be handed to every waiter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AudioError {
    /// The asset bytes could not be fetched.
    #[error("failed to fetch {asset}: {reason}")]
    Fetch { asset: String, reason: String },

    /// The bytes are not a decodable sound.
    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// The backend refused to start playback.
    #[error("playback failed: {0}")]
    Playback(String),

    /// No output device could be opened.
    #[error("audio device not available: {0}")]
    DeviceUnavailable(String),
}

// ---------------------------------------------------------------------------
// DecodedSound / PlaybackHandle
// ---------------------------------------------------------------------------

/// Interleaved f32 PCM ready for playback.  Samples are shared, so cloning a
/// decoded sound is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSound {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Arc<[f32]>,
}

impl DecodedSound {
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            channels,
            sample_rate,
            samples: samples.into(),
        }
    }

    /// Playback length; zero for an empty or malformed buffer.
    pub fn duration(&self) -> Duration {
        if self.channels == 0 || self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as f64 / self.channels as f64;
        Duration::from_secs_f64(frames / self.sample_rate as f64)
    }
}

/// Identifier of a started playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(pub u64);

// ---------------------------------------------------------------------------
// AudioBackend trait
// ---------------------------------------------------------------------------

/// Owns the output device and mixing.
///
/// Both methods are synchronous and both are called from tokio's blocking
/// pool, so they may wait on a device or mixer thread.  `play` still returns
/// once playback has started, not when it ends.
pub trait AudioBackend: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedSound, AudioError>;

    /// Start playing `sound` at `volume` (0.0 – 1.0) without waiting for it
    /// to finish.
    fn play(&self, sound: &DecodedSound, volume: f32) -> Result<PlaybackHandle, AudioError>;
}
