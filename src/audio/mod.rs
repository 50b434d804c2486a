//! Audio module: asset fetching, decoding, caching and playback.
//!
//! * [`AudioBackend`] — decode bytes, play decoded sounds (owns the mixer).
//! * [`AssetSource`] / [`FsAssetSource`] — fetch raw asset bytes.
//! * [`BufferCache`] — session cache of decoded sounds; one load per asset
//!   no matter how many callers ask concurrently.
//! * [`NullBackend`] — silent backend, always available.
//! * `RodioBackend` — real output through rodio (cargo feature `rodio`).

pub mod backend;
pub mod loader;
pub mod null;
#[cfg(feature = "rodio")]
pub mod rodio_backend;
pub mod source;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use backend::{AudioBackend, AudioError, DecodedSound, PlaybackHandle};
pub use loader::BufferCache;
pub use null::NullBackend;
#[cfg(feature = "rodio")]
pub use rodio_backend::RodioBackend;
pub use source::{AssetSource, FsAssetSource};
