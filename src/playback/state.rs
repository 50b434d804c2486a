//! Session-wide playback state.
//!
//! [`EngineState`] is created once per session and shared by reference with
//! every operation.  Each map is keyed by sound key, so different sounds
//! never contend on the same entry; the maps sit behind short-lived
//! `std::sync::Mutex` locks that are never held across `.await`.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::audio::BufferCache;

use super::variation::pick_index;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct EngineState {
    /// sound key → last confirmed dispatch time (cooldown).
    recently_played: Mutex<HashMap<String, Instant>>,
    /// sound key → index of the previous variation pick.
    last_variation: Mutex<HashMap<String, usize>>,
    /// sound keys with a dispatch that has not resolved yet.
    dispatching: Mutex<HashSet<String>>,
    /// Decoded buffers plus in-flight loads.
    buffers: BufferCache,
}

impl EngineState {
    pub fn new(buffers: BufferCache) -> Self {
        Self {
            recently_played: Mutex::new(HashMap::new()),
            last_variation: Mutex::new(HashMap::new()),
            dispatching: Mutex::new(HashSet::new()),
            buffers,
        }
    }

    pub fn buffers(&self) -> &BufferCache {
        &self.buffers
    }

    // -----------------------------------------------------------------------
    // Cooldown
    // -----------------------------------------------------------------------

    /// Time left before `key` may be dispatched again, or `None` when it is
    /// eligible at `now`.  A sound is eligible exactly `window` after its last
    /// dispatch.
    pub fn cooldown_remaining(&self, key: &str, now: Instant, window: Duration) -> Option<Duration> {
        let last = *lock(&self.recently_played).get(key)?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < window).then(|| window - elapsed)
    }

    pub fn mark_played(&self, key: &str, at: Instant) {
        lock(&self.recently_played).insert(key.to_string(), at);
    }

    pub fn last_played(&self, key: &str) -> Option<Instant> {
        lock(&self.recently_played).get(key).copied()
    }

    // -----------------------------------------------------------------------
    // In-flight dispatches
    // -----------------------------------------------------------------------

    /// Claim `key` for a dispatch; `false` if one is already unresolved.
    pub fn try_begin_dispatch(&self, key: &str) -> bool {
        lock(&self.dispatching).insert(key.to_string())
    }

    pub fn end_dispatch(&self, key: &str) {
        lock(&self.dispatching).remove(key);
    }

    pub fn is_dispatching(&self, key: &str) -> bool {
        lock(&self.dispatching).contains(key)
    }

    // -----------------------------------------------------------------------
    // Variations
    // -----------------------------------------------------------------------

    /// Choose the next variation index for `key` and remember it.
    pub fn pick_variation(&self, key: &str, count: usize) -> usize {
        let mut last = lock(&self.last_variation);
        let index = pick_index(count, last.get(key).copied(), &mut rand::rng());
        last.insert(key.to_string(), index);
        index
    }

    pub fn last_variation(&self, key: &str) -> Option<usize> {
        lock(&self.last_variation).get(key).copied()
    }
}
