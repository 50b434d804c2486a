//! Session cache of oracle scores.
//!
//! Keys are derived from the sound key and the first characters of the
//! sentence, so recurring phrasing is scored once.  Reads use `peek`, which
//! leaves recency untouched: once full, the oldest inserted entry is evicted
//! first.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use super::prompt::truncate_chars;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_KEY_CHARS: usize = 50;

pub struct OracleCache {
    entries: Mutex<LruCache<String, f32>>,
    key_chars: usize,
}

impl OracleCache {
    pub fn new(capacity: usize, key_chars: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            key_chars,
        }
    }

    /// Cache key for `sound_key` scored against `sentence`.
    pub fn key_for(&self, sound_key: &str, sentence: &str) -> String {
        format!("{sound_key}:{}", truncate_chars(sentence, self.key_chars))
    }

    pub fn get(&self, key: &str) -> Option<f32> {
        self.entries.lock().ok()?.peek(key).copied()
    }

    pub fn insert(&self, key: String, score: f32) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(key, score);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Default for OracleCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_KEY_CHARS)
    }
}
