//! Lazy decoded-buffer cache with in-flight de-duplication.
//!
//! The first request for an asset starts one fetch + decode; every
//! concurrent request for the same asset awaits that same load.  Successful
//! loads stay cached for the session.  Failures are not cached, so a later
//! message may try again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};

use super::backend::{AudioBackend, AudioError, DecodedSound};
use super::source::AssetSource;

type LoadResult = Result<Arc<DecodedSound>, AudioError>;
type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

pub struct BufferCache {
    source: Arc<dyn AssetSource>,
    backend: Arc<dyn AudioBackend>,
    loaded: Mutex<HashMap<String, Arc<DecodedSound>>>,
    in_flight: Mutex<HashMap<String, SharedLoad>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl BufferCache {
    pub fn new(source: Arc<dyn AssetSource>, backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            source,
            backend,
            loaded: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Decoded sound for `asset`, fetching and decoding it on first use.
    pub async fn get_or_load(&self, asset: &str) -> LoadResult {
        if let Some(sound) = self.cached(asset) {
            return Ok(sound);
        }

        let load = {
            let mut in_flight = lock(&self.in_flight);
            // A load may have finished between the check above and this lock.
            if let Some(sound) = self.cached(asset) {
                return Ok(sound);
            }
            in_flight
                .entry(asset.to_string())
                .or_insert_with(|| {
                    log::debug!("audio: loading {asset}");
                    load(
                        Arc::clone(&self.source),
                        Arc::clone(&self.backend),
                        asset.to_string(),
                    )
                    .boxed()
                    .shared()
                })
                .clone()
        };

        let result = load.clone().await;

        if let Ok(sound) = &result {
            lock(&self.loaded).insert(asset.to_string(), Arc::clone(sound));
        }
        // A newer load may already sit under this key once ours failed.
        let mut in_flight = lock(&self.in_flight);
        if in_flight
            .get(asset)
            .is_some_and(|current| current.ptr_eq(&load))
        {
            in_flight.remove(asset);
        }

        result
    }

    /// Load every asset in `assets` concurrently, returning the failures.
    pub async fn preload<'a, I>(&self, assets: I) -> Vec<(String, AudioError)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let loads = assets.into_iter().map(|asset| async move {
            self.get_or_load(asset)
                .await
                .err()
                .map(|e| (asset.to_string(), e))
        });
        futures::future::join_all(loads)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn cached(&self, asset: &str) -> Option<Arc<DecodedSound>> {
        lock(&self.loaded).get(asset).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.loaded).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

async fn load(
    source: Arc<dyn AssetSource>,
    backend: Arc<dyn AudioBackend>,
    asset: String,
) -> LoadResult {
    let bytes = source.fetch(&asset).await?;

    // Decoding is CPU-bound; keep it off the async workers.
    let decoded = tokio::task::spawn_blocking(move || backend.decode(&bytes))
        .await
        .map_err(|e| AudioError::Decode(format!("decoder task failed: {e}")))??;

    log::debug!(
        "audio: loaded {asset} ({:.2}s, {} ch)",
        decoded.duration().as_secs_f32(),
        decoded.channels
    );
    Ok(Arc::new(decoded))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
