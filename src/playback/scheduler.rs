//! Playback scheduler — turns scores into rate-limited audio events.
//!
//! # Message flow
//!
//! ```text
//! handle_message(text)
//!   ├─ disabled / not initialised ─▶ no-op
//!   ├─ for each sound in an enabled category (concurrently):
//!   │     Scorer::best_match over its trigger patterns
//!   ├─ keep score >= sensitivity
//!   ├─ sort by descending score (ties keep catalog order)
//!   ├─ drop sounds in cooldown or with an unresolved dispatch
//!   ├─ keep the first max_concurrent
//!   └─ dispatch all (concurrently):
//!         pick variation → BufferCache::get_or_load → mark cooldown → play
//! ```
//!
//! Per sound key: `Idle → Candidate → Suppressed | Dispatched`, and a
//! dispatch resolves to `Played`, `LoadFailed` or `PlaybackFailed`.  Every
//! failure is local to its sound; no error ever leaves `handle_message`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use thiserror::Error;

use crate::analysis::{AnalysisResult, Scorer};
use crate::audio::{AssetSource, AudioBackend, AudioError, BufferCache, PlaybackHandle};
use crate::catalog::{Category, SoundCatalog, SoundDefinition};
use crate::config::{CategoryToggles, SoundSettings};

use super::state::EngineState;

// ---------------------------------------------------------------------------
// SchedulerError
// ---------------------------------------------------------------------------

/// Errors from explicit, caller-driven operations such as [`PlaybackScheduler::preview`].
#[derive(Debug, Error, PartialEq)]
pub enum SchedulerError {
    #[error("unknown sound {0:?}")]
    UnknownSound(String),

    #[error("sound engine is not initialised")]
    NotInitialized,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A sound whose best trigger pattern matched the message.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub sound_key: String,
    pub category: Category,
    pub result: AnalysisResult,
}

/// How a dispatched play resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackStatus {
    Played(PlaybackHandle),
    LoadFailed(AudioError),
    PlaybackFailed(AudioError),
}

/// One dispatched sound.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub sound_key: String,
    pub variation: usize,
    pub asset: String,
    pub status: PlaybackStatus,
}

impl DispatchOutcome {
    pub fn is_played(&self) -> bool {
        matches!(self.status, PlaybackStatus::Played(_))
    }
}

// ---------------------------------------------------------------------------
// PlaybackScheduler
// ---------------------------------------------------------------------------

/// Drives the decision engine for incoming chat messages.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use chat_sfx::analysis::Scorer;
/// use chat_sfx::audio::{FsAssetSource, NullBackend};
/// use chat_sfx::catalog::SoundCatalog;
/// use chat_sfx::config::SoundSettings;
/// use chat_sfx::playback::PlaybackScheduler;
///
/// # async fn example() {
/// let scheduler = PlaybackScheduler::new(
///     Arc::new(SoundCatalog::builtin().unwrap()),
///     Scorer::new(),
///     Arc::new(FsAssetSource::new("sounds")),
///     Arc::new(NullBackend::new()),
///     SoundSettings::default(),
/// );
/// scheduler.initialize().await;
/// let played = scheduler.handle_message("She laughed at the joke.").await;
/// # }
/// ```
pub struct PlaybackScheduler {
    catalog: Arc<SoundCatalog>,
    scorer: Scorer,
    backend: Arc<dyn AudioBackend>,
    state: EngineState,
    settings: RwLock<SoundSettings>,
    initialized: AtomicBool,
}

impl PlaybackScheduler {
    pub fn new(
        catalog: Arc<SoundCatalog>,
        scorer: Scorer,
        source: Arc<dyn AssetSource>,
        backend: Arc<dyn AudioBackend>,
        settings: SoundSettings,
    ) -> Self {
        let buffers = BufferCache::new(source, Arc::clone(&backend));
        scorer.set_window(settings.context_window);
        Self {
            catalog,
            scorer,
            backend,
            state: EngineState::new(buffers),
            settings: RwLock::new(settings),
            initialized: AtomicBool::new(false),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle / settings
    // -----------------------------------------------------------------------

    /// Mark the engine ready, warming the buffer cache first when
    /// `preload` is set.  Preload failures are logged and otherwise ignored.
    pub async fn initialize(&self) {
        let settings = self.settings();
        if settings.preload {
            let assets: Vec<&str> = self
                .enabled_sounds(settings.categories)
                .filter_map(|s| s.variations().first().map(String::as_str))
                .collect();
            let count = assets.len();
            let failures = self.state.buffers().preload(assets).await;
            for (asset, e) in &failures {
                log::warn!("scheduler: preload of {asset} failed: {e}");
            }
            log::info!(
                "scheduler: preloaded {}/{count} sounds",
                count - failures.len()
            );
        }

        self.initialized.store(true, Ordering::SeqCst);
        log::info!("scheduler: ready with {} sounds", self.catalog.len());
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> SoundSettings {
        self.settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the settings used for subsequent messages.
    pub fn apply_settings(&self, settings: SoundSettings) {
        self.scorer.set_window(settings.context_window);
        *self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = settings;
    }

    pub fn catalog(&self) -> &SoundCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    // -----------------------------------------------------------------------
    // Analysis
    // -----------------------------------------------------------------------

    /// Best result per enabled sound whose trigger matched, in catalog order.
    /// Excluded sounds are reported with their zero score.  No side effects.
    pub async fn analyze(&self, text: &str) -> Vec<Candidate> {
        let settings = self.settings();
        self.score_all(text, &settings)
            .await
            .into_iter()
            .map(|(sound, result)| Candidate {
                sound_key: sound.key.clone(),
                category: sound.category,
                result,
            })
            .collect()
    }

    fn enabled_sounds(
        &self,
        categories: CategoryToggles,
    ) -> impl Iterator<Item = &SoundDefinition> + '_ {
        self.catalog
            .iter()
            .filter(move |s| categories.is_enabled(s.category))
    }

    async fn score_all(
        &self,
        text: &str,
        settings: &SoundSettings,
    ) -> Vec<(&SoundDefinition, AnalysisResult)> {
        let sounds: Vec<&SoundDefinition> = self.enabled_sounds(settings.categories).collect();
        let results =
            futures::future::join_all(sounds.iter().map(|s| self.scorer.best_match(text, s))).await;

        sounds
            .into_iter()
            .zip(results)
            .filter(|(_, r)| r.reason != crate::analysis::AnalysisReason::NoMatch)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Message handling
    // -----------------------------------------------------------------------

    /// Analyse `text` and play whatever it triggers.  Returns one outcome per
    /// dispatched sound.
    pub async fn handle_message(&self, text: &str) -> Vec<DispatchOutcome> {
        self.handle_message_at(text, Instant::now()).await
    }

    /// [`handle_message`](Self::handle_message) with an explicit clock
    /// reading for the cooldown decision and the recorded play time.
    pub async fn handle_message_at(&self, text: &str, now: Instant) -> Vec<DispatchOutcome> {
        let settings = self.settings();
        if !settings.enabled {
            return Vec::new();
        }
        if !self.is_initialized() {
            log::debug!("scheduler: message ignored, engine not initialised");
            return Vec::new();
        }

        let threshold = settings.effective_sensitivity();
        let mut candidates: Vec<_> = self
            .score_all(text, &settings)
            .await
            .into_iter()
            .filter(|(sound, r)| {
                let pass = r.is_match() && r.score >= threshold;
                if !pass {
                    log::debug!(
                        "scheduler: {} not eligible ({:.2}, threshold {threshold:.2}, {})",
                        sound.key,
                        r.score,
                        r.reason
                    );
                }
                pass
            })
            .collect();

        // Stable: equal scores keep catalog order.
        candidates.sort_by(|(_, a), (_, b)| b.score.total_cmp(&a.score));

        let cooldown = settings.cooldown();
        let mut selected = Vec::new();
        for (sound, result) in candidates {
            if selected.len() >= settings.max_concurrent {
                log::debug!("scheduler: {} dropped, concurrency cap reached", sound.key);
                continue;
            }
            if let Some(remaining) = self.state.cooldown_remaining(&sound.key, now, cooldown) {
                log::debug!(
                    "scheduler: {} suppressed, cooling down for {remaining:?}",
                    sound.key
                );
                continue;
            }
            if !self.state.try_begin_dispatch(&sound.key) {
                log::debug!("scheduler: {} suppressed, previous dispatch unresolved", sound.key);
                continue;
            }
            log::info!(
                "scheduler: dispatching {} (score {:.2}, {}, {:?})",
                sound.key,
                result.score,
                result.reason,
                result.matched_text.as_deref().unwrap_or("")
            );
            selected.push(sound);
        }

        let volume = settings.effective_volume();
        let dispatches = selected.into_iter().map(|sound| async move {
            let outcome = self.play_sound(sound, volume, Some(now)).await;
            self.state.end_dispatch(&sound.key);
            outcome
        });
        futures::future::join_all(dispatches).await
    }

    /// Play a variation of `sound_key` right away, bypassing scoring and
    /// cooldown.  The cooldown timer is left untouched.
    pub async fn preview(&self, sound_key: &str) -> Result<DispatchOutcome, SchedulerError> {
        if !self.is_initialized() {
            return Err(SchedulerError::NotInitialized);
        }
        let sound = self
            .catalog
            .get(sound_key)
            .ok_or_else(|| SchedulerError::UnknownSound(sound_key.to_string()))?;
        let volume = self.settings().effective_volume();
        Ok(self.play_sound(sound, volume, None).await)
    }

    /// Pick a variation, load it and start playback.  When `played_at` is
    /// set the cooldown is recorded once the buffer is ready, so a failed
    /// load never starts a cooldown.
    async fn play_sound(
        &self,
        sound: &SoundDefinition,
        volume: f32,
        played_at: Option<Instant>,
    ) -> DispatchOutcome {
        let variation = self
            .state
            .pick_variation(&sound.key, sound.variations().len());
        let asset = sound.variations()[variation].clone();

        let status = match self.state.buffers().get_or_load(&asset).await {
            Err(e) => {
                log::warn!("scheduler: could not load {asset} for {}: {e}", sound.key);
                PlaybackStatus::LoadFailed(e)
            }
            Ok(buffer) => {
                if let Some(at) = played_at {
                    self.state.mark_played(&sound.key, at);
                }
                // Backends may wait on their mixer thread.
                let backend = Arc::clone(&self.backend);
                let played = tokio::task::spawn_blocking(move || backend.play(&buffer, volume))
                    .await
                    .unwrap_or_else(|e| {
                        Err(AudioError::Playback(format!("playback task failed: {e}")))
                    });
                match played {
                    Ok(handle) => PlaybackStatus::Played(handle),
                    Err(e) => {
                        log::warn!("scheduler: playback of {asset} failed: {e}");
                        PlaybackStatus::PlaybackFailed(e)
                    }
                }
            }
        };

        DispatchOutcome {
            sound_key: sound.key.clone(),
            variation,
            asset,
            status,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::audio::DecodedSound;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Serves a tiny payload for every asset except those listed as missing.
    struct MemorySource {
        missing_prefix: Option<&'static str>,
        delay: Duration,
        fetches: AtomicUsize,
    }

    impl MemorySource {
        fn new() -> Arc<Self> {
            Self::missing(None)
        }

        fn missing(prefix: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                missing_prefix: prefix,
                delay: Duration::ZERO,
                fetches: AtomicUsize::new(0),
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                missing_prefix: None,
                delay,
                fetches: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AssetSource for MemorySource {
        async fn fetch(&self, asset: &str) -> Result<Vec<u8>, AudioError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.missing_prefix {
                Some(prefix) if asset.starts_with(prefix) => Err(AudioError::Fetch {
                    asset: asset.to_string(),
                    reason: "404".into(),
                }),
                _ => Ok(asset.as_bytes().to_vec()),
            }
        }
    }

    /// Records every play request; optionally rejects them all.
    #[derive(Default)]
    struct RecordingBackend {
        reject_play: bool,
        plays: Mutex<Vec<f32>>,
    }

    impl AudioBackend for RecordingBackend {
        fn decode(&self, bytes: &[u8]) -> Result<DecodedSound, AudioError> {
            Ok(DecodedSound::new(1, 8_000, vec![0.0; bytes.len()]))
        }

        fn play(&self, _sound: &DecodedSound, volume: f32) -> Result<PlaybackHandle, AudioError> {
            if self.reject_play {
                return Err(AudioError::Playback("autoplay blocked".into()));
            }
            let mut plays = self.plays.lock().unwrap();
            plays.push(volume);
            Ok(PlaybackHandle(plays.len() as u64))
        }
    }

    /// Holds every play until `open` is set, giving up after a second.
    struct GatedBackend {
        open: AtomicBool,
    }

    impl AudioBackend for GatedBackend {
        fn decode(&self, bytes: &[u8]) -> Result<DecodedSound, AudioError> {
            Ok(DecodedSound::new(1, 8_000, vec![0.0; bytes.len()]))
        }

        fn play(&self, _sound: &DecodedSound, _volume: f32) -> Result<PlaybackHandle, AudioError> {
            let deadline = Instant::now() + Duration::from_secs(1);
            while !self.open.load(Ordering::SeqCst) {
                if Instant::now() >= deadline {
                    return Err(AudioError::Playback("gate never opened".into()));
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok(PlaybackHandle(1))
        }
    }

    fn scheduler_with(
        source: Arc<MemorySource>,
        backend: Arc<RecordingBackend>,
        settings: SoundSettings,
    ) -> PlaybackScheduler {
        PlaybackScheduler::new(
            Arc::new(SoundCatalog::builtin().unwrap()),
            Scorer::new(),
            source,
            backend,
            settings,
        )
    }

    async fn ready(settings: SoundSettings) -> (PlaybackScheduler, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend::default());
        let scheduler = scheduler_with(MemorySource::new(), backend.clone(), settings);
        scheduler.initialize().await;
        (scheduler, backend)
    }

    fn keys(outcomes: &[DispatchOutcome]) -> HashSet<&str> {
        outcomes.iter().map(|o| o.sound_key.as_str()).collect()
    }

    const SCENE: &str = "She laughed at the joke and walked to the door.";

    // -----------------------------------------------------------------------
    // Scenarios
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn laugh_and_footsteps_dispatch_with_defaults() {
        let (scheduler, backend) = ready(SoundSettings::default()).await;
        let now = Instant::now();

        let outcomes = scheduler.handle_message_at(SCENE, now).await;

        assert_eq!(keys(&outcomes), HashSet::from(["laugh", "footsteps"]));
        assert!(outcomes.iter().all(DispatchOutcome::is_played));
        // Highest score dispatched first.
        assert_eq!(outcomes[0].sound_key, "laugh");
        assert_eq!(scheduler.state().last_played("laugh"), Some(now));
        assert_eq!(backend.plays.lock().unwrap().len(), 2);
        assert!(!scheduler.state().is_dispatching("laugh"));
    }

    #[tokio::test]
    async fn negated_laugh_is_not_dispatched() {
        let (scheduler, backend) = ready(SoundSettings::default()).await;

        let outcomes = scheduler.handle_message("Don't laugh at me.").await;

        assert!(outcomes.is_empty());
        assert!(backend.plays.lock().unwrap().is_empty());
        assert_eq!(scheduler.state().last_played("laugh"), None);
    }

    #[tokio::test]
    async fn noun_use_of_laugh_is_ignored() {
        let (scheduler, _backend) = ready(SoundSettings::default()).await;
        let candidates = scheduler.analyze("You have a nice laugh.").await;
        assert!(candidates.iter().all(|c| c.sound_key != "laugh"));
        assert!(scheduler.handle_message("You have a nice laugh.").await.is_empty());
    }

    #[tokio::test]
    async fn analyze_reports_exclusions_without_side_effects() {
        let (scheduler, backend) = ready(SoundSettings::default()).await;

        let candidates = scheduler.analyze("Don't laugh at me.").await;
        let laugh = candidates.iter().find(|c| c.sound_key == "laugh").unwrap();
        assert_eq!(laugh.result.score, 0.0);
        assert_eq!(laugh.category, Category::Emotions);

        let candidates = scheduler.analyze(SCENE).await;
        assert!(candidates.iter().any(|c| c.sound_key == "footsteps"));
        assert!(backend.plays.lock().unwrap().is_empty());
        assert_eq!(scheduler.state().last_played("footsteps"), None);
    }

    // -----------------------------------------------------------------------
    // Gating
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn disabled_engine_is_a_no_op() {
        let settings = SoundSettings {
            enabled: false,
            ..SoundSettings::default()
        };
        let (scheduler, backend) = ready(settings).await;
        assert!(scheduler.handle_message(SCENE).await.is_empty());
        assert!(backend.plays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn uninitialised_engine_is_a_no_op() {
        let backend = Arc::new(RecordingBackend::default());
        let scheduler = scheduler_with(MemorySource::new(), backend.clone(), SoundSettings::default());

        assert!(scheduler.handle_message(SCENE).await.is_empty());
        assert_eq!(
            scheduler.preview("laugh").await.unwrap_err(),
            SchedulerError::NotInitialized
        );
    }

    #[tokio::test]
    async fn disabled_category_is_skipped() {
        let mut settings = SoundSettings::default();
        settings.categories.set(Category::Emotions, false);
        let (scheduler, _backend) = ready(settings).await;

        let outcomes = scheduler.handle_message(SCENE).await;
        assert_eq!(keys(&outcomes), HashSet::from(["footsteps"]));
    }

    #[tokio::test]
    async fn sensitivity_threshold_filters_candidates() {
        let text = "The rain fell outside all night.";

        let (strict, _) = ready(SoundSettings::default()).await;
        assert!(strict.handle_message(text).await.is_empty());

        let lenient = SoundSettings {
            sensitivity: 0.65,
            ..SoundSettings::default()
        };
        let (lenient, _) = ready(lenient).await;
        assert_eq!(keys(&lenient.handle_message(text).await), HashSet::from(["rain"]));
    }

    #[tokio::test]
    async fn settings_changes_apply_to_next_message() {
        let (scheduler, _backend) = ready(SoundSettings::default()).await;
        scheduler.apply_settings(SoundSettings {
            enabled: false,
            ..SoundSettings::default()
        });
        assert!(!scheduler.settings().enabled);
        assert!(scheduler.handle_message(SCENE).await.is_empty());
    }

    // -----------------------------------------------------------------------
    // Cooldown / cap / variations
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn cooldown_blocks_until_window_elapses() {
        let settings = SoundSettings {
            cooldown_ms: 2_000,
            ..SoundSettings::default()
        };
        let (scheduler, _backend) = ready(settings).await;
        let text = "She laughed at the joke.";
        let t0 = Instant::now();
        let window = Duration::from_millis(2_000);

        assert_eq!(keys(&scheduler.handle_message_at(text, t0).await), HashSet::from(["laugh"]));

        let early = t0 + window - Duration::from_millis(1);
        assert!(scheduler.handle_message_at(text, early).await.is_empty());
        // A suppressed attempt does not restart the window.
        assert_eq!(scheduler.state().last_played("laugh"), Some(t0));

        let on_time = t0 + window;
        assert_eq!(
            keys(&scheduler.handle_message_at(text, on_time).await),
            HashSet::from(["laugh"])
        );
        assert_eq!(scheduler.state().last_played("laugh"), Some(on_time));
    }

    #[tokio::test]
    async fn cooldown_is_per_sound() {
        let (scheduler, _backend) = ready(SoundSettings::default()).await;
        let t0 = Instant::now();

        scheduler.handle_message_at("She laughed at the joke.", t0).await;
        let outcomes = scheduler
            .handle_message_at(SCENE, t0 + Duration::from_millis(10))
            .await;
        assert_eq!(keys(&outcomes), HashSet::from(["footsteps"]));
    }

    #[tokio::test]
    async fn cap_keeps_highest_scores() {
        let settings = SoundSettings {
            max_concurrent: 1,
            ..SoundSettings::default()
        };
        let (scheduler, _backend) = ready(settings).await;
        let outcomes = scheduler.handle_message(SCENE).await;
        assert_eq!(keys(&outcomes), HashSet::from(["laugh"]));
    }

    #[tokio::test]
    async fn cap_orders_by_score_not_catalog_position() {
        // "rain" precedes "whisper" in the catalog but scores lower here.
        let settings = SoundSettings {
            sensitivity: 0.5,
            max_concurrent: 1,
            ..SoundSettings::default()
        };
        let (scheduler, _backend) = ready(settings).await;
        let outcomes = scheduler
            .handle_message("It rained. She whispered, \"Hi\"")
            .await;
        assert_eq!(keys(&outcomes), HashSet::from(["whisper"]));
    }

    #[tokio::test]
    async fn zero_cap_dispatches_nothing() {
        let settings = SoundSettings {
            max_concurrent: 0,
            ..SoundSettings::default()
        };
        let (scheduler, _backend) = ready(settings).await;
        assert!(scheduler.handle_message(SCENE).await.is_empty());
    }

    #[tokio::test]
    async fn consecutive_dispatches_use_different_variations() {
        let settings = SoundSettings {
            cooldown_ms: 0,
            ..SoundSettings::default()
        };
        let (scheduler, _backend) = ready(settings).await;

        let mut previous: Option<usize> = None;
        for _ in 0..30 {
            let outcomes = scheduler.handle_message("She laughed at the joke.").await;
            assert_eq!(outcomes.len(), 1);
            let variation = outcomes[0].variation;
            assert_ne!(Some(variation), previous);
            assert_eq!(
                outcomes[0].asset,
                scheduler.catalog().get("laugh").unwrap().variations()[variation]
            );
            previous = Some(variation);
        }
    }

    #[tokio::test]
    async fn volume_comes_from_settings() {
        let settings = SoundSettings {
            volume: 0.4,
            ..SoundSettings::default()
        };
        let (scheduler, backend) = ready(settings).await;
        scheduler.handle_message("She laughed at the joke.").await;
        assert_eq!(*backend.plays.lock().unwrap(), vec![0.4]);
    }

    #[tokio::test]
    async fn overlapping_messages_dispatch_a_sound_once() {
        // No cooldown: only the unresolved first dispatch can hold back the second.
        let settings = SoundSettings {
            cooldown_ms: 0,
            ..SoundSettings::default()
        };
        let backend = Arc::new(RecordingBackend::default());
        let scheduler = scheduler_with(
            MemorySource::slow(Duration::from_millis(30)),
            backend.clone(),
            settings,
        );
        scheduler.initialize().await;
        let text = "She laughed at the joke.";
        let now = Instant::now();

        let (first, second) = tokio::join!(
            scheduler.handle_message_at(text, now),
            scheduler.handle_message_at(text, now),
        );

        // Exactly one of the two dispatched; which one depends on poll order.
        let mut dispatched: Vec<_> = first.iter().chain(second.iter()).collect();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched.pop().unwrap().sound_key, "laugh");
        assert_eq!(backend.plays.lock().unwrap().len(), 1);
        assert!(!scheduler.state().is_dispatching("laugh"));

        // Once resolved the key is free again.
        let third = scheduler.handle_message_at(text, now).await;
        assert_eq!(keys(&third), HashSet::from(["laugh"]));
    }

    #[tokio::test]
    async fn context_window_follows_applied_settings() {
        let (scheduler, _backend) = ready(SoundSettings::default()).await;
        let text = "The rain fell slowly outside tonight.";
        let rain_score = |candidates: Vec<Candidate>| {
            candidates
                .into_iter()
                .find(|c| c.sound_key == "rain")
                .map(|c| c.result.score)
                .unwrap()
        };

        // "outside" is three words away from "rain".
        assert!((rain_score(scheduler.analyze(text).await) - 0.7).abs() < 1e-5);

        scheduler.apply_settings(SoundSettings {
            context_window: 1,
            ..SoundSettings::default()
        });
        assert!((rain_score(scheduler.analyze(text).await) - 0.5).abs() < 1e-5);
    }

    // -----------------------------------------------------------------------
    // Failures
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn load_failure_is_local_and_starts_no_cooldown() {
        let backend = Arc::new(RecordingBackend::default());
        let scheduler = scheduler_with(
            MemorySource::missing(Some("emotions/")),
            backend.clone(),
            SoundSettings::default(),
        );
        scheduler.initialize().await;
        let now = Instant::now();

        let outcomes = scheduler.handle_message_at(SCENE, now).await;

        let laugh = outcomes.iter().find(|o| o.sound_key == "laugh").unwrap();
        assert!(matches!(laugh.status, PlaybackStatus::LoadFailed(AudioError::Fetch { .. })));
        let steps = outcomes.iter().find(|o| o.sound_key == "footsteps").unwrap();
        assert!(steps.is_played());

        assert_eq!(scheduler.state().last_played("laugh"), None);
        assert_eq!(scheduler.state().last_played("footsteps"), Some(now));
        assert!(!scheduler.state().is_dispatching("laugh"));

        // The failed sound stays eligible for the next message.
        let again = scheduler
            .handle_message_at("She laughed at the joke.", now + Duration::from_millis(5))
            .await;
        assert_eq!(keys(&again), HashSet::from(["laugh"]));
    }

    #[tokio::test]
    async fn playback_failure_is_reported_and_counts_as_attempt() {
        let backend = Arc::new(RecordingBackend {
            reject_play: true,
            ..RecordingBackend::default()
        });
        let scheduler = scheduler_with(MemorySource::new(), backend, SoundSettings::default());
        scheduler.initialize().await;
        let now = Instant::now();

        let outcomes = scheduler.handle_message_at(SCENE, now).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o.status, PlaybackStatus::PlaybackFailed(_))));
        assert_eq!(scheduler.state().last_played("laugh"), Some(now));
    }

    #[tokio::test]
    async fn buffers_are_loaded_once_per_asset() {
        let source = MemorySource::new();
        let backend = Arc::new(RecordingBackend::default());
        let scheduler = scheduler_with(
            source.clone(),
            backend,
            SoundSettings {
                cooldown_ms: 0,
                sensitivity: 0.5,
                ..SoundSettings::default()
            },
        );
        scheduler.initialize().await;

        for _ in 0..10 {
            scheduler.handle_message("Footsteps echoed.").await;
        }
        let variations = scheduler.catalog().get("footsteps").unwrap().variations().len();
        assert!(source.fetches.load(Ordering::SeqCst) <= variations);
        assert!(scheduler.state().buffers().len() <= variations);
    }

    #[tokio::test]
    async fn slow_backend_does_not_stall_the_runtime() {
        let backend = Arc::new(GatedBackend {
            open: AtomicBool::new(false),
        });
        let scheduler = PlaybackScheduler::new(
            Arc::new(SoundCatalog::builtin().unwrap()),
            Scorer::new(),
            MemorySource::new(),
            backend.clone(),
            SoundSettings::default(),
        );
        scheduler.initialize().await;

        // The gate can only open if the runtime keeps running during play.
        let (outcomes, ()) = tokio::join!(
            scheduler.handle_message("She laughed at the joke."),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                backend.open.store(true, Ordering::SeqCst);
            },
        );

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_played(), "{:?}", outcomes[0].status);
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn preload_warms_one_variation_per_enabled_sound() {
        let mut settings = SoundSettings {
            preload: true,
            ..SoundSettings::default()
        };
        settings.categories.set(Category::Dialogue, false);
        let (scheduler, _backend) = ready(settings).await;

        let enabled = scheduler
            .catalog()
            .iter()
            .filter(|s| s.category != Category::Dialogue)
            .count();
        assert_eq!(scheduler.state().buffers().len(), enabled);
        assert!(scheduler.is_initialized());
    }

    #[tokio::test]
    async fn preview_plays_without_cooldown() {
        let (scheduler, backend) = ready(SoundSettings::default()).await;

        let outcome = scheduler.preview("thunder").await.unwrap();
        assert!(outcome.is_played());
        assert_eq!(scheduler.state().last_played("thunder"), None);
        assert_eq!(backend.plays.lock().unwrap().len(), 1);

        assert_eq!(
            scheduler.preview("kazoo").await.unwrap_err(),
            SchedulerError::UnknownSound("kazoo".into())
        );
    }
}
