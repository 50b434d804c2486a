//! [`Scorer`] — turns one (text, sound, trigger pattern) triple into an
//! [`AnalysisResult`].
//!
//! # Pipeline
//!
//! ```text
//! trigger regex ──no match──▶ NoMatch (0.0)
//!      │
//!      ▼
//! MatchContext ──exclusion hits sentence──▶ ExcludedByPattern (0.0)
//!      │
//!      ▼
//! oracle (cached, timed out) ──ok──▶ AiAnalyzed
//!      │ unavailable / error / timeout / out of range
//!      ▼
//! heuristic ──▶ PatternAnalyzed
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{SoundDefinition, TriggerPattern};
use crate::config::OracleConfig;
use crate::oracle::{OracleCache, PromptBuilder, TextOracle};

use super::context::{MatchContext, DEFAULT_WINDOW};
use super::heuristic::heuristic_score;

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// Why a result has the score it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisReason {
    NoMatch,
    ExcludedByPattern,
    AiAnalyzed,
    PatternAnalyzed,
}

impl AnalysisReason {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisReason::NoMatch => "no_match",
            AnalysisReason::ExcludedByPattern => "excluded_by_pattern",
            AnalysisReason::AiAnalyzed => "ai_analyzed",
            AnalysisReason::PatternAnalyzed => "pattern_analyzed",
        }
    }
}

impl fmt::Display for AnalysisReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of scoring one trigger pattern against a message.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Always within `[0, 1]`; exactly `0.0` for no-match and exclusions.
    pub score: f32,
    pub reason: AnalysisReason,
    pub context: Option<MatchContext>,
    pub matched_text: Option<String>,
}

impl AnalysisResult {
    pub fn no_match() -> Self {
        Self {
            score: 0.0,
            reason: AnalysisReason::NoMatch,
            context: None,
            matched_text: None,
        }
    }

    fn with_context(score: f32, reason: AnalysisReason, context: MatchContext) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            reason,
            matched_text: Some(context.matched_text.clone()),
            context: Some(context),
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(
            self.reason,
            AnalysisReason::NoMatch | AnalysisReason::ExcludedByPattern
        )
    }
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Scores trigger matches, consulting an optional oracle before falling back
/// to lexical heuristics.
///
/// Without an oracle the scorer is a pure function of its inputs.
pub struct Scorer {
    oracle: Option<Arc<dyn TextOracle>>,
    oracle_timeout: Duration,
    cache: OracleCache,
    prompts: PromptBuilder,
    window: AtomicUsize,
}

impl Scorer {
    /// Heuristic-only scorer.
    pub fn new() -> Self {
        Self {
            oracle: None,
            oracle_timeout: OracleConfig::default().timeout(),
            cache: OracleCache::default(),
            prompts: PromptBuilder::new(),
            window: AtomicUsize::new(DEFAULT_WINDOW),
        }
    }

    /// Scorer that consults `oracle` with the timeout and cache sizing from
    /// `config`.
    pub fn with_oracle(oracle: Arc<dyn TextOracle>, config: &OracleConfig) -> Self {
        Self {
            oracle: Some(oracle),
            oracle_timeout: config.timeout(),
            cache: OracleCache::new(config.cache_capacity, config.cache_key_chars),
            ..Self::new()
        }
    }

    /// Words kept on each side of a match when building context.
    pub fn with_window(self, window: usize) -> Self {
        self.set_window(window);
        self
    }

    /// Change the context window for subsequent calls.
    pub fn set_window(&self, window: usize) {
        self.window.store(window, Ordering::Relaxed);
    }

    pub fn window(&self) -> usize {
        self.window.load(Ordering::Relaxed)
    }

    pub fn cache(&self) -> &OracleCache {
        &self.cache
    }

    /// Score `trigger` (one of `sound`'s trigger patterns) against `text`.
    ///
    /// Never fails: oracle problems are absorbed and the heuristic result is
    /// returned instead.
    pub async fn score(
        &self,
        text: &str,
        sound: &SoundDefinition,
        trigger: &TriggerPattern,
    ) -> AnalysisResult {
        let Some(found) = trigger.regex().find(text) else {
            return AnalysisResult::no_match();
        };

        let context = MatchContext::new(text, found.start(), found.as_str(), self.window());

        if sound.is_excluded(&context.sentence) {
            log::debug!(
                "scorer: {} excluded in sentence {:?}",
                sound.key,
                context.sentence
            );
            return AnalysisResult::with_context(0.0, AnalysisReason::ExcludedByPattern, context);
        }

        if let Some(score) = self.consult_oracle(sound, &context).await {
            return AnalysisResult::with_context(score, AnalysisReason::AiAnalyzed, context);
        }

        let score = heuristic_score(trigger.kind, sound.polarity, &context);
        AnalysisResult::with_context(score, AnalysisReason::PatternAnalyzed, context)
    }

    /// Score every trigger pattern of `sound` concurrently and keep the
    /// highest-scoring result (earliest pattern wins ties).
    pub async fn best_match(&self, text: &str, sound: &SoundDefinition) -> AnalysisResult {
        let results = futures::future::join_all(
            sound
                .triggers()
                .iter()
                .map(|trigger| self.score(text, sound, trigger)),
        )
        .await;

        let mut best = AnalysisResult::no_match();
        for result in results {
            let better = result.score > best.score
                || (best.reason == AnalysisReason::NoMatch
                    && result.reason != AnalysisReason::NoMatch);
            if better {
                best = result;
            }
        }
        best
    }

    /// Ask the oracle, if any.  `None` means "unavailable": no oracle,
    /// timeout, error, or an out-of-range reply.
    async fn consult_oracle(&self, sound: &SoundDefinition, context: &MatchContext) -> Option<f32> {
        let oracle = self.oracle.as_ref()?;
        if !oracle.is_available() {
            return None;
        }

        let key = self.cache.key_for(&sound.key, &context.sentence);
        if let Some(score) = self.cache.get(&key) {
            log::debug!("scorer: oracle cache hit for {key:?}");
            return Some(score);
        }

        let prompt = self.prompts.build(sound, context);
        let call = oracle.score(&prompt, self.oracle_timeout);

        match tokio::time::timeout(self.oracle_timeout, call).await {
            Ok(Ok(score)) if (0.0..=1.0).contains(&score) => {
                self.cache.insert(key, score);
                Some(score)
            }
            Ok(Ok(score)) => {
                log::warn!("scorer: oracle returned out-of-range score {score} for {}", sound.key);
                None
            }
            Ok(Err(e)) => {
                log::warn!("scorer: oracle unavailable for {} ({e}); using heuristics", sound.key);
                None
            }
            Err(_) => {
                log::warn!(
                    "scorer: oracle timed out after {:?} for {}; using heuristics",
                    self.oracle_timeout,
                    sound.key
                );
                None
            }
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::catalog::SoundCatalog;
    use crate::oracle::OracleError;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Answers with a fixed score and counts calls.
    struct FixedOracle {
        score: f32,
        calls: AtomicUsize,
    }

    impl FixedOracle {
        fn new(score: f32) -> Arc<Self> {
            Arc::new(Self {
                score,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextOracle for FixedOracle {
        async fn score(&self, _prompt: &str, _timeout: Duration) -> Result<f32, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.score)
        }
    }

    /// Always fails.
    struct FailingOracle;

    #[async_trait]
    impl TextOracle for FailingOracle {
        async fn score(&self, _prompt: &str, _timeout: Duration) -> Result<f32, OracleError> {
            Err(OracleError::Request("connection refused".into()))
        }
    }

    /// Sleeps well past any sensible timeout, then answers.
    struct SlowOracle;

    #[async_trait]
    impl TextOracle for SlowOracle {
        async fn score(&self, _prompt: &str, _timeout: Duration) -> Result<f32, OracleError> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(0.99)
        }
    }

    /// Reports itself unavailable.
    struct OfflineOracle;

    #[async_trait]
    impl TextOracle for OfflineOracle {
        async fn score(&self, _prompt: &str, _timeout: Duration) -> Result<f32, OracleError> {
            Ok(1.0)
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    fn oracle_config(timeout_ms: u64) -> OracleConfig {
        OracleConfig {
            enabled: true,
            timeout_ms,
            ..OracleConfig::default()
        }
    }

    fn catalog() -> SoundCatalog {
        SoundCatalog::builtin().unwrap()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // -----------------------------------------------------------------------
    // Heuristic path
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn no_match_scores_zero() {
        let catalog = catalog();
        let laugh = catalog.get("laugh").unwrap();
        let scorer = Scorer::new();

        for trigger in laugh.triggers() {
            let result = scorer.score("You have a nice laugh.", laugh, trigger).await;
            assert_eq!(result.reason, AnalysisReason::NoMatch);
            assert_eq!(result.score, 0.0);
            assert!(result.context.is_none());
        }
        let best = scorer.best_match("You have a nice laugh.", laugh).await;
        assert_eq!(best.reason, AnalysisReason::NoMatch);
    }

    #[tokio::test]
    async fn exclusion_forces_zero() {
        let catalog = catalog();
        let laugh = catalog.get("laugh").unwrap();
        let result = Scorer::new().best_match("Don't laugh at me.", laugh).await;

        assert_eq!(result.reason, AnalysisReason::ExcludedByPattern);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.matched_text.as_deref(), Some("laugh at"));
        assert!(!result.is_match());
    }

    #[tokio::test]
    async fn laugh_and_footsteps_clear_default_threshold() {
        let catalog = catalog();
        let scorer = Scorer::new();
        let text = "She laughed at the joke and walked to the door.";

        let laugh = scorer.best_match(text, catalog.get("laugh").unwrap()).await;
        assert_eq!(laugh.reason, AnalysisReason::PatternAnalyzed);
        // base + past tense + pronoun + positive sentiment ("joke")
        assert!(approx(laugh.score, 0.95), "got {}", laugh.score);

        let steps = scorer.best_match(text, catalog.get("footsteps").unwrap()).await;
        assert!(approx(steps.score, 0.85), "got {}", steps.score);
        assert_eq!(steps.matched_text.as_deref(), Some("walked"));

        let ctx = laugh.context.unwrap();
        assert_eq!(ctx.sentence, "She laughed at the joke and walked to the door");
    }

    #[tokio::test]
    async fn emphatic_laughter_is_scored_not_vetoed() {
        let catalog = catalog();
        let laugh = catalog.get("laugh").unwrap();
        let result = Scorer::new()
            .best_match("She couldn't stop laughing at the joke.", laugh)
            .await;

        assert_eq!(result.reason, AnalysisReason::PatternAnalyzed);
        // base + participle + positive sentiment ("joke")
        assert!(approx(result.score, 0.7), "got {}", result.score);
    }

    #[tokio::test]
    async fn best_match_prefers_highest_pattern() {
        let catalog = catalog();
        let steps = catalog.get("footsteps").unwrap();
        let result = Scorer::new().best_match("Footsteps. Nobody paced.", steps).await;
        // direct pattern on "Footsteps" gives 0.8, action on "paced" gives 0.7
        assert!(approx(result.score, 0.8), "got {}", result.score);
        assert_eq!(result.matched_text.as_deref(), Some("Footsteps"));
    }

    #[tokio::test]
    async fn scores_are_always_in_unit_range() {
        let catalog = catalog();
        let scorer = Scorer::new();
        let texts = [
            "She laughed, giggling at the funny joke, and he chuckled.",
            "\"Quiet,\" she whispered. He shouted and asked, \"Why?\"",
            "Rain and wind outside in the weather, thunder in the air.",
            "",
        ];
        for text in texts {
            for sound in catalog.iter() {
                for trigger in sound.triggers() {
                    let r = scorer.score(text, sound, trigger).await;
                    assert!((0.0..=1.0).contains(&r.score), "{} -> {}", sound.key, r.score);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Oracle path
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn oracle_score_is_used_and_cached() {
        let catalog = catalog();
        let laugh = catalog.get("laugh").unwrap();
        let oracle = FixedOracle::new(0.3);
        let scorer = Scorer::with_oracle(oracle.clone(), &oracle_config(1_000));
        let trigger = &laugh.triggers()[0];

        let first = scorer.score("She laughed.", laugh, trigger).await;
        let second = scorer.score("She laughed.", laugh, trigger).await;

        assert_eq!(first.reason, AnalysisReason::AiAnalyzed);
        assert!(approx(first.score, 0.3));
        assert_eq!(second, first);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
        assert_eq!(scorer.cache().len(), 1);
    }

    #[tokio::test]
    async fn exclusion_precedes_oracle() {
        let catalog = catalog();
        let laugh = catalog.get("laugh").unwrap();
        let oracle = FixedOracle::new(0.9);
        let scorer = Scorer::with_oracle(oracle.clone(), &oracle_config(1_000));

        let result = scorer.best_match("Don't laugh at me.", laugh).await;
        assert_eq!(result.reason, AnalysisReason::ExcludedByPattern);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oracle_error_falls_back_to_heuristics() {
        let catalog = catalog();
        let laugh = catalog.get("laugh").unwrap();
        let scorer = Scorer::with_oracle(Arc::new(FailingOracle), &oracle_config(1_000));

        let result = scorer.score("She laughed.", laugh, &laugh.triggers()[0]).await;
        assert_eq!(result.reason, AnalysisReason::PatternAnalyzed);
        assert!(approx(result.score, 0.85), "got {}", result.score);
        assert!(scorer.cache().is_empty());
    }

    #[tokio::test]
    async fn oracle_timeout_falls_back_and_is_not_cached() {
        let catalog = catalog();
        let laugh = catalog.get("laugh").unwrap();
        let scorer = Scorer::with_oracle(Arc::new(SlowOracle), &oracle_config(20));

        let result = scorer.score("She laughed.", laugh, &laugh.triggers()[0]).await;
        assert_eq!(result.reason, AnalysisReason::PatternAnalyzed);
        assert!(scorer.cache().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_oracle_reply_falls_back() {
        let catalog = catalog();
        let laugh = catalog.get("laugh").unwrap();
        let scorer = Scorer::with_oracle(FixedOracle::new(1.5), &oracle_config(1_000));

        let result = scorer.score("She laughed.", laugh, &laugh.triggers()[0]).await;
        assert_eq!(result.reason, AnalysisReason::PatternAnalyzed);
        assert!(scorer.cache().is_empty());

        let nan = Scorer::with_oracle(FixedOracle::new(f32::NAN), &oracle_config(1_000));
        let result = nan.score("She laughed.", laugh, &laugh.triggers()[0]).await;
        assert_eq!(result.reason, AnalysisReason::PatternAnalyzed);
    }

    #[tokio::test]
    async fn unavailable_oracle_is_skipped() {
        let catalog = catalog();
        let laugh = catalog.get("laugh").unwrap();
        let scorer = Scorer::with_oracle(Arc::new(OfflineOracle), &oracle_config(1_000));

        let result = scorer.score("She laughed.", laugh, &laugh.triggers()[0]).await;
        assert_eq!(result.reason, AnalysisReason::PatternAnalyzed);
    }

    #[test]
    fn reason_labels() {
        assert_eq!(AnalysisReason::NoMatch.to_string(), "no_match");
        assert_eq!(AnalysisReason::ExcludedByPattern.to_string(), "excluded_by_pattern");
        assert_eq!(AnalysisReason::AiAnalyzed.to_string(), "ai_analyzed");
        assert_eq!(AnalysisReason::PatternAnalyzed.to_string(), "pattern_analyzed");
    }
}
