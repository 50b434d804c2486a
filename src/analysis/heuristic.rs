//! Lexical heuristic scoring.
//!
//! Starts from [`BASE_SCORE`] and adds bonuses that depend on the kind of
//! trigger pattern that matched.  Word shapes are approximations: a token
//! ending in `-ed` is treated as a past-tense verb, one ending in `-ing` as a
//! present participle.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::catalog::{PatternKind, Polarity};

use super::context::MatchContext;

pub const BASE_SCORE: f32 = 0.5;

pub const PAST_TENSE_BONUS: f32 = 0.2;
pub const PARTICIPLE_BONUS: f32 = 0.1;
pub const PRONOUN_VERB_BONUS: f32 = 0.15;
pub const QUOTE_BONUS: f32 = 0.2;
pub const SPEECH_VERB_BONUS: f32 = 0.15;
pub const ENVIRONMENT_BONUS: f32 = 0.2;
pub const DIRECT_BONUS: f32 = 0.3;
pub const SENTIMENT_BONUS: f32 = 0.1;

fn word_regex(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap()
}

static PAST_TENSE: Lazy<Regex> = Lazy::new(|| word_regex(r"\b[a-z]{2,}ed\b"));
static PARTICIPLE: Lazy<Regex> = Lazy::new(|| word_regex(r"\b[a-z]{2,}ing\b"));
static PRONOUN_VERB: Lazy<Regex> =
    Lazy::new(|| word_regex(r"\b(?:i|we|he|she|they)\s+[a-z]{2,}ed\b"));
static SPEECH_VERB: Lazy<Regex> =
    Lazy::new(|| word_regex(r"\b(?:said|whispered|shouted|asked|replied)\b"));
static ENVIRONMENT: Lazy<Regex> =
    Lazy::new(|| word_regex(r"\b(?:outside|air|atmosphere|environment|weather)\b"));
static POSITIVE_WORDS: Lazy<Regex> = Lazy::new(|| {
    word_regex(r"\b(?:happy|joy|joyful|funny|joke|jokes|smile|smiled|delighted|amused|glad|cheerful)\b")
});
static NEGATIVE_WORDS: Lazy<Regex> = Lazy::new(|| {
    word_regex(r"\b(?:sad|tears|grief|sorrow|upset|hurt|lonely|miserable|heartbroken|gloomy)\b")
});

const QUOTE_MARKS: &[char] = &['"', '“', '”', '«', '»'];

/// Score a match from its surrounding text alone.
///
/// The result is clamped to `[0, 1]`.
pub fn heuristic_score(kind: PatternKind, polarity: Polarity, context: &MatchContext) -> f32 {
    let sentence = context.sentence.as_str();
    let mut score = BASE_SCORE;

    match kind {
        PatternKind::Action => {
            if PAST_TENSE.is_match(sentence) {
                score += PAST_TENSE_BONUS;
            }
            if PARTICIPLE.is_match(sentence) {
                score += PARTICIPLE_BONUS;
            }
            if PRONOUN_VERB.is_match(sentence) {
                score += PRONOUN_VERB_BONUS;
            }
        }
        PatternKind::Dialogue => {
            if sentence.contains(QUOTE_MARKS) {
                score += QUOTE_BONUS;
            }
            if SPEECH_VERB.is_match(sentence) {
                score += SPEECH_VERB_BONUS;
            }
        }
        PatternKind::Ambient => {
            if ENVIRONMENT.is_match(&context.surrounding_words) {
                score += ENVIRONMENT_BONUS;
            }
        }
        PatternKind::Direct => score += DIRECT_BONUS,
    }

    if sentiment_aligned(polarity, sentence) {
        score += SENTIMENT_BONUS;
    }

    score.clamp(0.0, 1.0)
}

fn sentiment_aligned(polarity: Polarity, sentence: &str) -> bool {
    match polarity {
        Polarity::Positive => POSITIVE_WORDS.is_match(sentence),
        Polarity::Negative => NEGATIVE_WORDS.is_match(sentence),
        Polarity::Neutral => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
