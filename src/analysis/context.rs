//! Context extraction around a trigger match.
//!
//! Both extractors are pure and linear in the text length.  Offsets are byte
//! offsets into `text`, as produced by [`regex::Match::start`].

use once_cell::sync::Lazy;
use regex::Regex;

/// One or more sentence terminators.
static TERMINATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// A whitespace-delimited token.
static TOKENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// Default number of words kept on each side of a match.
pub const DEFAULT_WINDOW: usize = 10;

// ---------------------------------------------------------------------------
// MatchContext
// ---------------------------------------------------------------------------

/// Text surrounding a single trigger match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchContext {
    /// The sentence containing the match, trimmed, without its terminator.
    pub sentence: String,
    /// Up to `window` words on each side of the matched word.
    pub surrounding_words: String,
    /// Match offset divided by text length, in `[0, 1]`.
    pub relative_position: f32,
    pub matched_text: String,
}

impl MatchContext {
    pub fn new(text: &str, offset: usize, matched_text: &str, window: usize) -> Self {
        let relative_position = if text.is_empty() {
            0.0
        } else {
            (offset as f32 / text.len() as f32).clamp(0.0, 1.0)
        };

        Self {
            sentence: extract_sentence(text, offset),
            surrounding_words: surrounding_words(text, offset, window),
            relative_position,
            matched_text: matched_text.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

/// Return the sentence whose span (including its trailing terminators)
/// contains `offset`.
///
/// Returns an empty string when `offset` lies at or beyond the end of the
/// text.
///
/// ```
/// use chat_sfx::analysis::extract_sentence;
///
/// let text = "It was late. She laughed!! Then silence.";
/// assert_eq!(extract_sentence(text, 17), "She laughed");
/// assert_eq!(extract_sentence(text, 400), "");
/// ```
pub fn extract_sentence(text: &str, offset: usize) -> String {
    let mut start = 0;
    for terminator in TERMINATORS.find_iter(text) {
        if offset < terminator.end() {
            return text[start..terminator.start()].trim().to_string();
        }
        start = terminator.end();
    }

    if offset < text.len() {
        text[start..].trim().to_string()
    } else {
        String::new()
    }
}

/// Return up to `window_size` words on each side of the word at `offset`,
/// joined with single spaces.
///
/// The anchor is the first token whose end lies past `offset`; when no token
/// does (offset past the last word) the anchor is the end of the text, so the
/// last `window_size` words are returned.
///
/// ```
/// use chat_sfx::analysis::surrounding_words;
///
/// let text = "one two three four five";
/// assert_eq!(surrounding_words(text, 8, 1), "two three");
/// ```
pub fn surrounding_words(text: &str, offset: usize, window_size: usize) -> String {
    let tokens: Vec<_> = TOKENS.find_iter(text).collect();
    let index = tokens
        .iter()
        .position(|t| t.end() > offset)
        .unwrap_or(tokens.len());

    let from = index.saturating_sub(window_size);
    let to = index.saturating_add(window_size).min(tokens.len());

    tokens[from..to]
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
