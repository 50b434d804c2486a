//! Prompt builder for oracle scoring requests.
//!
//! Prompts are bounded: the sentence and the surrounding window are
//! truncated on character boundaries so a long chat message never produces
//! an unbounded request.

use crate::analysis::MatchContext;
use crate::catalog::SoundDefinition;

/// System message sent with every scoring request.
pub const SYSTEM_INSTRUCTION: &str = "\
You rate whether a sound effect fits a moment in a story or chat message.
Reply with ONLY a number between 0 and 1.
1 means the text clearly describes the sound happening right now.
0 means the word is used figuratively, negated, or only mentioned.";

const FEW_SHOT_EXAMPLES: &str = "
Examples:
Sound: laugh. Sentence: \"She laughed at the joke\" -> 0.9
Sound: laugh. Sentence: \"You have a nice laugh\" -> 0.1
Sound: door. Sentence: \"That opened the door to new ideas\" -> 0.05
";

pub const MAX_SENTENCE_CHARS: usize = 300;
pub const MAX_WINDOW_CHARS: usize = 200;

/// Builds bounded scoring prompts.
///
/// # Example
/// ```rust
/// use chat_sfx::analysis::MatchContext;
/// use chat_sfx::catalog::SoundCatalog;
/// use chat_sfx::oracle::PromptBuilder;
///
/// let catalog = SoundCatalog::builtin().unwrap();
/// let ctx = MatchContext::new("She laughed.", 4, "laughed", 10);
/// let prompt = PromptBuilder::new().build(catalog.get("laugh").unwrap(), &ctx);
/// assert!(prompt.contains("She laughed"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_sentence_chars: usize,
    max_window_chars: usize,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            max_sentence_chars: MAX_SENTENCE_CHARS,
            max_window_chars: MAX_WINDOW_CHARS,
        }
    }

    /// Build the user prompt for `sound` at `context`.
    pub fn build(&self, sound: &SoundDefinition, context: &MatchContext) -> String {
        let mut prompt = String::with_capacity(1024);
        prompt.push_str(FEW_SHOT_EXAMPLES);
        prompt.push_str(&format!(
            "\nSound: {} ({})\nSentence: \"{}\"\nNearby words: \"{}\"\n\nScore:",
            sound.key,
            sound.description,
            truncate_chars(&context.sentence, self.max_sentence_chars),
            truncate_chars(&context.surrounding_words, self.max_window_chars),
        ));
        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// First `max` characters of `s` (never splits a code point).
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
