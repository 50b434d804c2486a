//! Sound definition types: categories, trigger patterns and the compiled
//! [`SoundDefinition`] the scorer works against.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::CatalogError;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Grouping of related sound keys with a single enable/disable toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Emotions,
    Actions,
    Ambient,
    Dialogue,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Emotions,
        Category::Actions,
        Category::Ambient,
        Category::Dialogue,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Emotions => "emotions",
            Category::Actions => "actions",
            Category::Ambient => "ambient",
            Category::Dialogue => "dialogue",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// PatternKind / Polarity
// ---------------------------------------------------------------------------

/// How a trigger pattern relates to the effect; selects the heuristic
/// adjustments applied when the pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// A verb describing someone performing the sound ("laughed").
    Action,
    /// Speech-shaped text ("whispered").
    Dialogue,
    /// A description of the surroundings ("rain").
    Ambient,
    /// An unambiguous mention of the effect itself ("footsteps").
    Direct,
}

/// Sentiment class used for the sentiment-alignment bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    #[default]
    Neutral,
}

// ---------------------------------------------------------------------------
// TriggerPattern
// ---------------------------------------------------------------------------

/// A compiled, case-insensitive trigger rule.
#[derive(Debug, Clone)]
pub struct TriggerPattern {
    pub kind: PatternKind,
    source: String,
    regex: Regex,
}

impl TriggerPattern {
    pub fn new(source: &str, kind: PatternKind) -> Result<Self, CatalogError> {
        Ok(Self {
            kind,
            source: source.to_string(),
            regex: compile(source)?,
        })
    }

    /// The pattern text as written in the catalog.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

pub(crate) fn compile(source: &str) -> Result<Regex, CatalogError> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|e| CatalogError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })
}

// ---------------------------------------------------------------------------
// SoundDefinition
// ---------------------------------------------------------------------------

/// One sound effect concept: where it belongs, which assets realise it, what
/// triggers it and what vetoes it.  Immutable once the catalog is built.
#[derive(Debug, Clone)]
pub struct SoundDefinition {
    pub key: String,
    pub category: Category,
    pub polarity: Polarity,
    /// Short human description, embedded in oracle prompts.
    pub description: String,
    variations: Vec<String>,
    triggers: Vec<TriggerPattern>,
    exclusions: Vec<Regex>,
}

impl SoundDefinition {
    /// Build a definition, compiling every pattern.
    ///
    /// Fails when `variations` is empty or any pattern does not compile.
    pub fn new(
        key: &str,
        category: Category,
        polarity: Polarity,
        description: &str,
        variations: Vec<String>,
        triggers: Vec<TriggerPattern>,
        exclusions: &[&str],
    ) -> Result<Self, CatalogError> {
        if variations.is_empty() {
            return Err(CatalogError::NoVariations(key.to_string()));
        }
        let exclusions = exclusions
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            key: key.to_string(),
            category,
            polarity,
            description: description.to_string(),
            variations,
            triggers,
            exclusions,
        })
    }

    /// Asset identifiers, never empty.
    pub fn variations(&self) -> &[String] {
        &self.variations
    }

    pub fn triggers(&self) -> &[TriggerPattern] {
        &self.triggers
    }

    pub fn exclusions(&self) -> &[Regex] {
        &self.exclusions
    }

    /// `true` when any exclusion pattern matches `sentence`.
    pub fn is_excluded(&self, sentence: &str) -> bool {
        self.exclusions.iter().any(|re| re.is_match(sentence))
    }

    pub(crate) fn push_variation(&mut self, asset: String) {
        self.variations.push(asset);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
