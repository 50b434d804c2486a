//! [`SoundCatalog`] — the read-only registry of sound definitions.

use std::collections::HashSet;

use crate::config::CustomSound;

use super::builtin::{SoundEntry, BUILTIN_SOUNDS};
use super::definition::{Category, SoundDefinition, TriggerPattern};
use super::CatalogError;

/// Enumerable, immutable registry of [`SoundDefinition`]s.
///
/// Iteration order is the order sounds were registered (catalog source
/// order); the playback scheduler uses it as the tie-break between equally
/// scored candidates.
#[derive(Debug, Clone)]
pub struct SoundCatalog {
    sounds: Vec<SoundDefinition>,
}

impl SoundCatalog {
    /// Compile the built-in table.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::builtin_with_custom(&[])
    }

    /// Compile the built-in table and merge user-added variations into it.
    ///
    /// Custom entries only ever append to an existing sound's variations;
    /// entries naming an unknown key are logged and skipped.
    pub fn builtin_with_custom(custom: &[CustomSound]) -> Result<Self, CatalogError> {
        let sounds = BUILTIN_SOUNDS
            .iter()
            .map(compile_entry)
            .collect::<Result<Vec<_>, _>>()?;
        let mut catalog = Self::from_definitions(sounds)?;
        catalog.merge_custom(custom);
        Ok(catalog)
    }

    /// Build a catalog from already-compiled definitions.
    pub fn from_definitions(sounds: Vec<SoundDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for sound in &sounds {
            if !seen.insert(sound.key.as_str()) {
                return Err(CatalogError::DuplicateKey(sound.key.clone()));
            }
        }
        Ok(Self { sounds })
    }

    fn merge_custom(&mut self, custom: &[CustomSound]) {
        for extra in custom {
            match self.sounds.iter_mut().find(|s| s.key == extra.sound_key) {
                Some(sound) => {
                    log::debug!(
                        "catalog: adding custom variation {} to {}",
                        extra.asset,
                        sound.key
                    );
                    sound.push_variation(extra.asset.clone());
                }
                None => {
                    log::warn!(
                        "catalog: ignoring custom sound {} for unknown key {:?}",
                        extra.asset,
                        extra.sound_key
                    );
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All definitions in source order.
    pub fn iter(&self) -> impl Iterator<Item = &SoundDefinition> {
        self.sounds.iter()
    }

    /// Definitions belonging to `category`, in source order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &SoundDefinition> {
        self.sounds.iter().filter(move |s| s.category == category)
    }

    pub fn get(&self, key: &str) -> Option<&SoundDefinition> {
        self.sounds.iter().find(|s| s.key == key)
    }

    /// Category of `key`, or `None` when the key is not registered.
    pub fn category_of(&self, key: &str) -> Option<Category> {
        self.get(key).map(|s| s.category)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}

fn compile_entry(entry: &SoundEntry) -> Result<SoundDefinition, CatalogError> {
    let triggers = entry
        .triggers
        .iter()
        .map(|(pattern, kind)| TriggerPattern::new(pattern, *kind))
        .collect::<Result<Vec<_>, _>>()?;

    SoundDefinition::new(
        entry.key,
        entry.category,
        entry.polarity,
        entry.description,
        entry.variations.iter().map(|v| v.to_string()).collect(),
        triggers,
        entry.exclusions,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
