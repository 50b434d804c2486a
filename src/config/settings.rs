//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every struct is `#[serde(default)]`: a settings file that omits a key
//! falls back to the documented default for that key only.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::catalog::Category;

// ---------------------------------------------------------------------------
// CategoryToggles
// ---------------------------------------------------------------------------

/// Per-category enable flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryToggles {
    pub emotions: bool,
    pub actions: bool,
    pub ambient: bool,
    pub dialogue: bool,
}

impl CategoryToggles {
    /// Whether sounds of `category` may be considered at all.
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Emotions => self.emotions,
            Category::Actions => self.actions,
            Category::Ambient => self.ambient,
            Category::Dialogue => self.dialogue,
        }
    }

    /// Flip a single category on or off.
    pub fn set(&mut self, category: Category, enabled: bool) {
        match category {
            Category::Emotions => self.emotions = enabled,
            Category::Actions => self.actions = enabled,
            Category::Ambient => self.ambient = enabled,
            Category::Dialogue => self.dialogue = enabled,
        }
    }
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            emotions: true,
            actions: true,
            ambient: true,
            dialogue: true,
        }
    }
}

// ---------------------------------------------------------------------------
// SoundSettings
// ---------------------------------------------------------------------------

/// Read-only snapshot the playback scheduler consults for every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSettings {
    /// Master switch; when `false` every message is ignored.
    pub enabled: bool,
    /// Global playback volume (0.0 – 1.0).
    pub volume: f32,
    /// Minimum score a sound needs before it can be dispatched (0.0 – 1.0).
    pub sensitivity: f32,
    /// Minimum milliseconds between two dispatches of the same sound key.
    pub cooldown_ms: u64,
    /// Maximum number of sounds dispatched for a single message.
    pub max_concurrent: usize,
    /// Number of words kept on each side of a match for context analysis.
    pub context_window: usize,
    /// Warm the buffer cache with one variation per sound at startup.
    pub preload: bool,
    /// Per-category enable flags.
    pub categories: CategoryToggles,
}

impl SoundSettings {
    /// Cooldown window as a [`Duration`].
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Volume clamped to the range the audio backend accepts.
    pub fn effective_volume(&self) -> f32 {
        clamp_unit(self.volume)
    }

    /// Sensitivity clamped to the score range.
    pub fn effective_sensitivity(&self) -> f32 {
        clamp_unit(self.sensitivity)
    }
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.7,
            sensitivity: 0.8,
            cooldown_ms: 2_000,
            max_concurrent: 3,
            context_window: 10,
            preload: false,
            categories: CategoryToggles::default(),
        }
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// OracleConfig
// ---------------------------------------------------------------------------

/// Settings for the optional external text-scoring oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Whether the oracle is consulted at all.  Off by default: the
    /// heuristic scorer works stand-alone.
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key — `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Maximum milliseconds to wait for a score before falling back.
    pub timeout_ms: u64,
    /// Maximum number of cached oracle scores.
    pub cache_capacity: usize,
    /// Number of leading sentence characters used in the cache key.
    pub cache_key_chars: usize,
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "qwen2.5:3b".into(),
            temperature: 0.0,
            timeout_ms: 5_000,
            cache_capacity: 100,
            cache_key_chars: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// CustomSound
// ---------------------------------------------------------------------------

/// A user-supplied extra variation for an existing sound key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSound {
    /// Key of the built-in sound this asset is added to (e.g. `"laugh"`).
    pub sound_key: String,
    /// Asset identifier, resolved relative to the sounds directory.
    pub asset: String,
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use chat_sfx::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides [`AppPaths::sounds_dir`] when set.
    pub sounds_dir: Option<PathBuf>,
    /// Engine behaviour (thresholds, cooldown, volume, categories).
    pub sound: SoundSettings,
    /// External text-scoring oracle.
    pub oracle: OracleConfig,
    /// Extra variations merged into built-in sounds at load time.
    pub custom_sounds: Vec<CustomSound>,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory that asset identifiers are resolved against.
    pub fn resolved_sounds_dir(&self) -> PathBuf {
        AppPaths::new().sounds_root(self.sounds_dir.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
