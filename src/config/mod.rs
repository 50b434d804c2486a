//! Configuration module for the chat sound-effect engine.
//!
//! Provides `AppConfig` (top-level settings), the engine's `SoundSettings`
//! snapshot, oracle connection settings, `AppPaths` for cross-platform data
//! directories, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, CategoryToggles, CustomSound, OracleConfig, SoundSettings};
