//! Sound catalog: the static registry of sound effects, their asset
//! variations, and the trigger/exclusion rules that select them.
//!
//! * [`SoundCatalog`] — enumerable read-only registry with
//!   [`category_of`](SoundCatalog::category_of) lookup.
//! * [`SoundDefinition`] — one effect: category, variations, compiled patterns.
//! * [`TriggerPattern`] / [`PatternKind`] — a compiled trigger rule and how it
//!   is scored.
//! * [`CatalogError`] — failures while compiling the catalog.

mod builtin;
pub mod definition;
pub mod registry;

use thiserror::Error;

pub use definition::{Category, PatternKind, Polarity, SoundDefinition, TriggerPattern};
pub use registry::SoundCatalog;

/// Errors raised while building the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A trigger or exclusion pattern is not a valid regular expression.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A sound was registered without any asset variation.
    #[error("sound {0:?} has no variations")]
    NoVariations(String),

    /// Two definitions share the same key.
    #[error("duplicate sound key {0:?}")]
    DuplicateKey(String),
}
