//! Application entry point for chat sound effects.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build the sound catalog, merging any custom variations from config.
//! 4. Build the scorer, with the text-scoring oracle when enabled.
//! 5. Open the audio backend (rodio when compiled in, silent otherwise).
//! 6. Initialise the scheduler (optionally preloading buffers).
//! 7. Feed every stdin line to the scheduler as a chat message until EOF.
//!
//! Lines starting with `/` are commands: `/preview <sound>` plays a sound
//! directly, `/sounds` lists the catalog, `/analyze <text>` prints scores
//! without playing anything.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use chat_sfx::{
    analysis::Scorer,
    audio::{AudioBackend, FsAssetSource, NullBackend},
    catalog::SoundCatalog,
    config::AppConfig,
    oracle::ApiOracle,
    playback::PlaybackScheduler,
};

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

#[cfg(feature = "rodio")]
fn open_backend() -> Arc<dyn AudioBackend> {
    match chat_sfx::audio::RodioBackend::start() {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            log::warn!("Audio output unavailable ({e}); sounds will be silent");
            Arc::new(NullBackend::new())
        }
    }
}

#[cfg(not(feature = "rodio"))]
fn open_backend() -> Arc<dyn AudioBackend> {
    log::info!("Built without the `rodio` feature; sounds will be silent");
    Arc::new(NullBackend::new())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn run_command(scheduler: &PlaybackScheduler, line: &str) {
    let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
    let arg = arg.trim();

    match command {
        "/preview" => match scheduler.preview(arg).await {
            Ok(outcome) => println!("{} -> {} ({:?})", outcome.sound_key, outcome.asset, outcome.status),
            Err(e) => println!("preview failed: {e}"),
        },
        "/sounds" => {
            for sound in scheduler.catalog().iter() {
                println!(
                    "{:<10} {:<8} {} ({} variations)",
                    sound.key,
                    sound.category.label(),
                    sound.description,
                    sound.variations().len()
                );
            }
        }
        "/analyze" => {
            for candidate in scheduler.analyze(arg).await {
                println!(
                    "{:<10} {:.2} {} {:?}",
                    candidate.sound_key,
                    candidate.result.score,
                    candidate.result.reason,
                    candidate.result.matched_text.unwrap_or_default()
                );
            }
        }
        other => println!("unknown command {other}"),
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("chat-sfx starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Catalog
    let catalog = SoundCatalog::builtin_with_custom(&config.custom_sounds)
        .context("failed to build sound catalog")?;

    // 4. Scorer
    let scorer = if config.oracle.enabled {
        log::info!("Text-scoring oracle enabled ({})", config.oracle.model);
        Scorer::with_oracle(Arc::new(ApiOracle::from_config(&config.oracle)), &config.oracle)
    } else {
        Scorer::new()
    };

    // 5. Audio
    let backend = open_backend();
    let sounds_dir = config.resolved_sounds_dir();
    log::info!("Loading sounds from {}", sounds_dir.display());
    let source = Arc::new(FsAssetSource::new(sounds_dir));

    // 6. Scheduler
    let scheduler = PlaybackScheduler::new(
        Arc::new(catalog),
        scorer,
        source,
        backend,
        config.sound.clone(),
    );
    scheduler.initialize().await;

    // 7. Message loop
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('/') {
            run_command(&scheduler, line).await;
            continue;
        }

        let outcomes = scheduler.handle_message(line).await;
        for outcome in &outcomes {
            if outcome.is_played() {
                log::info!("Played {} ({})", outcome.sound_key, outcome.asset);
            }
        }
        if outcomes.is_empty() {
            log::debug!("No sounds for message");
        }
    }

    log::info!("stdin closed; shutting down");
    Ok(())
}
