//! # Encore - Adaptive Track Scheduler
//!
//! Encore decides what plays next from a local music library. Every track
//! carries a preference weight that votes nudge up or down; weights drift
//! back toward neutral over time, and selection favours tracks that have
//! not played recently.
//!
//! ## Architecture
//!
//! - `cli`: Command-line interface definitions
//! - `store`: Persisted per-track records (JSON document)
//! - `decay`: Half-life drift of preference weights toward neutral
//! - `score`: Recency-aware scoring
//! - `select`: Weighted random selection with a repeat window
//! - `scheduler`: The facade tying store, scoring, and selection together
//! - `playback`: Audio output
//! - `runtime`: The interactive play session
//!
//! ## Usage
//!
//! ```bash
//! # Register music
//! encore add-dir ~/Music
//!
//! # See what the scheduler thinks of each track
//! encore list
//!
//! # Start listening
//! encore play
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{CommandFactory, Parser};
use encore::playback::RodioPlayer;
use encore::scheduler::Scheduler;
use encore::store::TrackStore;
use encore::{cli, config, metadata, runtime, score};
use log::info;
use path_absolutize::Absolutize;
use std::path::Path;

/// File extensions the scanner treats as audio.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "m4a", "wav"];

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Register a single file, using its file name as the track identifier.
fn register_file(scheduler: &mut Scheduler, path: &Path) -> Result<bool> {
    let absolute = path
        .absolutize()
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;
    let id = absolute
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Path has no usable file name: {}", path.display()))?
        .to_string();
    scheduler.register(&id, absolute.to_path_buf())
}

fn open_scheduler() -> Result<Scheduler> {
    let store_path = config::get_store_path()?;
    let settings = config::SchedulerConfig::load_or_default(&config::get_config_path()?);
    Ok(Scheduler::new(TrackStore::load(&store_path), settings))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Add { paths } => {
            let mut scheduler = open_scheduler()?;
            let mut added = 0usize;
            for path in &paths {
                if !path.is_file() {
                    eprintln!("Skipping {}: not a file", path.display());
                    continue;
                }
                if register_file(&mut scheduler, path)? {
                    added += 1;
                }
            }
            println!("Added {added} track(s).");
        }
        cli::Command::AddDir { path } => {
            info!("Scanning directory: {}", path.display());
            let entries = std::fs::read_dir(&path)
                .with_context(|| format!("Failed to read directory: {}", path.display()))?;
            let mut scheduler = open_scheduler()?;
            let mut added = 0usize;
            for entry in entries {
                let entry = entry.context("Failed to read directory entry")?;
                let file_path = entry.path();
                if file_path.is_file()
                    && is_audio_file(&file_path)
                    && register_file(&mut scheduler, &file_path)?
                {
                    added += 1;
                }
            }
            println!("Added {added} track(s) from {}.", path.display());
        }
        cli::Command::Remove { id } => {
            let mut scheduler = open_scheduler()?;
            let removal = scheduler.remove(&id)?;
            if removal.removed {
                println!("Removed '{id}'.");
            } else {
                println!("No track named '{id}'.");
            }
        }
        cli::Command::List => {
            let scheduler = open_scheduler()?;
            list_tracks(&scheduler);
        }
        cli::Command::Play => {
            let mut scheduler = open_scheduler()?;
            let mut player = RodioPlayer::new()?;
            runtime::run_session(&mut scheduler, &mut player)?;
        }
        cli::Command::Next => {
            let mut scheduler = open_scheduler()?;
            let mut rng = rand::thread_rng();
            match scheduler.advance(Utc::now(), &mut rng)? {
                Some(selection) => {
                    let tags = metadata::read_tags(&selection.path);
                    println!("{} - {}", selection.id, tags.artist);
                }
                None => println!("Nothing to play."),
            }
        }
        cli::Command::Reset => {
            let mut scheduler = open_scheduler()?;
            scheduler.reset_votes()?;
            println!("All weights reset to neutral.");
        }
        cli::Command::Prune => {
            let mut scheduler = open_scheduler()?;
            let removed = scheduler.prune_missing()?;
            if removed.is_empty() {
                println!("Nothing to prune.");
            } else {
                for id in &removed {
                    println!("Pruned '{id}'.");
                }
                println!("Pruned {} track(s).", removed.len());
            }
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            clap_complete::generate(shell, &mut cmd, "encore", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Print one line per track with its weight, idle hours, and score.
fn list_tracks(scheduler: &Scheduler) {
    let now = Utc::now();
    let scores = scheduler.peek_scores(now);
    if scores.is_empty() {
        println!("Library is empty. Register tracks with 'encore add'.");
        return;
    }
    println!("{:<40} {:>8} {:>10} {:>8}", "Track", "Weight", "Idle (h)", "Score");
    for (id, track_score) in &scores {
        if let Some(record) = scheduler.store().get(id) {
            let idle = score::hours_since(record.last_played, now);
            println!(
                "{:<40} {:>8.3} {:>10.1} {:>8.3}",
                id, record.vote_weight, idle, track_score
            );
        }
    }
    println!("{} track(s).", scores.len());
}
