//! Configuration and data directory management.
//!
//! Encore keeps its persisted state in the platform data directory:
//! `~/.local/share/encore/` on Linux, the equivalents elsewhere. Tunables
//! live in a `SchedulerConfig`, optionally overridden by a JSON config file
//! next to the track store. The config file gets the same corrupt-tolerant
//! treatment as the store: absent or malformed means defaults, never a
//! startup failure.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::decay::DEFAULT_HALF_LIFE_HOURS;
use crate::select::DEFAULT_REPEAT_LIMIT;

/// Canonical "like" vote multiplier.
pub const LIKE_MULTIPLIER: f64 = 1.1;

/// Canonical "dislike" vote multiplier.
pub const DISLIKE_MULTIPLIER: f64 = 0.9;

/// Returns the encore data directory, creating it if necessary.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .context("Could not determine the system data directory")?
        .join("encore");
    fs::create_dir_all(&data_dir).with_context(|| {
        format!("Failed to create data directory at {}", data_dir.display())
    })?;
    Ok(data_dir)
}

/// Path of the persisted track store.
pub fn get_store_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("tracks.json"))
}

/// Path of the optional tunables file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("config.json"))
}

/// Tunable scheduler parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ceiling on the recency window (the effective bound also caps at the
    /// library size).
    pub repeat_limit: usize,
    /// Preference half-life in hours.
    pub half_life_hours: f64,
    /// Multiplier applied by a "like" vote.
    pub like_multiplier: f64,
    /// Multiplier applied by a "dislike" vote.
    pub dislike_multiplier: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            repeat_limit: DEFAULT_REPEAT_LIMIT,
            half_life_hours: DEFAULT_HALF_LIFE_HOURS,
            like_multiplier: LIKE_MULTIPLIER,
            dislike_multiplier: DISLIKE_MULTIPLIER,
        }
    }
}

impl SchedulerConfig {
    /// Load tunables from `path`, falling back to defaults when the file is
    /// absent or unreadable.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => config,
                Err(err) => {
                    warn!(
                        "Config at {} is malformed, using defaults: {err}",
                        path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
