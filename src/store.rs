//! Persisted track store.
//!
//! A single JSON document keyed by track id, rewritten in full after every
//! mutation. Insertion order is the iteration order, it is preserved in the
//! document itself and therefore survives load/save cycles. A missing, empty,
//! or corrupted document loads as an empty store; startup never fails on bad
//! state.

use crate::decay::{clamp_weight, NEUTRAL_WEIGHT};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Persisted metadata for one library track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Location the playback collaborator can load audio from.
    pub path: PathBuf,
    /// When the track was last selected for playback. Never-played tracks
    /// carry the [`never_played`] sentinel, which maximises their priority.
    pub last_played: DateTime<Utc>,
    /// Preference multiplier in `[0.5, 2.0]`, 1.0 = neutral.
    pub vote_weight: f64,
}

impl TrackRecord {
    /// A fresh record for a just-registered track.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_played: never_played(),
            vote_weight: NEUTRAL_WEIGHT,
        }
    }
}

/// The "never played" sentinel: a date far enough in the past that the
/// time-since-played component of scoring saturates.
#[must_use]
pub fn never_played() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Insertion-ordered mapping of track id to [`TrackRecord`], backed by a JSON
/// document on disk.
#[derive(Debug, Clone)]
pub struct TrackStore {
    entries: Vec<(String, TrackRecord)>,
    path: PathBuf,
}

impl TrackStore {
    /// Load the store at `path`. Absent, zero-length, or malformed documents
    /// yield an empty store; individual malformed records are dropped and the
    /// rest of the document survives. Weights are re-clamped on the way in.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => {
                debug!("Track store at {} is empty", path.display());
                Vec::new()
            }
            Ok(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(doc) => {
                    let mut entries = Vec::with_capacity(doc.len());
                    for (id, value) in doc {
                        match serde_json::from_value::<TrackRecord>(value) {
                            Ok(mut record) => {
                                record.vote_weight = clamp_weight(record.vote_weight);
                                entries.push((id, record));
                            }
                            Err(err) => {
                                warn!("Dropping malformed record for '{id}': {err}");
                            }
                        }
                    }
                    entries
                }
                Err(err) => {
                    warn!(
                        "Track store at {} is corrupted, starting empty: {err}",
                        path.display()
                    );
                    Vec::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No track store at {}, starting empty", path.display());
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "Could not read track store at {}, starting empty: {err}",
                    path.display()
                );
                Vec::new()
            }
        };

        Self {
            entries,
            path: path.to_path_buf(),
        }
    }

    /// Rewrite the whole document. Called after every mutation.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory {}", parent.display())
                })?;
            }
        }

        let mut doc = Map::new();
        for (id, record) in &self.entries {
            let value = serde_json::to_value(record)
                .with_context(|| format!("Failed to serialize record for '{id}'"))?;
            doc.insert(id.clone(), value);
        }

        let raw = serde_json::to_string_pretty(&Value::Object(doc))
            .context("Failed to serialize track store")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write track store to {}", self.path.display()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TrackRecord> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, record)| record)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TrackRecord> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == id)
            .map(|(_, record)| record)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackRecord)> {
        self.entries
            .iter()
            .map(|(id, record)| (id.as_str(), record))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut TrackRecord)> {
        self.entries
            .iter_mut()
            .map(|(id, record)| (id.as_str(), record))
    }

    /// Track ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Register a new track. Returns `false` (and leaves the store untouched)
    /// if the id is already present; persists otherwise.
    pub fn register(&mut self, id: &str, path: PathBuf) -> Result<bool> {
        if self.contains(id) {
            debug!("Track '{id}' already registered");
            return Ok(false);
        }
        self.entries.push((id.to_string(), TrackRecord::new(path)));
        self.save()?;
        Ok(true)
    }

    /// Remove a track. Returns whether it existed; persists when it did.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|(key, _)| key != id);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Drop every record whose backing path fails `exists`. Returns the
    /// removed ids; persists only when something was removed.
    pub fn prune_missing<F>(&mut self, exists: F) -> Result<Vec<String>>
    where
        F: Fn(&Path) -> bool,
    {
        let mut removed = Vec::new();
        self.entries.retain(|(id, record)| {
            if exists(&record.path) {
                true
            } else {
                warn!("Removing missing track '{id}' ({})", record.path.display());
                removed.push(id.clone());
                false
            }
        });
        if !removed.is_empty() {
            self.save()?;
        }
        Ok(removed)
    }
}
