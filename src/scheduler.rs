//! Scheduler facade.
//!
//! Owns the track store, the recency window, and the current-track state, and
//! orchestrates everything into two operations the outside world cares about:
//! "select the next track" ([`Scheduler::advance`]) and "record feedback"
//! ([`Scheduler::vote_current`]). All store mutations flow through here, on a
//! single logical thread; no locking, by construction.

use crate::config::SchedulerConfig;
use crate::feedback;
use crate::score;
use crate::select::{self, RecencyWindow};
use crate::store::TrackStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::Rng;
use std::path::{Path, PathBuf};

/// The outcome of a successful [`Scheduler::advance`]: what to play and where
/// to load it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: String,
    pub path: PathBuf,
}

/// What the caller must do after removing a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    /// Whether the id actually existed.
    pub removed: bool,
    /// True when the removed track was the current one; the playback
    /// collaborator must be stopped.
    pub stop_playback: bool,
}

/// State machine: `Idle` (current = None) or `Selected(id)` (current = Some).
/// `advance_pending` is the debounce guard for end-of-track signals.
#[derive(Debug)]
pub struct Scheduler {
    store: TrackStore,
    window: RecencyWindow,
    current: Option<String>,
    advance_pending: bool,
    config: SchedulerConfig,
}

impl Scheduler {
    #[must_use]
    pub fn new(store: TrackStore, config: SchedulerConfig) -> Self {
        Self {
            store,
            window: RecencyWindow::new(),
            current: None,
            advance_pending: false,
            config,
        }
    }

    #[must_use]
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Id of the currently selected track, if any.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Scores as the next advance would see them, without touching the store.
    #[must_use]
    pub fn peek_scores(&self, now: DateTime<Utc>) -> Vec<(String, f64)> {
        score::peek_scores(&self.store, now, self.config.half_life_hours)
    }

    /// Select the next track, checking file existence with `Path::exists`.
    pub fn advance<R: Rng>(&mut self, now: DateTime<Utc>, rng: &mut R) -> Result<Option<Selection>> {
        self.advance_with(now, rng, |path| path.exists())
    }

    /// Select the next track with an injectable existence check.
    ///
    /// Prunes missing files, scores the library (persisting the decayed
    /// weights along with the play), and draws from the recency-filtered
    /// distribution. A track whose file vanished between the prune and the
    /// draw is dropped and the draw retried, at most once per known track, so
    /// a fully invalid library terminates with `Ok(None)` ("nothing to
    /// play"). `Ok(None)` always leaves the scheduler Idle.
    pub fn advance_with<R, F>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
        exists: F,
    ) -> Result<Option<Selection>>
    where
        R: Rng,
        F: Fn(&Path) -> bool,
    {
        self.advance_pending = false;
        self.prune_missing_with(&exists)?;

        let mut attempts = self.store.len();
        while attempts > 0 {
            let scores = score::apply_decay_and_score(&mut self.store, now, self.config.half_life_hours);
            let limit = self.config.repeat_limit.min(self.store.len());
            let Some(id) = select::pick(&scores, &mut self.window, limit, rng) else {
                break;
            };

            // The store always has a record for a freshly picked id.
            let Some(path) = self.store.get(&id).map(|record| record.path.clone()) else {
                break;
            };

            if !exists(&path) {
                // Raced against deletion between prune and use.
                warn!("Track '{id}' vanished before playback, dropping it");
                self.forget(&id)?;
                attempts -= 1;
                continue;
            }

            if let Some(record) = self.store.get_mut(&id) {
                record.last_played = now;
            }
            self.store.save()?;
            self.current = Some(id.clone());
            info!("Selected '{id}'");
            return Ok(Some(Selection { id, path }));
        }

        self.current = None;
        info!("Nothing to play");
        Ok(None)
    }

    /// Apply a vote multiplier to the current track. Returns the new weight,
    /// or `None` when there is no active selection (the store is untouched).
    pub fn vote_current(&mut self, multiplier: f64) -> Result<Option<f64>> {
        match self.current.clone() {
            None => Ok(None),
            Some(id) => feedback::vote(&mut self.store, &id, multiplier).map(Some),
        }
    }

    /// Reset every vote weight to neutral.
    pub fn reset_votes(&mut self) -> Result<()> {
        feedback::reset_all(&mut self.store)
    }

    /// Register a new track; no-op if the id is known.
    pub fn register(&mut self, id: &str, path: PathBuf) -> Result<bool> {
        self.store.register(id, path)
    }

    /// Remove a track, purging it from the recency window and clearing the
    /// current selection when it was playing.
    pub fn remove(&mut self, id: &str) -> Result<Removal> {
        let removed = self.store.remove(id)?;
        self.window.forget(id);
        let stop_playback = self.current.as_deref() == Some(id);
        if stop_playback {
            self.current = None;
            self.advance_pending = false;
        }
        Ok(Removal {
            removed,
            stop_playback,
        })
    }

    /// Drop all tracks whose backing file is gone. Run at startup and at the
    /// top of every advance.
    pub fn prune_missing(&mut self) -> Result<Vec<String>> {
        self.prune_missing_with(|path| path.exists())
    }

    pub fn prune_missing_with<F>(&mut self, exists: F) -> Result<Vec<String>>
    where
        F: Fn(&Path) -> bool,
    {
        let removed = self.store.prune_missing(exists)?;
        for id in &removed {
            self.window.forget(id);
            if self.current.as_deref() == Some(id.as_str()) {
                self.current = None;
                self.advance_pending = false;
            }
        }
        Ok(removed)
    }

    /// End-of-track debounce. Returns true exactly once per pending advance:
    /// repeated end-of-track signals arriving before the advance executes do
    /// not enqueue further advances. Returns false while Idle.
    pub fn track_ended(&mut self) -> bool {
        if self.current.is_none() || self.advance_pending {
            return false;
        }
        self.advance_pending = true;
        true
    }

    /// Explicit stop: back to Idle, pending advance cancelled.
    pub fn stop(&mut self) {
        self.current = None;
        self.advance_pending = false;
    }

    fn forget(&mut self, id: &str) -> Result<()> {
        self.store.remove(id)?;
        self.window.forget(id);
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        Ok(())
    }
}
