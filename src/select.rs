//! Weighted, recency-aware track selection.
//!
//! Selection is a weighted random draw over scored tracks, with a bounded
//! FIFO of recently chosen ids suppressing short-term repeats. The window is
//! advisory: when every candidate sits inside it, the draw falls back to the
//! full set rather than starving playback.

use log::trace;
use rand::Rng;
use std::collections::VecDeque;

/// Hard ceiling on how many recent picks are suppressed; the effective bound
/// is `min(repeat_limit, library size)` and is re-derived on every change.
pub const DEFAULT_REPEAT_LIMIT: usize = 150;

/// Bounded FIFO of recently selected track ids.
#[derive(Debug, Default)]
pub struct RecencyWindow {
    recent: VecDeque<String>,
}

impl RecencyWindow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.recent.iter().any(|recent| recent == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// Drop `id` wherever it sits in the window (it was removed from the
    /// library).
    pub fn forget(&mut self, id: &str) {
        self.recent.retain(|recent| recent != id);
    }

    /// Append a pick and evict oldest entries until the window fits `limit`.
    /// The limit may have shrunk since the last call, so this evicts in a
    /// loop rather than assuming a single overflow.
    pub fn record(&mut self, id: String, limit: usize) {
        self.recent.push_back(id);
        while self.recent.len() > limit {
            self.recent.pop_front();
        }
    }
}

/// Pick one track id from `scores` (store-ordered `(id, score)` pairs),
/// advancing `window` as a side effect.
///
/// Empty input returns `None`. Tracks inside the window are excluded unless
/// that would leave nothing, in which case the whole set is eligible again.
/// A zero score total degenerates to a uniform draw; otherwise the draw is
/// proportional to score, walking the pairs in order and taking the first
/// whose cumulative sum reaches the drawn value.
pub fn pick<R: Rng>(
    scores: &[(String, f64)],
    window: &mut RecencyWindow,
    limit: usize,
    rng: &mut R,
) -> Option<String> {
    if scores.is_empty() {
        return None;
    }

    let available: Vec<&(String, f64)> = {
        let outside: Vec<&(String, f64)> = scores
            .iter()
            .filter(|(id, _)| !window.contains(id))
            .collect();
        if outside.is_empty() {
            trace!("Every track is in the recency window; falling back to the full set");
            scores.iter().collect()
        } else {
            outside
        }
    };

    let total: f64 = available.iter().map(|(_, score)| score).sum();

    let chosen = if total <= 0.0 {
        // Degenerate: nothing has a positive score, draw uniformly.
        let index = rng.gen_range(0..available.len());
        available[index].0.clone()
    } else {
        let r = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        let mut chosen = &available[available.len() - 1].0;
        for (id, score) in &available {
            cumulative += score;
            if cumulative >= r {
                chosen = id;
                break;
            }
        }
        chosen.clone()
    };

    window.record(chosen.clone(), limit);
    trace!("Selected '{chosen}' (window {}/{limit})", window.len());
    Some(chosen)
}
