//! Per-track selection scoring.
//!
//! A track's score is the product of a time-since-played component and its
//! decayed vote weight. Scores come back in store (insertion) order, which is
//! what makes the weighted draw in [`crate::select`] deterministic given the
//! random sequence.
//!
//! Two variants exist on purpose: [`peek_scores`] is a read-only view, while
//! [`apply_decay_and_score`] writes the decayed weight back into each record
//! so the drift accumulates. The scheduler uses the mutating variant and
//! persists the result together with the play it records.

use crate::decay::{clamp_weight, drift_toward_one};
use crate::store::TrackStore;
use chrono::{DateTime, Utc};

/// Floor for the hours term inside the logarithm. Keeps the time component
/// strictly positive for just-played or future-dated tracks.
const MIN_SCORED_HOURS: f64 = 0.1;

/// Fractional hours between `last_played` and `now`. May be negative under
/// clock skew; deliberately not clamped.
#[must_use]
pub fn hours_since(last_played: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - last_played).num_milliseconds() as f64 / 1000.0;
    seconds / 3600.0
}

/// `ln(1 + max(hours, 0.1))`; always `> 0`.
#[must_use]
pub fn time_component(hours: f64) -> f64 {
    hours.max(MIN_SCORED_HOURS).ln_1p()
}

/// Score every track without touching the store. Output is in store order.
#[must_use]
pub fn peek_scores(
    store: &TrackStore,
    now: DateTime<Utc>,
    half_life_hours: f64,
) -> Vec<(String, f64)> {
    store
        .iter()
        .map(|(id, record)| {
            let hours = hours_since(record.last_played, now);
            let adjusted = clamp_weight(drift_toward_one(
                record.vote_weight,
                hours,
                half_life_hours,
            ));
            (id.to_string(), time_component(hours) * adjusted)
        })
        .collect()
}

/// Score every track and write the clamped, decayed weight back into its
/// record. The caller persists the store. Output is in store order.
pub fn apply_decay_and_score(
    store: &mut TrackStore,
    now: DateTime<Utc>,
    half_life_hours: f64,
) -> Vec<(String, f64)> {
    let mut scores = Vec::with_capacity(store.len());
    for (id, record) in store.iter_mut() {
        let hours = hours_since(record.last_played, now);
        let adjusted = clamp_weight(drift_toward_one(
            record.vote_weight,
            hours,
            half_life_hours,
        ));
        record.vote_weight = adjusted;
        scores.push((id.to_string(), time_component(hours) * adjusted));
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::DEFAULT_HALF_LIFE_HOURS;
    use crate::store::never_played;
    use chrono::Duration;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn store_with(dir: &TempDir, tracks: &[(&str, f64, i64)]) -> (TrackStore, DateTime<Utc>) {
        let mut store = TrackStore::load(&dir.path().join("tracks.json"));
        let now = Utc::now();
        for (id, weight, hours_ago) in tracks {
            store
                .register(id, PathBuf::from(format!("/music/{id}")))
                .unwrap();
            let record = store.get_mut(id).unwrap();
            record.vote_weight = *weight;
            record.last_played = now - Duration::hours(*hours_ago);
        }
        (store, now)
    }

    #[test]
    fn time_component_is_always_positive() {
        for hours in [-100.0, -1.0, 0.0, 0.05, 0.1, 1.0, 1e6] {
            assert!(time_component(hours) > 0.0, "h = {hours}");
        }
    }

    #[test]
    fn time_component_floors_at_a_tenth_of_an_hour() {
        assert_eq!(time_component(-5.0), time_component(0.0));
        assert!((time_component(0.0) - (1.1_f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn scores_are_never_negative() {
        let dir = TempDir::new().unwrap();
        let (store, now) = store_with(&dir, &[("a", 0.5, 0), ("b", 2.0, 10_000), ("c", 1.0, 1)]);
        for (id, score) in peek_scores(&store, now, DEFAULT_HALF_LIFE_HOURS) {
            assert!(score > 0.0, "score for {id} must be positive, got {score}");
        }
    }

    #[test]
    fn scores_come_back_in_store_order() {
        let dir = TempDir::new().unwrap();
        let (store, now) = store_with(&dir, &[("z", 1.0, 5), ("a", 1.0, 5), ("m", 1.0, 5)]);
        let ids: Vec<_> = peek_scores(&store, now, DEFAULT_HALF_LIFE_HOURS)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn worked_example_matches_the_documented_formula() {
        // A: weight 1.0, played 10h ago -> ln(11) * 1.0
        // B: weight 2.0, played 10h ago -> ln(11) * (1 + 0.5^0.1) after drift
        // C: weight 0.5, played  1h ago -> ln(2)  * clamp(1 - 0.5 * 0.5^0.01)
        let dir = TempDir::new().unwrap();
        let (store, now) = store_with(&dir, &[("a", 1.0, 10), ("b", 2.0, 10), ("c", 0.5, 1)]);
        let scores = peek_scores(&store, now, DEFAULT_HALF_LIFE_HOURS);

        let expected_a = 11.0_f64.ln();
        let expected_b = 11.0_f64.ln() * (1.0 + 0.5_f64.powf(10.0 / 100.0));
        let expected_c = 2.0_f64.ln() * clamp_weight(1.0 - 0.5 * 0.5_f64.powf(1.0 / 100.0));

        assert!((scores[0].1 - expected_a).abs() < 1e-6, "A: {}", scores[0].1);
        assert!((scores[1].1 - expected_b).abs() < 1e-6, "B: {}", scores[1].1);
        assert!((scores[2].1 - expected_c).abs() < 1e-6, "C: {}", scores[2].1);

        // The liked track dominates, the disliked recent one trails far behind.
        assert!(scores[1].1 > scores[0].1 * 1.9);
        assert!(scores[2].1 < scores[0].1 * 0.2);
    }

    #[test]
    fn never_played_tracks_have_the_highest_time_component() {
        let dir = TempDir::new().unwrap();
        let (mut store, now) = store_with(&dir, &[("old", 1.0, 24 * 365)]);
        store
            .register("fresh", PathBuf::from("/music/fresh.mp3"))
            .unwrap();

        let fresh_hours = hours_since(never_played(), now);
        let old_hours = hours_since(now - Duration::hours(24 * 365), now);
        assert!(time_component(fresh_hours) > time_component(old_hours));

        let scores = peek_scores(&store, now, DEFAULT_HALF_LIFE_HOURS);
        let old = scores.iter().find(|(id, _)| id == "old").unwrap().1;
        let fresh = scores.iter().find(|(id, _)| id == "fresh").unwrap().1;
        assert!(fresh > old, "fresh {fresh} must outrank old {old}");
    }

    #[test]
    fn peek_does_not_mutate_but_apply_does() {
        let dir = TempDir::new().unwrap();
        let (mut store, now) = store_with(&dir, &[("a", 2.0, 50)]);

        peek_scores(&store, now, DEFAULT_HALF_LIFE_HOURS);
        assert_eq!(store.get("a").unwrap().vote_weight, 2.0);

        apply_decay_and_score(&mut store, now, DEFAULT_HALF_LIFE_HOURS);
        let decayed = store.get("a").unwrap().vote_weight;
        let expected = 1.0 + 0.5_f64.powf(50.0 / 100.0);
        assert!((decayed - expected).abs() < 1e-9);
    }
}
