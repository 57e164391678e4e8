//! # Integration Tests for Encore
//!
//! End-to-end workflows through the library API: registering tracks,
//! advancing through play cycles, voting, and verifying that every mutation
//! survives a reload from disk.

use chrono::{Duration, Utc};
use encore::config::SchedulerConfig;
use encore::scheduler::Scheduler;
use encore::store::{never_played, TrackStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a scheduler over a fresh temp library with the given track files.
fn library_with_tracks(ids: &[&str]) -> (TempDir, PathBuf, Scheduler) {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("tracks.json");
    let store = TrackStore::load(&store_path);
    let mut scheduler = Scheduler::new(store, SchedulerConfig::default());
    for id in ids {
        let path = dir.path().join(id);
        fs::write(&path, b"not really audio").unwrap();
        scheduler.register(id, path).unwrap();
    }
    (dir, store_path, scheduler)
}

#[test]
fn full_listening_cycle_persists_plays_and_votes() {
    let (_dir, store_path, mut scheduler) = library_with_tracks(&["a.mp3", "b.mp3", "c.mp3"]);
    let mut rng = StdRng::seed_from_u64(7);

    // Play three tracks, liking each one.
    let mut played = Vec::new();
    for _ in 0..3 {
        let selection = scheduler.advance(Utc::now(), &mut rng).unwrap().unwrap();
        let weight = scheduler.vote_current(1.1).unwrap().unwrap();
        assert!(weight > 1.0);
        played.push(selection.id);
    }

    // With a 3-track library the repeat window is the whole library, so the
    // three plays must all differ.
    played.sort();
    played.dedup();
    assert_eq!(played.len(), 3);

    // Everything reached disk: weights above neutral, plays recorded.
    let reloaded = TrackStore::load(&store_path);
    assert_eq!(reloaded.len(), 3);
    for (_, record) in reloaded.iter() {
        assert!(record.vote_weight > 1.0);
        assert_ne!(record.last_played, never_played());
    }
}

#[test]
fn registration_is_idempotent_and_keeps_insertion_order() {
    let (dir, store_path, mut scheduler) = library_with_tracks(&["z.mp3", "a.mp3", "m.mp3"]);

    // Re-registering must not disturb existing records.
    let again = scheduler
        .register("a.mp3", dir.path().join("a.mp3"))
        .unwrap();
    assert!(!again);

    let reloaded = TrackStore::load(&store_path);
    assert_eq!(reloaded.ids(), ["z.mp3", "a.mp3", "m.mp3"]);
}

#[test]
fn votes_survive_a_process_restart() {
    let (_dir, store_path, mut scheduler) = library_with_tracks(&["a.mp3"]);
    let mut rng = StdRng::seed_from_u64(3);

    scheduler.advance(Utc::now(), &mut rng).unwrap().unwrap();
    for _ in 0..5 {
        scheduler.vote_current(0.9).unwrap().unwrap();
    }
    let weight_before = scheduler.store().get("a.mp3").unwrap().vote_weight;

    // A new scheduler over the same file sees the accumulated dislikes.
    let revived = Scheduler::new(TrackStore::load(&store_path), SchedulerConfig::default());
    let weight_after = revived.store().get("a.mp3").unwrap().vote_weight;
    assert!((weight_before - weight_after).abs() < 1e-12);
    assert!(weight_after < 1.0);
}

#[test]
fn reset_returns_every_weight_to_neutral_on_disk() {
    let (_dir, store_path, mut scheduler) = library_with_tracks(&["a.mp3", "b.mp3"]);
    let mut rng = StdRng::seed_from_u64(11);

    scheduler.advance(Utc::now(), &mut rng).unwrap().unwrap();
    scheduler.vote_current(1.1).unwrap().unwrap();
    scheduler.reset_votes().unwrap();

    let reloaded = TrackStore::load(&store_path);
    for (_, record) in reloaded.iter() {
        assert_eq!(record.vote_weight, 1.0);
    }
}

#[test]
fn removing_the_playing_track_requests_a_playback_stop() {
    let (_dir, store_path, mut scheduler) = library_with_tracks(&["a.mp3", "b.mp3"]);
    let mut rng = StdRng::seed_from_u64(5);

    let selection = scheduler.advance(Utc::now(), &mut rng).unwrap().unwrap();
    let removal = scheduler.remove(&selection.id).unwrap();
    assert!(removal.removed);
    assert!(removal.stop_playback);

    let reloaded = TrackStore::load(&store_path);
    assert_eq!(reloaded.len(), 1);
    assert!(!reloaded.contains(&selection.id));
}

#[test]
fn deleted_files_are_pruned_at_startup() {
    let (dir, store_path, mut scheduler) = library_with_tracks(&["a.mp3", "b.mp3", "c.mp3"]);
    fs::remove_file(dir.path().join("b.mp3")).unwrap();

    let removed = scheduler.prune_missing().unwrap();
    assert_eq!(removed, ["b.mp3"]);

    let reloaded = TrackStore::load(&store_path);
    assert_eq!(reloaded.ids(), ["a.mp3", "c.mp3"]);
}

#[test]
fn long_idle_tracks_dominate_listing_scores() {
    let (_dir, _store_path, mut scheduler) = library_with_tracks(&["a.mp3", "b.mp3"]);
    let now = Utc::now();

    // One play leaves the other track never-played.
    let mut rng = StdRng::seed_from_u64(2);
    let fresh = scheduler.advance(now, &mut rng).unwrap().unwrap().id;
    let idle = if fresh == "a.mp3" { "b.mp3" } else { "a.mp3" };

    let scores = scheduler.peek_scores(now + Duration::minutes(1));
    let of = |id: &str| scores.iter().find(|(k, _)| k == id).unwrap().1;
    assert!(
        of(idle) > of(&fresh),
        "a never-played track must outscore one played a minute ago"
    );
}

#[test]
fn corrupt_state_file_degrades_to_an_empty_library() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("tracks.json");
    fs::write(&store_path, b"{ this is not json").unwrap();

    let mut scheduler = Scheduler::new(TrackStore::load(&store_path), SchedulerConfig::default());
    let mut rng = StdRng::seed_from_u64(9);
    assert_eq!(scheduler.advance(Utc::now(), &mut rng).unwrap(), None);

    // The library still works after the bad start.
    let path = dir.path().join("new.mp3");
    fs::write(&path, b"audio").unwrap();
    scheduler.register("new.mp3", path).unwrap();
    let selection = scheduler.advance(Utc::now(), &mut rng).unwrap().unwrap();
    assert_eq!(selection.id, "new.mp3");
}
