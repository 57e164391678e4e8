//! Like/dislike feedback applied to the track store.

use crate::decay::{clamp_weight, NEUTRAL_WEIGHT};
use crate::store::TrackStore;
use anyhow::{bail, Result};
use log::debug;

/// Multiply a track's vote weight and persist. The result is clamped into the
/// weight bounds. Unknown ids are an error; whether the id is the *current*
/// track is the scheduler facade's concern, not this one's.
pub fn vote(store: &mut TrackStore, id: &str, multiplier: f64) -> Result<f64> {
    let Some(record) = store.get_mut(id) else {
        bail!("Cannot vote on unknown track '{id}'");
    };
    let weight = clamp_weight(record.vote_weight * multiplier);
    record.vote_weight = weight;
    store.save()?;
    debug!("Vote x{multiplier} on '{id}' -> weight {weight:.2}");
    Ok(weight)
}

/// Reset every track's vote weight to neutral and persist. Idempotent.
pub fn reset_all(store: &mut TrackStore) -> Result<()> {
    for (_, record) in store.iter_mut() {
        record.vote_weight = NEUTRAL_WEIGHT;
    }
    store.save()
}
