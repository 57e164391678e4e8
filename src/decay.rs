//! Preference decay model.
//!
//! Vote weights relax back toward neutral (1.0) as time passes, so a burst of
//! likes or dislikes fades instead of pinning a track forever.

/// Lower bound of a track's vote weight.
pub const MIN_WEIGHT: f64 = 0.5;

/// Upper bound of a track's vote weight.
pub const MAX_WEIGHT: f64 = 2.0;

/// Neutral vote weight for a track nobody has voted on.
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// Default half-life of a preference, in hours: after this long, a weight has
/// moved halfway back to neutral.
pub const DEFAULT_HALF_LIFE_HOURS: f64 = 100.0;

/// Relax `weight` toward 1.0 given `hours_elapsed` since the track was last
/// played.
///
/// An exactly neutral weight is returned unchanged. Otherwise the offset from
/// neutral decays exponentially: `1.0 + (weight - 1.0) * 0.5^(h / half_life)`.
/// Negative `hours_elapsed` (clock skew) is accepted and moves the result
/// away from neutral; callers clamp afterwards.
#[must_use]
pub fn drift_toward_one(weight: f64, hours_elapsed: f64, half_life_hours: f64) -> f64 {
    if weight == NEUTRAL_WEIGHT {
        return NEUTRAL_WEIGHT;
    }
    let decay_factor = 0.5_f64.powf(hours_elapsed / half_life_hours);
    NEUTRAL_WEIGHT + (weight - NEUTRAL_WEIGHT) * decay_factor
}

/// Clamp a vote weight into `[MIN_WEIGHT, MAX_WEIGHT]`.
#[must_use]
pub fn clamp_weight(weight: f64) -> f64 {
    weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_weight_is_a_fixed_point() {
        for hours in [-500.0, -1.0, 0.0, 0.1, 100.0, 1e6] {
            assert_eq!(
                drift_toward_one(1.0, hours, DEFAULT_HALF_LIFE_HOURS),
                1.0,
                "neutral weight must be returned exactly for h = {hours}"
            );
        }
    }

    #[test]
    fn drift_is_monotonic_toward_neutral() {
        for weight in [0.5, 0.7, 1.3, 2.0] {
            let mut prev_offset = (weight - 1.0_f64).abs();
            for hours in [1.0, 10.0, 100.0, 1000.0] {
                let drifted = drift_toward_one(weight, hours, DEFAULT_HALF_LIFE_HOURS);
                let offset = (drifted - 1.0_f64).abs();
                assert!(
                    offset < prev_offset,
                    "offset must shrink as hours grow: w={weight} h={hours}"
                );
                prev_offset = offset;
            }
        }
    }

    #[test]
    fn half_life_halves_the_offset() {
        let drifted = drift_toward_one(2.0, DEFAULT_HALF_LIFE_HOURS, DEFAULT_HALF_LIFE_HOURS);
        assert!((drifted - 1.5).abs() < 1e-12);

        let drifted = drift_toward_one(0.5, DEFAULT_HALF_LIFE_HOURS, DEFAULT_HALF_LIFE_HOURS);
        assert!((drifted - 0.75).abs() < 1e-12);
    }

    #[test]
    fn negative_hours_move_away_from_neutral() {
        let drifted = drift_toward_one(1.5, -100.0, DEFAULT_HALF_LIFE_HOURS);
        assert!(drifted > 1.5, "clock skew amplifies the offset, got {drifted}");

        let drifted = drift_toward_one(0.8, -100.0, DEFAULT_HALF_LIFE_HOURS);
        assert!(drifted < 0.8);
    }

    #[test]
    fn clamp_enforces_bounds() {
        assert_eq!(clamp_weight(0.0), MIN_WEIGHT);
        assert_eq!(clamp_weight(9.9), MAX_WEIGHT);
        assert_eq!(clamp_weight(1.23), 1.23);
        assert_eq!(clamp_weight(MIN_WEIGHT), MIN_WEIGHT);
        assert_eq!(clamp_weight(MAX_WEIGHT), MAX_WEIGHT);
    }
}
