//! Deterministic score calculation.
//!
//! The total score and the itemized breakdown are both built from the
//! component functions below, so the breakdown always sums (after
//! clamping) to the reported score.

use hotel_safety_models::{InfrastructureCounts, ScoreBreakdown};

use crate::ScoringConfig;

/// Lowest possible score.
pub const MIN_SCORE: i64 = 0;
/// Highest possible score.
pub const MAX_SCORE: i64 = 100;

/// Minimum rating (inclusive) for the excellent tier.
const EXCELLENT_RATING: f64 = 4.0;
/// Minimum rating (inclusive) for the good tier.
const GOOD_RATING: f64 = 3.0;

/// Rating tier bonus. Ratings are compared high to low with inclusive lower
/// bounds; anything below 3 (including `NaN`) is poor.
#[must_use]
pub fn rating_bonus(config: &ScoringConfig, rating: f64) -> i32 {
    if rating >= EXCELLENT_RATING {
        config.rating_weights.excellent
    } else if rating >= GOOD_RATING {
        config.rating_weights.good
    } else {
        config.rating_weights.poor
    }
}

/// Penalty for negative reviews, saturating at the configured maximum.
#[must_use]
pub fn negative_penalty(config: &ScoringConfig, negative_hits: usize) -> i32 {
    let hits = i64::try_from(negative_hits).unwrap_or(i64::MAX);
    let penalty = hits
        .saturating_mul(i64::from(config.negative_review_penalty_per_hit))
        .min(i64::from(config.max_negative_review_penalty));
    narrow(penalty)
}

/// `min(count * weight, cap)` for one infrastructure category.
#[must_use]
pub fn capped_contribution(count: u32, weight: i32, cap: i32) -> i32 {
    narrow((i64::from(count) * i64::from(weight)).min(i64::from(cap)))
}

/// Sum of the four independently capped infrastructure contributions.
/// Roads are not included; see [`road_adjustment`].
#[must_use]
pub fn infrastructure_bonus(config: &ScoringConfig, infrastructure: &InfrastructureCounts) -> i32 {
    let weights = &config.infrastructure_weights;
    let caps = &config.caps;

    let total = [
        (infrastructure.street_lights, weights.street_light, caps.street_light),
        (infrastructure.police_stations, weights.police_station, caps.police_station),
        (infrastructure.hospitals, weights.hospital, caps.hospital),
        (infrastructure.fire_stations, weights.fire_station, caps.fire_station),
    ]
    .into_iter()
    .map(|(count, weight, cap)| i64::from(capped_contribution(count, weight, cap)))
    .sum::<i64>();

    narrow(total)
}

/// Road density adjustment.
///
/// More than `high_threshold` roads adds the adjustment, fewer than
/// `low_threshold` subtracts it, and the band in between (inclusive on both
/// ends) is neutral. With the defaults a count of 20 gains nothing while 21
/// gains the full +10.
#[must_use]
pub const fn road_adjustment(config: &ScoringConfig, roads_nearby: u32) -> i32 {
    let band = &config.road_density;
    if roads_nearby > band.high_threshold {
        band.adjustment
    } else if roads_nearby < band.low_threshold {
        -band.adjustment
    } else {
        0
    }
}

/// Result of scoring one venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    /// Clamped score in `0..=100`.
    pub score: u8,
    /// Number of reviews that contained a negative keyword.
    pub negative_hits: usize,
}

/// Computes the clamped safety score.
#[must_use]
pub fn calculate_score(
    config: &ScoringConfig,
    rating: f64,
    infrastructure: &InfrastructureCounts,
    negative_hits: usize,
) -> ScoreOutcome {
    let raw = i64::from(config.base_score)
        + i64::from(rating_bonus(config, rating))
        - i64::from(negative_penalty(config, negative_hits))
        + i64::from(infrastructure_bonus(config, infrastructure))
        + i64::from(road_adjustment(config, infrastructure.roads_nearby));

    ScoreOutcome {
        score: clamp_score(raw),
        negative_hits,
    }
}

/// Produces the itemized breakdown for the same inputs as
/// [`calculate_score`].
#[must_use]
pub fn score_breakdown(
    config: &ScoringConfig,
    rating: f64,
    infrastructure: &InfrastructureCounts,
    negative_hits: usize,
) -> ScoreBreakdown {
    let base_score = config.base_score;
    let rating_bonus = rating_bonus(config, rating);
    let infrastructure_bonus = infrastructure_bonus(config, infrastructure);
    let negative_penalty = negative_penalty(config, negative_hits);
    let road_adjustment = road_adjustment(config, infrastructure.roads_nearby);

    let raw = i64::from(base_score) + i64::from(rating_bonus) + i64::from(infrastructure_bonus)
        - i64::from(negative_penalty)
        + i64::from(road_adjustment);

    ScoreBreakdown {
        base_score,
        rating_bonus,
        infrastructure_bonus,
        negative_penalty,
        road_adjustment,
        final_score: clamp_score(raw),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(raw: i64) -> u8 {
    raw.clamp(MIN_SCORE, MAX_SCORE) as u8
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
