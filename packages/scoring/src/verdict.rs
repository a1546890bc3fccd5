//! Score to verdict mapping.

use hotel_safety_models::Verdict;

/// Lowest score (inclusive) that is considered safe for a family stay.
pub const SAFE_THRESHOLD: u8 = 75;
/// Lowest score (inclusive) that is considered moderately safe.
pub const MODERATE_THRESHOLD: u8 = 50;

/// Maps a score to its verdict. Thresholds are inclusive lower bounds
/// checked from high to low.
#[must_use]
pub const fn verdict_for(score: u8) -> Verdict {
    if score >= SAFE_THRESHOLD {
        Verdict::Safe
    } else if score >= MODERATE_THRESHOLD {
        Verdict::ModeratelySafe
    } else {
        Verdict::NotRecommended
    }
}
