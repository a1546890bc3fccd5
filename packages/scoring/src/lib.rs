#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Deterministic safety scoring for a venue.
//!
//! Turns a rating, nearby infrastructure counts and review text into a
//! bounded 0-100 score with an itemized [`ScoreBreakdown`] and a
//! [`Verdict`]. Every function here is pure: the same inputs and
//! [`ScoringConfig`] always produce the same output.

pub mod config;
pub mod keywords;
pub mod score;
pub mod verdict;

use hotel_safety_models::{InfrastructureCounts, ReviewRecord, ScoreBreakdown, Verdict};
use thiserror::Error;

pub use config::ScoringConfig;
pub use keywords::KeywordMatcher;
pub use score::{ScoreOutcome, calculate_score, score_breakdown};
pub use verdict::verdict_for;

/// Errors from loading or validating a [`ScoringConfig`].
#[derive(Debug, Error)]
pub enum ScoringConfigError {
    /// Override file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML syntax error or a value of the wrong type.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration parsed but violates an invariant.
    #[error("Invalid scoring config: {message}")]
    Invalid {
        /// Description of the violated invariant.
        message: String,
    },
}

/// Everything the scoring step produces for one venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredVenue {
    /// Itemized components; `breakdown.final_score` is the safety score.
    pub breakdown: ScoreBreakdown,
    /// Reviews that contained at least one negative keyword.
    pub negative_hits: usize,
    /// Verdict for `breakdown.final_score`.
    pub verdict: Verdict,
}

impl ScoredVenue {
    /// The clamped safety score.
    #[must_use]
    pub const fn score(&self) -> u8 {
        self.breakdown.final_score
    }
}

/// Scores venues against a fixed configuration.
#[derive(Debug, Clone)]
pub struct SafetyScorer {
    config: ScoringConfig,
    matcher: KeywordMatcher,
}

impl SafetyScorer {
    /// Creates a scorer, building the keyword matcher from the config.
    #[must_use]
    pub fn new(config: ScoringConfig) -> Self {
        let matcher = KeywordMatcher::new(&config.negative_keywords);
        Self { config, matcher }
    }

    /// The configuration this scorer was built with.
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores a venue from its rating, collected reviews and surroundings.
    #[must_use]
    pub fn score(
        &self,
        rating: f64,
        reviews: &[ReviewRecord],
        infrastructure: &InfrastructureCounts,
    ) -> ScoredVenue {
        let negative_hits = self.matcher.count_negative_reviews(reviews);
        let outcome = calculate_score(&self.config, rating, infrastructure, negative_hits);
        let breakdown = score_breakdown(&self.config, rating, infrastructure, negative_hits);
        debug_assert_eq!(outcome.score, breakdown.final_score);

        log::debug!(
            "Scored venue: {} (rating {rating}, {negative_hits} negative reviews)",
            outcome.score
        );

        ScoredVenue {
            breakdown,
            negative_hits,
            verdict: verdict_for(outcome.score),
        }
    }
}

impl Default for SafetyScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
