//! Scoring parameters.
//!
//! The defaults are embedded from `config/scoring.toml` at compile time.
//! Deployments can override any subset of them with their own TOML file;
//! overrides are merged key-by-key over the embedded table, so a file
//! containing only `base_score = 50` changes nothing else.

use std::path::Path;

use serde::Deserialize;

use crate::ScoringConfigError;

const DEFAULT_TOML: &str = include_str!("../config/scoring.toml");

/// Immutable scoring configuration passed to the calculator and matcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoringConfig {
    /// Starting score before any adjustment.
    pub base_score: i32,
    /// Rating tier bonuses.
    pub rating_weights: RatingWeights,
    /// Points per infrastructure item.
    pub infrastructure_weights: InfrastructureWeights,
    /// Maximum contribution per infrastructure category.
    pub caps: InfrastructureCaps,
    /// Points deducted per review containing a negative keyword.
    pub negative_review_penalty_per_hit: i32,
    /// Upper bound on the total negative-review penalty.
    pub max_negative_review_penalty: i32,
    /// Road density adjustment band.
    pub road_density: RoadDensity,
    /// Case-insensitive substrings that flag a review as negative.
    pub negative_keywords: Vec<String>,
    /// Collection and embedding limits.
    pub limits: ReviewLimits,
}

/// Bonus applied for each rating tier. `poor` may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RatingWeights {
    /// Rating of 4 or more.
    pub excellent: i32,
    /// Rating of 3 or more.
    pub good: i32,
    /// Rating below 3 (including absent ratings).
    pub poor: i32,
}

/// Points awarded per counted item of each infrastructure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct InfrastructureWeights {
    /// Per street lamp.
    pub street_light: i32,
    /// Per police station.
    pub police_station: i32,
    /// Per hospital.
    pub hospital: i32,
    /// Per fire station.
    pub fire_station: i32,
}

/// Maximum points each infrastructure category can contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct InfrastructureCaps {
    /// Street lamp cap.
    pub street_light: i32,
    /// Police station cap.
    pub police_station: i32,
    /// Hospital cap.
    pub hospital: i32,
    /// Fire station cap.
    pub fire_station: i32,
}

/// Road count thresholds used as a crowd proxy.
///
/// Counts strictly above `high_threshold` add `adjustment`; counts strictly
/// below `low_threshold` subtract it. Counts inside the band are neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RoadDensity {
    /// Busy-area threshold (exclusive).
    pub high_threshold: u32,
    /// Isolated-area threshold (exclusive).
    pub low_threshold: u32,
    /// Magnitude of the adjustment.
    pub adjustment: i32,
}

/// Caps on how many reviews are collected, sent to the model and embedded
/// in the report. The prompt cap and the report cap are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReviewLimits {
    /// Reviews kept from the map-search provider.
    pub max_reviews_to_analyze: usize,
    /// Posts kept from the social provider.
    pub max_tweets: usize,
    /// Threads kept from the forum provider.
    pub max_reddit_posts: usize,
    /// Reviews (across sources, in collection order) included in the AI prompt.
    pub ai_prompt_review_cap: usize,
    /// Characters of each review included in the AI prompt.
    pub ai_review_snippet_chars: usize,
    /// Reviews embedded in the report.
    pub report_review_cap: usize,
}

impl Default for ScoringConfig {
    /// Returns the embedded defaults.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. The file is compiled into
    /// the binary, so this is caught by the test suite.
    fn default() -> Self {
        toml::de::from_str(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded scoring config: {e}"))
    }
}

impl ScoringConfig {
    /// Parses a TOML document and merges it over the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringConfigError`] if either document fails to parse,
    /// the merged table does not describe a complete configuration, or the
    /// result fails [`ScoringConfig::validate`].
    pub fn from_toml_str(overrides: &str) -> Result<Self, ScoringConfigError> {
        let mut merged: toml::Table = toml::de::from_str(DEFAULT_TOML)?;
        let overrides: toml::Table = toml::de::from_str(overrides)?;
        merge_tables(&mut merged, overrides);

        let config: Self = toml::Value::Table(merged).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML override file and merges it over the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringConfigError`] if the file cannot be read or
    /// [`ScoringConfig::from_toml_str`] fails.
    pub fn from_path(path: &Path) -> Result<Self, ScoringConfigError> {
        log::info!("Loading scoring overrides from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks the invariants the calculator relies on.
    ///
    /// Infrastructure weights and caps, the per-hit penalty and its cap must
    /// be non-negative so every contribution keeps its documented sign.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringConfigError::Invalid`] naming the first offending
    /// parameter.
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        let non_negative = [
            ("infrastructure_weights.street_light", self.infrastructure_weights.street_light),
            ("infrastructure_weights.police_station", self.infrastructure_weights.police_station),
            ("infrastructure_weights.hospital", self.infrastructure_weights.hospital),
            ("infrastructure_weights.fire_station", self.infrastructure_weights.fire_station),
            ("caps.street_light", self.caps.street_light),
            ("caps.police_station", self.caps.police_station),
            ("caps.hospital", self.caps.hospital),
            ("caps.fire_station", self.caps.fire_station),
            ("negative_review_penalty_per_hit", self.negative_review_penalty_per_hit),
            ("max_negative_review_penalty", self.max_negative_review_penalty),
            ("road_density.adjustment", self.road_density.adjustment),
        ];

        if let Some((name, value)) = non_negative.iter().find(|(_, value)| *value < 0) {
            return Err(ScoringConfigError::Invalid {
                message: format!("{name} must be non-negative, got {value}"),
            });
        }

        if self.road_density.low_threshold > self.road_density.high_threshold {
            return Err(ScoringConfigError::Invalid {
                message: format!(
                    "road_density.low_threshold ({}) exceeds high_threshold ({})",
                    self.road_density.low_threshold, self.road_density.high_threshold
                ),
            });
        }

        Ok(())
    }
}

/// Recursively overlays `overrides` onto `base`. Nested tables merge;
/// every other value (including arrays) replaces the base value.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
