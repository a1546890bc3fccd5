#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data model for the hotel safety analyzer.
//!
//! Every type here is created fresh per analysis run and never mutated
//! afterwards. Provider-specific response shapes live next to the fetchers;
//! by the time data reaches these types all defaulting has been applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Latitude/longitude pair (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// The venue being analyzed, as resolved by the map-search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueInfo {
    /// Display name of the venue.
    pub name: String,
    /// Street address, if the provider returned one.
    pub address: Option<String>,
    /// Average rating on a 0-5 scale. Absent ratings are stored as `0.0`.
    pub rating: f64,
    /// Number of reviews the provider reports for the venue.
    pub total_reviews: u64,
    /// Location of the venue, when known.
    pub coordinates: Option<Coordinates>,
    /// Category tags (e.g. `"Hotel"`, `"Resort hotel"`).
    pub types: Vec<String>,
}

/// Where a review came from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ReviewSource {
    /// Reviews attached to the map-search place result.
    #[serde(rename = "Google Maps")]
    #[strum(serialize = "Google Maps")]
    MapProvider,
    /// Posts from the social network search.
    #[serde(rename = "Twitter/X")]
    #[strum(serialize = "Twitter/X")]
    SocialProvider,
    /// Threads from the discussion forum search.
    #[serde(rename = "Reddit")]
    #[strum(serialize = "Reddit")]
    ForumProvider,
}

impl ReviewSource {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::MapProvider, Self::SocialProvider, Self::ForumProvider]
    }
}

/// A single piece of free-text feedback about the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Provider the review was collected from.
    pub source: ReviewSource,
    /// Review body. Empty when the provider returned no text.
    pub text: String,
    /// Star rating given by the reviewer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Reviewer display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Provider-formatted date string (e.g. `"2 weeks ago"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Permalink to the original post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ReviewRecord {
    /// Creates a review with only a source and text.
    #[must_use]
    pub fn new(source: ReviewSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
            rating: None,
            author: None,
            date: None,
            link: None,
        }
    }
}

/// Nearby infrastructure tallies from the geodata provider.
///
/// All counters default to zero when the provider is unavailable. Scoring
/// does not distinguish "zero found" from "not fetched".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfrastructureCounts {
    /// Street lamps within the lighting radius.
    pub street_lights: u32,
    /// Police stations within the services radius.
    pub police_stations: u32,
    /// Hospitals within the services radius.
    pub hospitals: u32,
    /// Fire stations within the services radius.
    pub fire_stations: u32,
    /// Road segments within the lighting radius (crowd proxy).
    pub roads_nearby: u32,
}

/// Itemized components of a safety score.
///
/// `final_score` is always
/// `clamp(base_score + rating_bonus + infrastructure_bonus - negative_penalty + road_adjustment, 0, 100)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Starting score before any adjustment.
    pub base_score: i32,
    /// Bonus (or malus) from the venue's rating tier.
    pub rating_bonus: i32,
    /// Sum of the capped per-category infrastructure contributions.
    pub infrastructure_bonus: i32,
    /// Capped penalty for reviews containing negative keywords.
    pub negative_penalty: i32,
    /// Road density adjustment (positive for busy areas, negative for isolated ones).
    pub road_adjustment: i32,
    /// Clamped total in `0..=100`.
    pub final_score: u8,
}

/// Categorical verdict derived from the numeric score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Verdict {
    /// Score of 75 or more.
    #[serde(rename = "SAFE for family stay")]
    #[strum(serialize = "SAFE for family stay")]
    Safe,
    /// Score between 50 and 74.
    #[serde(rename = "MODERATELY SAFE")]
    #[strum(serialize = "MODERATELY SAFE")]
    ModeratelySafe,
    /// Score below 50.
    #[serde(rename = "NOT RECOMMENDED")]
    #[strum(serialize = "NOT RECOMMENDED")]
    NotRecommended,
}

/// Overall assessment reported by the AI analysis.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Assessment {
    /// The model considers the venue safe for families.
    Safe,
    /// Mixed or insufficient signals.
    Moderate,
    /// The model considers the venue unsafe for families.
    Unsafe,
    /// The call to the model provider failed.
    Error,
    /// The provider answered but no completion text could be extracted.
    #[serde(rename = "Unable to parse")]
    #[strum(serialize = "Unable to parse")]
    UnableToParse,
}

impl Assessment {
    /// Whether this assessment is one of the failure sentinels rather than a
    /// judgement about the venue.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Error | Self::UnableToParse)
    }
}

/// Structured qualitative summary produced from a model completion.
///
/// Every field is always populated; missing values are defaulted during
/// normalization so consumers never branch on presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAnalysis {
    /// Overall assessment.
    pub assessment: Assessment,
    /// Safety concerns, in model order.
    pub concerns: Vec<String>,
    /// Positive safety aspects, in model order.
    pub positives: Vec<String>,
    /// Tips for families.
    pub recommendations: Vec<String>,
    /// Confidence in `0..=100`.
    pub confidence_score: u8,
    /// Transport error message, set only for [`Assessment::Error`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Provider response body accompanying a transport error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Truncated raw provider body, set only for [`Assessment::UnableToParse`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl AiAnalysis {
    /// Builds the sentinel returned when the model provider call itself fails.
    #[must_use]
    pub fn transport_error(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            assessment: Assessment::Error,
            concerns: Vec::new(),
            positives: Vec::new(),
            recommendations: Vec::new(),
            confidence_score: 0,
            error: Some(error.into()),
            details,
            raw_response: None,
        }
    }

    /// Builds the sentinel returned when a successful provider response
    /// carried no extractable completion.
    #[must_use]
    pub fn unparseable(raw_response: impl Into<String>) -> Self {
        Self {
            assessment: Assessment::UnableToParse,
            concerns: Vec::new(),
            positives: Vec::new(),
            recommendations: Vec::new(),
            confidence_score: 0,
            error: None,
            details: None,
            raw_response: Some(raw_response.into()),
        }
    }

    /// Whether the AI step failed rather than producing an assessment.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.assessment.is_failure()
    }
}

/// Per-source review counts embedded in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSourceCounts {
    /// Reviews from the map-search provider.
    pub google_maps: usize,
    /// Posts from the social provider.
    pub twitter: usize,
    /// Threads from the forum provider.
    pub reddit: usize,
    /// All reviews collected, before the report sample cap.
    pub total: usize,
}

/// Provenance information attached to each report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Report format version.
    pub version: String,
    /// Identifier of the model used for the AI step.
    pub ai_model: String,
    /// Human-readable names of the data sources consulted.
    pub data_sources: Vec<String>,
}

/// The complete safety report for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Venue metadata.
    pub hotel_info: VenueInfo,
    /// Final clamped score.
    pub safety_score: u8,
    /// Verdict derived from `safety_score`.
    pub verdict: Verdict,
    /// Itemized score components.
    pub score_breakdown: ScoreBreakdown,
    /// Nearby infrastructure counts.
    pub infrastructure: InfrastructureCounts,
    /// Review counts per source.
    pub review_sources: ReviewSourceCounts,
    /// Reviews containing at least one negative keyword.
    pub negative_review_count: usize,
    /// Normalized AI analysis.
    pub ai_analysis: AiAnalysis,
    /// Capped sample of the collected reviews.
    pub all_reviews: Vec<ReviewRecord>,
    /// When the report was generated (ISO 8601).
    pub generated_at: DateTime<Utc>,
    /// Provenance information.
    pub analysis_metadata: AnalysisMetadata,
}
