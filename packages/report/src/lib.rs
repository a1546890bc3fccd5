#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Safety report aggregation.
//!
//! [`build_report`] composes the outputs of every pipeline stage into one
//! [`Report`]. [`save_report`] persists it as JSON, and the [`render`]
//! module produces the console summary and score breakdown.

pub mod render;

use std::path::Path;

use chrono::{DateTime, Utc};
use hotel_safety_models::{
    AiAnalysis, AnalysisMetadata, InfrastructureCounts, Report, ReviewRecord, ReviewSource,
    ReviewSourceCounts, ScoreBreakdown, Verdict, VenueInfo,
};
use serde::Serialize;
use thiserror::Error;

/// Report format version.
pub const REPORT_VERSION: &str = "2.0";

/// Default output file name.
pub const DEFAULT_OUTPUT_FILE: &str = "comprehensive_safety_report.json";

/// Source names listed in report metadata.
pub const DATA_SOURCES: &[&str] = &["Google Maps", "Twitter/X", "Reddit", "OpenStreetMap"];

/// Errors from persisting a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// File could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the aggregator combines. All inputs are borrowed; the report
/// owns copies.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    /// Venue metadata.
    pub venue: &'a VenueInfo,
    /// Every collected review, in collection order.
    pub reviews: &'a [ReviewRecord],
    /// Nearby infrastructure.
    pub infrastructure: &'a InfrastructureCounts,
    /// Score components; `final_score` becomes the safety score.
    pub breakdown: &'a ScoreBreakdown,
    /// Verdict for the score.
    pub verdict: Verdict,
    /// Reviews with at least one negative keyword.
    pub negative_hits: usize,
    /// Normalized AI analysis.
    pub ai_analysis: &'a AiAnalysis,
    /// Model identifier for the metadata block.
    pub ai_model: &'a str,
    /// Maximum reviews embedded in `all_reviews`.
    pub review_cap: usize,
}

/// Per-source review counts. `total` counts every review, not just the
/// embedded sample.
#[must_use]
pub fn count_sources(reviews: &[ReviewRecord]) -> ReviewSourceCounts {
    let mut counts = ReviewSourceCounts {
        total: reviews.len(),
        ..ReviewSourceCounts::default()
    };
    for &source in ReviewSource::all() {
        let n = reviews.iter().filter(|r| r.source == source).count();
        let slot = match source {
            ReviewSource::MapProvider => &mut counts.google_maps,
            ReviewSource::SocialProvider => &mut counts.twitter,
            ReviewSource::ForumProvider => &mut counts.reddit,
        };
        *slot = n;
    }
    counts
}

/// Builds a report stamped with the current time.
#[must_use]
pub fn build_report(inputs: ReportInputs<'_>) -> Report {
    build_report_at(inputs, Utc::now())
}

/// Builds a report stamped with `generated_at`.
#[must_use]
pub fn build_report_at(inputs: ReportInputs<'_>, generated_at: DateTime<Utc>) -> Report {
    Report {
        hotel_info: inputs.venue.clone(),
        safety_score: inputs.breakdown.final_score,
        verdict: inputs.verdict,
        score_breakdown: *inputs.breakdown,
        infrastructure: *inputs.infrastructure,
        review_sources: count_sources(inputs.reviews),
        negative_review_count: inputs.negative_hits,
        ai_analysis: inputs.ai_analysis.clone(),
        all_reviews: inputs
            .reviews
            .iter()
            .take(inputs.review_cap)
            .cloned()
            .collect(),
        generated_at,
        analysis_metadata: AnalysisMetadata {
            version: REPORT_VERSION.to_string(),
            ai_model: inputs.ai_model.to_string(),
            data_sources: DATA_SOURCES.iter().map(ToString::to_string).collect(),
        },
    }
}

/// Serializes a report as four-space-indented JSON.
///
/// # Errors
///
/// Returns [`ReportError::Json`] if serialization fails.
pub fn to_pretty_json(report: &Report) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes a report to `path` as JSON and returns the number of bytes
/// written.
///
/// # Errors
///
/// Returns [`ReportError`] if serialization or the write fails.
pub fn save_report(report: &Report, path: &Path) -> Result<usize, ReportError> {
    let json = to_pretty_json(report)?;
    std::fs::write(path, &json)?;
    log::debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(json.len())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use hotel_safety_models::Assessment;

    use super::*;

    fn venue() -> VenueInfo {
        VenueInfo {
            name: "Hotel Lotus".to_string(),
            address: Some("MG Road".to_string()),
            rating: 4.1,
            total_reviews: 300,
            coordinates: None,
            types: Vec::new(),
        }
    }

    fn breakdown() -> ScoreBreakdown {
        ScoreBreakdown {
            base_score: 60,
            rating_bonus: 25,
            infrastructure_bonus: 12,
            negative_penalty: 6,
            road_adjustment: 0,
            final_score: 91,
        }
    }

    fn analysis() -> AiAnalysis {
        AiAnalysis {
            assessment: Assessment::Safe,
            concerns: vec!["Busy junction".to_string()],
            positives: vec!["Security at gate".to_string()],
            recommendations: Vec::new(),
            confidence_score: 72,
            error: None,
            details: None,
            raw_response: None,
        }
    }

    fn reviews() -> Vec<ReviewRecord> {
        let mut reviews: Vec<ReviewRecord> = (0..25)
            .map(|i| ReviewRecord::new(ReviewSource::MapProvider, format!("map {i}")))
            .collect();
        reviews.push(ReviewRecord::new(ReviewSource::SocialProvider, "tweet"));
        reviews.push(ReviewRecord::new(ReviewSource::ForumProvider, "thread - text"));
        reviews.push(ReviewRecord::new(ReviewSource::ForumProvider, "thread 2 - text"));
        reviews
    }

    fn build(reviews: &[ReviewRecord]) -> Report {
        let venue = venue();
        let infrastructure = InfrastructureCounts::default();
        let breakdown = breakdown();
        let analysis = analysis();
        build_report_at(
            ReportInputs {
                venue: &venue,
                reviews,
                infrastructure: &infrastructure,
                breakdown: &breakdown,
                verdict: Verdict::Safe,
                negative_hits: 2,
                ai_analysis: &analysis,
                ai_model: "gemini-2.5-flash",
                review_cap: 20,
            },
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn caps_embedded_reviews_but_counts_all() {
        let reviews = reviews();
        let report = build(&reviews);

        assert_eq!(report.all_reviews.len(), 20);
        assert_eq!(report.all_reviews[0].text, "map 0");
        assert_eq!(
            report.review_sources,
            ReviewSourceCounts {
                google_maps: 25,
                twitter: 1,
                reddit: 2,
                total: 28,
            }
        );
        assert_eq!(reviews.len(), 28);
    }

    #[test]
    fn score_and_metadata() {
        let report = build(&[]);
        assert_eq!(report.safety_score, 91);
        assert_eq!(report.negative_review_count, 2);
        assert_eq!(report.analysis_metadata.version, "2.0");
        assert_eq!(report.analysis_metadata.ai_model, "gemini-2.5-flash");
        assert_eq!(
            report.analysis_metadata.data_sources,
            vec!["Google Maps", "Twitter/X", "Reddit", "OpenStreetMap"]
        );
        assert!(report.all_reviews.is_empty());
        assert_eq!(report.review_sources.total, 0);
    }

    #[test]
    fn serializes_expected_keys() {
        let report = build(&reviews());
        let json = serde_json::to_value(&report).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "hotel_info",
            "safety_score",
            "verdict",
            "score_breakdown",
            "infrastructure",
            "review_sources",
            "negative_review_count",
            "ai_analysis",
            "all_reviews",
            "generated_at",
            "analysis_metadata",
        ] {
            assert!(keys.contains(&key), "missing key {key}");
        }
        assert_eq!(keys.len(), 11);
        assert_eq!(json["verdict"], "SAFE for family stay");
        assert_eq!(json["generated_at"], "2026-03-01T12:00:00Z");
        assert_eq!(json["ai_analysis"]["assessment"], "Safe");
    }

    #[test]
    fn pretty_json_uses_four_space_indent() {
        let json = to_pretty_json(&build(&[])).unwrap();
        assert!(json.starts_with("{\n    \"hotel_info\": {\n        \"name\""));
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.safety_score, 91);
    }

    #[test]
    fn save_writes_file() {
        let path = std::env::temp_dir().join(format!(
            "hotel_safety_report_test_{}.json",
            std::process::id()
        ));
        let written = save_report(&build(&reviews()), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(written, contents.len());
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["review_sources"]["total"], 28);
    }

    #[test]
    fn save_to_missing_directory_is_io_error() {
        let path = std::env::temp_dir()
            .join("hotel_safety_no_such_dir")
            .join("nested")
            .join("report.json");
        assert!(matches!(
            save_report(&build(&[]), &path),
            Err(ReportError::Io(_))
        ));
    }
}
