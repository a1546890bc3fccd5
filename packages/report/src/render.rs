//! Console rendering of a finished report.

use std::fmt::Write as _;

use hotel_safety_models::Report;

const RULE_WIDTH: usize = 60;

/// Maximum concerns/positives shown in the summary.
const SUMMARY_ITEMS: usize = 3;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Headline summary: venue, score, verdict, AI assessment and review
/// counts.
#[must_use]
pub fn render_summary(report: &Report) -> String {
    let venue = &report.hotel_info;
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "SAFETY ANALYSIS COMPLETED");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "Hotel: {}", venue.name);
    let _ = writeln!(
        out,
        "Location: {}",
        venue.address.as_deref().unwrap_or("Unknown")
    );
    let _ = writeln!(
        out,
        "Rating: {}/5 ({} reviews)",
        venue.rating, venue.total_reviews
    );
    let _ = writeln!(out, "Safety Score: {}/100", report.safety_score);
    let _ = writeln!(out, "Verdict: {}", report.verdict);

    let ai = &report.ai_analysis;
    if ai.is_failure() {
        let reason = ai.error.as_deref().unwrap_or("response could not be parsed");
        let _ = writeln!(out, "\nAI analysis unavailable: {reason}");
    } else {
        let _ = writeln!(out, "\nAI Assessment: {}", ai.assessment);
        let _ = writeln!(out, "AI Confidence: {}/100", ai.confidence_score);
        if !ai.concerns.is_empty() {
            let _ = writeln!(out, "Key Concerns: {}", join_first(&ai.concerns));
        }
        if !ai.positives.is_empty() {
            let _ = writeln!(out, "Positive Aspects: {}", join_first(&ai.positives));
        }
    }

    let sources = &report.review_sources;
    let _ = writeln!(out, "\nReviews Analyzed: {}", sources.total);
    let _ = writeln!(out, "   - Google Maps: {}", sources.google_maps);
    let _ = writeln!(out, "   - Twitter/X: {}", sources.twitter);
    let _ = writeln!(out, "   - Reddit: {}", sources.reddit);
    let _ = write!(out, "{}", rule());
    out
}

/// Itemized score components and infrastructure counts.
#[must_use]
pub fn render_breakdown(report: &Report) -> String {
    let b = &report.score_breakdown;
    let infra = &report.infrastructure;
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "DETAILED SCORE BREAKDOWN");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "Base Score: {}", b.base_score);
    let _ = writeln!(out, "Rating Bonus: {:+}", b.rating_bonus);
    let _ = writeln!(out, "Infrastructure Bonus: {:+}", b.infrastructure_bonus);
    let _ = writeln!(out, "Negative Reviews Penalty: -{}", b.negative_penalty);
    let _ = writeln!(out, "Road Density Adjustment: {:+}", b.road_adjustment);
    let _ = writeln!(out, "Final Score: {}", b.final_score);

    let _ = writeln!(out, "\nInfrastructure Details:");
    let _ = writeln!(out, "   - Street Lights: {}", infra.street_lights);
    let _ = writeln!(out, "   - Police Stations: {}", infra.police_stations);
    let _ = writeln!(out, "   - Hospitals: {}", infra.hospitals);
    let _ = writeln!(out, "   - Fire Stations: {}", infra.fire_stations);
    let _ = writeln!(out, "   - Roads Nearby: {}", infra.roads_nearby);
    let _ = write!(out, "{}", rule());
    out
}

fn join_first(items: &[String]) -> String {
    items
        .iter()
        .take(SUMMARY_ITEMS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use hotel_safety_models::{
        AiAnalysis, AnalysisMetadata, Assessment, InfrastructureCounts, ReviewSourceCounts,
        ScoreBreakdown, Verdict, VenueInfo,
    };

    use super::*;

    fn report(ai_analysis: AiAnalysis) -> Report {
        Report {
            hotel_info: VenueInfo {
                name: "Hotel Lotus".to_string(),
                address: None,
                rating: 3.5,
                total_reviews: 10,
                coordinates: None,
                types: Vec::new(),
            },
            safety_score: 62,
            verdict: Verdict::ModeratelySafe,
            score_breakdown: ScoreBreakdown {
                base_score: 60,
                rating_bonus: 10,
                infrastructure_bonus: 5,
                negative_penalty: 3,
                road_adjustment: -10,
                final_score: 62,
            },
            infrastructure: InfrastructureCounts {
                street_lights: 5,
                roads_nearby: 2,
                ..InfrastructureCounts::default()
            },
            review_sources: ReviewSourceCounts {
                google_maps: 3,
                twitter: 0,
                reddit: 1,
                total: 4,
            },
            negative_review_count: 1,
            ai_analysis,
            all_reviews: Vec::new(),
            generated_at: Utc::now(),
            analysis_metadata: AnalysisMetadata {
                version: "2.0".to_string(),
                ai_model: "test".to_string(),
                data_sources: Vec::new(),
            },
        }
    }

    #[test]
    fn summary_lists_top_concerns() {
        let analysis = AiAnalysis {
            assessment: Assessment::Moderate,
            concerns: vec!["a", "b", "c", "d"].into_iter().map(String::from).collect(),
            positives: Vec::new(),
            recommendations: Vec::new(),
            confidence_score: 60,
            error: None,
            details: None,
            raw_response: None,
        };
        let text = render_summary(&report(analysis));
        assert!(text.contains("Hotel: Hotel Lotus"));
        assert!(text.contains("Location: Unknown"));
        assert!(text.contains("Verdict: MODERATELY SAFE"));
        assert!(text.contains("AI Assessment: Moderate"));
        assert!(text.contains("Key Concerns: a, b, c\n"));
        assert!(!text.contains("Positive Aspects"));
        assert!(text.contains("Reviews Analyzed: 4"));
    }

    #[test]
    fn summary_reports_ai_failure() {
        let text = render_summary(&report(AiAnalysis::transport_error("timeout", None)));
        assert!(text.contains("AI analysis unavailable: timeout"));
        assert!(!text.contains("AI Assessment"));
    }

    #[test]
    fn breakdown_shows_signed_components() {
        let text = render_breakdown(&report(AiAnalysis::unparseable("")));
        assert!(text.contains("Rating Bonus: +10"));
        assert!(text.contains("Negative Reviews Penalty: -3"));
        assert!(text.contains("Road Density Adjustment: -10"));
        assert!(text.contains("Street Lights: 5"));
        assert!(text.contains("Roads Nearby: 2"));
    }
}
