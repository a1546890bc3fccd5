//! Prompt and response schema for the family-safety analysis.

use std::fmt::Write as _;

use hotel_safety_models::{InfrastructureCounts, ReviewRecord, VenueInfo};
use serde_json::json;

use crate::normalizer::REQUIRED_FIELDS;

/// How much review text goes into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptOptions {
    /// Maximum reviews (in collection order) included.
    pub review_cap: usize,
    /// Maximum characters of each review included.
    pub snippet_chars: usize,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            review_cap: 15,
            snippet_chars: 150,
        }
    }
}

/// Returns at most `max_chars` characters of `text`, never splitting a
/// UTF-8 sequence.
#[must_use]
pub fn snippet(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

/// One prompt line per review: `[source] rating/5 - text`.
#[must_use]
pub fn review_lines(reviews: &[ReviewRecord], options: PromptOptions) -> String {
    let mut lines = String::new();
    for review in reviews.iter().take(options.review_cap) {
        if !lines.is_empty() {
            lines.push('\n');
        }
        let rating = review
            .rating
            .map_or_else(|| "N/A".to_string(), |r| r.to_string());
        let _ = write!(
            lines,
            "[{}] {rating}/5 - {}",
            review.source,
            snippet(&review.text, options.snippet_chars)
        );
    }
    lines
}

/// Builds the analysis prompt.
#[must_use]
pub fn build_prompt(
    venue: &VenueInfo,
    reviews: &[ReviewRecord],
    infrastructure: &InfrastructureCounts,
    options: PromptOptions,
) -> String {
    let review_text = review_lines(reviews, options);
    let review_text = if review_text.is_empty() {
        "No reviews available"
    } else {
        review_text.as_str()
    };

    format!(
        "Analyze this hotel's safety for families:

Hotel: {name}
Location: {location}
Google Rating: {rating}/5 ({total} reviews)
Nearby: {hospitals} hospitals, {police} police stations

Reviews:
{review_text}

Based on the above, provide a JSON response with these exact keys:
- assessment: either \"Safe\", \"Moderate\", or \"Unsafe\"
- concerns: array of 2-3 safety concerns (or empty array if none)
- positives: array of 2-3 positive safety aspects
- recommendations: array of 2-3 tips for families
- confidence_score: number 0-100 based on data quality

Respond with ONLY the JSON object, no explanation or markdown.",
        name = venue.name,
        location = venue.address.as_deref().unwrap_or("Unknown Location"),
        rating = venue.rating,
        total = venue.total_reviews,
        hospitals = infrastructure.hospitals,
        police = infrastructure.police_stations,
    )
}

/// JSON schema describing the expected analysis object.
#[must_use]
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "assessment": {
                "type": "string",
                "enum": ["Safe", "Moderate", "Unsafe"]
            },
            "concerns": { "type": "array", "items": { "type": "string" } },
            "positives": { "type": "array", "items": { "type": "string" } },
            "recommendations": { "type": "array", "items": { "type": "string" } },
            "confidence_score": { "type": "integer" }
        },
        "required": REQUIRED_FIELDS
    })
}

#[cfg(test)]
mod tests {
    use hotel_safety_models::ReviewSource;

    use super::*;

    fn venue() -> VenueInfo {
        VenueInfo {
            name: "Hotel Lotus".to_string(),
            address: Some("MG Road, Pune".to_string()),
            rating: 4.2,
            total_reviews: 812,
            coordinates: None,
            types: vec!["lodging".to_string()],
        }
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        assert_eq!(snippet("héllo wörld", 4), "héll");
        assert_eq!(snippet("short", 150), "short");
        assert_eq!(snippet("", 3), "");
    }

    #[test]
    fn review_lines_cap_and_format() {
        let mut reviews: Vec<ReviewRecord> = (0..20)
            .map(|i| ReviewRecord::new(ReviewSource::MapProvider, format!("review {i}")))
            .collect();
        reviews[0].rating = Some(5.0);
        reviews[1].source = ReviewSource::ForumProvider;

        let lines = review_lines(&reviews, PromptOptions::default());
        let lines: Vec<&str> = lines.lines().collect();
        assert_eq!(lines.len(), 15);
        assert_eq!(lines[0], "[Google Maps] 5/5 - review 0");
        assert_eq!(lines[1], "[Reddit] N/A/5 - review 1");
    }

    #[test]
    fn prompt_mentions_venue_and_placeholder() {
        let infra = InfrastructureCounts {
            hospitals: 2,
            police_stations: 1,
            ..InfrastructureCounts::default()
        };
        let prompt = build_prompt(&venue(), &[], &infra, PromptOptions::default());
        assert!(prompt.contains("Hotel: Hotel Lotus"));
        assert!(prompt.contains("Location: MG Road, Pune"));
        assert!(prompt.contains("Google Rating: 4.2/5 (812 reviews)"));
        assert!(prompt.contains("Nearby: 2 hospitals, 1 police stations"));
        assert!(prompt.contains("No reviews available"));
    }

    #[test]
    fn schema_requires_every_field() {
        let schema = response_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 5);
        assert_eq!(schema["properties"]["assessment"]["enum"][2], "Unsafe");
    }
}
