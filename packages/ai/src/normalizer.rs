//! Turns raw model completions into a fully populated [`AiAnalysis`].
//!
//! Models do not reliably follow the requested JSON format. Completions
//! arrive wrapped in markdown fences, surrounded by prose, or cut off
//! mid-array when the output token budget runs out. Normalization works
//! through progressively looser strategies:
//!
//! 1. Strip a fenced code block (```` ```json ```` preferred, any fence as
//!    fallback).
//! 2. Narrow to the first balanced `{...}` object (one level of nesting).
//! 3. Strict JSON parse.
//! 4. Repair: truncate at the last complete key/value boundary, close the
//!    open arrays and objects, parse again.
//! 5. Keyword heuristics over the raw text.
//!
//! Whatever object comes out is then validated field by field, so the
//! result never has missing fields. Normalization never fails.

use std::sync::LazyLock;

use hotel_safety_models::{AiAnalysis, Assessment};
use regex::Regex;
use serde_json::{Map, Value};

/// First balanced top-level object, allowing one level of nested objects.
static JSON_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").expect("valid regex")
});

/// A digit immediately followed (modulo whitespace) by a value separator
/// or closer, i.e. the end of a complete numeric value.
static NUMBER_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]\s*[,}\]]").expect("valid regex"));

/// Confidence used when the model omits it or sends something unusable.
pub const DEFAULT_CONFIDENCE: u8 = 50;

/// Fields every analysis must carry.
pub const REQUIRED_FIELDS: &[&str] = &[
    "assessment",
    "concerns",
    "positives",
    "recommendations",
    "confidence_score",
];

/// Which strategy produced the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationPath {
    /// The (fence-stripped, narrowed) completion parsed as-is.
    Parsed,
    /// The completion parsed after truncation repair.
    Repaired,
    /// No JSON could be recovered; keyword heuristics were used.
    Heuristic,
}

/// Normalizes a raw completion into an [`AiAnalysis`].
#[must_use]
pub fn normalize_completion(raw: &str) -> AiAnalysis {
    normalize_completion_with_path(raw).0
}

/// Like [`normalize_completion`], also reporting which strategy succeeded.
#[must_use]
pub fn normalize_completion_with_path(raw: &str) -> (AiAnalysis, NormalizationPath) {
    let candidate = extract_candidate(raw);

    if let Some(fields) = parse_object(candidate) {
        return (analysis_from_fields(&fields), NormalizationPath::Parsed);
    }

    log::warn!("AI response is not valid JSON, attempting repair");
    let repaired = repair_truncated_json(candidate);
    if let Some(fields) = parse_object(&repaired) {
        return (analysis_from_fields(&fields), NormalizationPath::Repaired);
    }

    log::warn!("JSON repair failed, falling back to keyword extraction");
    let fields = heuristic_fields(raw);
    (analysis_from_fields(&fields), NormalizationPath::Heuristic)
}

/// Strips code fences and narrows to the first top-level object.
fn extract_candidate(raw: &str) -> &str {
    let unfenced = strip_code_fence(raw.trim()).trim();
    JSON_OBJECT_RE
        .find(unfenced)
        .map_or(unfenced, |m| m.as_str())
}

/// Returns the interior of the first fenced block, preferring one tagged
/// `json`. An unterminated fence yields everything after it. Text without
/// fences is returned unchanged.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    const FENCE: &str = "```";
    const JSON_FENCE: &str = "```json";

    if let Some(start) = text.find(JSON_FENCE) {
        let body = &text[start + JSON_FENCE.len()..];
        return body.find(FENCE).map_or(body, |end| &body[..end]);
    }

    if let Some(start) = text.find(FENCE) {
        let body = &text[start + FENCE.len()..];
        let body = body.find(FENCE).map_or(body, |end| &body[..end]);
        return skip_language_tag(body);
    }

    text
}

/// Drops a leading language tag line such as `JSON` or `javascript` from a
/// generic fenced block.
fn skip_language_tag(body: &str) -> &str {
    match body.split_once('\n') {
        Some((first, rest))
            if !first.trim().is_empty()
                && first.trim().chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            rest
        }
        _ => body,
    }
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => Some(fields),
        Ok(other) => {
            log::debug!("AI response parsed to a non-object JSON value: {other}");
            None
        }
        Err(_) => None,
    }
}

/// Best-effort repair of JSON that was cut off mid-stream.
///
/// Truncates after the last position that ends a complete value (a closed
/// string or array followed by a separator, a closed nested object, or a
/// complete number), then appends the closers needed to balance every
/// still-open `[` and `{`, innermost first. Brackets inside string literals
/// are ignored when balancing.
#[must_use]
pub fn repair_truncated_json(json: &str) -> String {
    let truncated = last_complete_boundary(json).map_or(json, |end| &json[..end]);
    let mut repaired = truncated.trim_end().trim_end_matches(',').to_string();
    repaired.push_str(&closers_for(&repaired));
    repaired
}

/// Byte offset just past the last complete value, if any.
fn last_complete_boundary(json: &str) -> Option<usize> {
    // (pattern, bytes of the pattern to keep)
    const BOUNDARIES: &[(&str, usize)] = &[("\"],", 2), ("\"}", 2), ("],", 1), ("\",", 1)];

    let literal = BOUNDARIES
        .iter()
        .filter_map(|(pattern, keep)| json.rfind(pattern).map(|idx| idx + keep));

    let numeric = NUMBER_END_RE
        .find_iter(json)
        .last()
        .map(|m| m.start() + 1);

    literal.chain(numeric).max().filter(|end| *end > 1)
}

/// Closing characters for every unclosed `[`/`{` outside string literals.
fn closers_for(json: &str) -> String {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in json.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    stack.iter().rev().collect()
}

/// Keyword heuristics used when no JSON can be recovered.
///
/// Negative words are checked before positive ones because `"unsafe"` and
/// `"not recommended"` contain the positive words `"safe"` and
/// `"recommended"`.
fn heuristic_fields(raw: &str) -> Map<String, Value> {
    const NEGATIVE: &[&str] = &["unsafe", "dangerous", "avoid", "not recommended"];
    const POSITIVE: &[&str] = &["safe", "secure", "recommended", "family-friendly"];

    let lowered = raw.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    let (assessment, confidence) = if contains_any(NEGATIVE) {
        (Assessment::Unsafe, 65)
    } else if contains_any(POSITIVE) {
        (Assessment::Safe, 70)
    } else {
        (Assessment::Moderate, 55)
    };

    let placeholder = |present: bool, text: &str| {
        if present {
            vec![Value::String(text.to_string())]
        } else {
            Vec::new()
        }
    };

    let mut fields = Map::new();
    fields.insert("assessment".into(), Value::String(assessment.to_string()));
    fields.insert("confidence_score".into(), Value::from(confidence));
    fields.insert(
        "concerns".into(),
        Value::Array(placeholder(
            contains_any(&["concern", "negative"]),
            "Some concerns identified in reviews",
        )),
    );
    fields.insert(
        "positives".into(),
        Value::Array(placeholder(
            contains_any(&["positive", "good"]),
            "Some positive aspects noted",
        )),
    );
    fields.insert(
        "recommendations".into(),
        Value::Array(placeholder(
            contains_any(&["recommend"]),
            "Review detailed analysis for specifics",
        )),
    );
    fields
}

/// Validates a parsed object and fills every missing field with its default.
fn analysis_from_fields(fields: &Map<String, Value>) -> AiAnalysis {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|f| !fields.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        log::debug!("AI response missing fields, using defaults: {missing:?}");
    }

    AiAnalysis {
        assessment: fields
            .get("assessment")
            .map_or(Assessment::Moderate, parse_assessment),
        concerns: string_list(fields.get("concerns")),
        positives: string_list(fields.get("positives")),
        recommendations: string_list(fields.get("recommendations")),
        confidence_score: fields
            .get("confidence_score")
            .map_or(DEFAULT_CONFIDENCE, parse_confidence),
        error: None,
        details: None,
        raw_response: None,
    }
}

/// Accepts the three model-facing assessments case-insensitively; anything
/// else is treated as `Moderate`.
fn parse_assessment(value: &Value) -> Assessment {
    let Some(text) = value.as_str() else {
        return Assessment::Moderate;
    };
    match text.trim().to_lowercase().as_str() {
        "safe" => Assessment::Safe,
        "unsafe" => Assessment::Unsafe,
        "moderate" => Assessment::Moderate,
        other => {
            log::debug!("Unrecognized AI assessment '{other}', using Moderate");
            Assessment::Moderate
        }
    }
}

/// Integers and numeric strings are accepted and clamped to `0..=100`;
/// anything else becomes [`DEFAULT_CONFIDENCE`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_confidence(value: &Value) -> u8 {
    let number = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    number.map_or(DEFAULT_CONFIDENCE, |n| n.clamp(0, 100) as u8)
}

/// Collects the non-empty strings of an array. A bare string is treated as
/// a one-item list; other shapes yield an empty list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    let clean = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(clean)
            .collect(),
        Some(Value::String(s)) => clean(s).into_iter().collect(),
        _ => Vec::new(),
    }
}
