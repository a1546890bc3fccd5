#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end family-safety analysis of a venue.
//!
//! The pipeline for one request:
//!
//! 1. Map search resolves the venue and its reviews. Failure aborts the
//!    analysis.
//! 2. Social posts, forum threads and surrounding infrastructure are
//!    fetched concurrently. Each one degrades to an empty result on
//!    failure.
//! 3. The venue is scored and the AI analysis runs.
//! 4. Everything is aggregated into a [`Report`].
//!
//! An [`Analyzer`] holds only immutable configuration and HTTP client
//! handles, so one instance can serve concurrent requests.

pub mod config;

use hotel_safety_ai::providers::create_provider;
use hotel_safety_ai::{AiAnalyzer, AiError, CompletionRequest, LlmProvider, PromptOptions};
use hotel_safety_fetch::{
    EndpointRegistry, FetchError, InfrastructureFetcher, SerpApiClient, parse_location_bias,
};
use hotel_safety_models::{InfrastructureCounts, Report, ReviewRecord, VenueInfo};
use hotel_safety_report::{ReportInputs, build_report};
use hotel_safety_scoring::{SafetyScorer, ScoringConfigError};
use thiserror::Error;

pub use config::{AnalyzerConfig, DEFAULT_LOCATION};

/// Errors that abort an analysis.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The map search matched no venue.
    #[error("No place found for '{query}'")]
    VenueNotFound {
        /// The search query.
        query: String,
    },

    /// The map search itself failed.
    #[error("Map search failed: {0}")]
    MapSearch(#[source] FetchError),

    /// Scoring configuration could not be loaded.
    #[error("Scoring config error: {0}")]
    ScoringConfig(#[from] ScoringConfigError),

    /// AI provider configuration is invalid.
    #[error("AI config error: {0}")]
    Ai(#[from] AiError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Data collected from the external providers for one venue.
#[derive(Debug, Clone)]
pub struct CollectedData {
    /// The resolved venue.
    pub venue: VenueInfo,
    /// Map-provider reviews.
    pub map_reviews: Vec<ReviewRecord>,
    /// Social posts.
    pub social_reviews: Vec<ReviewRecord>,
    /// Forum threads.
    pub forum_reviews: Vec<ReviewRecord>,
    /// Nearby infrastructure.
    pub infrastructure: InfrastructureCounts,
}

impl CollectedData {
    /// All reviews in collection order: map, social, then forum.
    #[must_use]
    pub fn all_reviews(&self) -> Vec<ReviewRecord> {
        self.map_reviews
            .iter()
            .chain(&self.social_reviews)
            .chain(&self.forum_reviews)
            .cloned()
            .collect()
    }
}

/// Stand-in provider used when no AI provider could be configured; every
/// call fails so the report carries the error sentinel.
struct UnconfiguredProvider {
    model: String,
    message: String,
}

#[async_trait::async_trait]
impl LlmProvider for UnconfiguredProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, AiError> {
        Err(AiError::Provider {
            message: self.message.clone(),
            details: None,
        })
    }
}

/// Runs analyses.
pub struct Analyzer {
    serpapi: Option<SerpApiClient>,
    infrastructure: InfrastructureFetcher,
    scorer: SafetyScorer,
    ai: AiAnalyzer,
    default_location: String,
}

impl Analyzer {
    /// Builds an analyzer from configuration.
    ///
    /// A missing AI key is not fatal: the analyzer is built with a provider
    /// that always fails, so reports carry an AI error instead.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Config`] if an HTTP client cannot be built.
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalyzeError> {
        let client = hotel_safety_fetch::build_client(config.fetch_timeout).map_err(|e| {
            AnalyzeError::Config {
                message: e.to_string(),
            }
        })?;

        let serpapi = config.serpapi_key.clone().map(|key| {
            SerpApiClient::new(client.clone(), key, config.serpapi_base_url.clone())
        });

        let registry = config
            .overpass_url
            .clone()
            .map_or_else(EndpointRegistry::embedded, EndpointRegistry::single);

        let provider: Box<dyn LlmProvider> = match create_provider(&config.ai) {
            Ok(provider) => provider,
            Err(e) => {
                log::warn!("AI provider unavailable, reports will carry an AI error: {e}");
                Box::new(UnconfiguredProvider {
                    model: config.ai.model.clone(),
                    message: format!("AI provider unavailable: {e}"),
                })
            }
        };

        let limits = config.scoring.limits;
        let ai = AiAnalyzer::new(
            provider,
            PromptOptions {
                review_cap: limits.ai_prompt_review_cap,
                snippet_chars: limits.ai_review_snippet_chars,
            },
        );

        Ok(Self::with_components(
            serpapi,
            InfrastructureFetcher::new(client, registry),
            SafetyScorer::new(config.scoring.clone()),
            ai,
            config.default_location.clone(),
        ))
    }

    /// Builds an analyzer from already-constructed components.
    #[must_use]
    pub const fn with_components(
        serpapi: Option<SerpApiClient>,
        infrastructure: InfrastructureFetcher,
        scorer: SafetyScorer,
        ai: AiAnalyzer,
        default_location: String,
    ) -> Self {
        Self {
            serpapi,
            infrastructure,
            scorer,
            ai,
            default_location,
        }
    }

    /// Builds an analyzer from the environment.
    ///
    /// # Errors
    ///
    /// See [`AnalyzerConfig::from_env`] and [`Analyzer::new`].
    pub fn from_env() -> Result<Self, AnalyzeError> {
        Self::new(&AnalyzerConfig::from_env()?)
    }

    /// Model identifier recorded in reports.
    #[must_use]
    pub fn ai_model(&self) -> &str {
        self.ai.model()
    }

    /// Location bias used when a request has none.
    #[must_use]
    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    /// Analyzes the venue matching `query`.
    ///
    /// `location_bias` (`@lat,lng,zoomz`) steers the map search; `None`
    /// uses the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::MapSearch`] if the map search fails and
    /// [`AnalyzeError::VenueNotFound`] if it matches nothing. Every later
    /// failure degrades the report instead.
    pub async fn run(
        &self,
        query: &str,
        location_bias: Option<&str>,
    ) -> Result<Report, AnalyzeError> {
        let data = self.collect(query, location_bias).await?;
        Ok(self.evaluate(&data).await)
    }

    /// Fetches everything about the venue matching `query`.
    ///
    /// # Errors
    ///
    /// See [`Analyzer::run`].
    pub async fn collect(
        &self,
        query: &str,
        location_bias: Option<&str>,
    ) -> Result<CollectedData, AnalyzeError> {
        let serpapi = self.serpapi.as_ref().ok_or_else(|| AnalyzeError::Config {
            message: "SERPAPI_KEY environment variable not set".to_string(),
        })?;
        let location = location_bias.unwrap_or(&self.default_location);
        let limits = self.scorer.config().limits;

        log::info!("Searching for '{query}' near '{location}'");
        let map = serpapi
            .search_place(query, Some(location), limits.max_reviews_to_analyze)
            .await
            .map_err(AnalyzeError::MapSearch)?;
        let venue = map.venue.ok_or_else(|| AnalyzeError::VenueNotFound {
            query: query.to_string(),
        })?;

        let center = venue
            .coordinates
            .or_else(|| parse_location_bias(location));

        let (social, forum, infrastructure) = futures::join!(
            serpapi.search_social(&venue.name, limits.max_tweets),
            serpapi.search_forum(&venue.name, limits.max_reddit_posts),
            self.infrastructure.fetch_or_default(center),
        );

        let social_reviews = social.unwrap_or_else(|e| {
            log::warn!("Could not fetch social posts: {e}");
            Vec::new()
        });
        let forum_reviews = forum.unwrap_or_else(|e| {
            log::warn!("Could not fetch forum threads: {e}");
            Vec::new()
        });

        log::info!(
            "Collected {} map reviews, {} social posts, {} forum threads",
            map.reviews.len(),
            social_reviews.len(),
            forum_reviews.len()
        );

        Ok(CollectedData {
            venue,
            map_reviews: map.reviews,
            social_reviews,
            forum_reviews,
            infrastructure,
        })
    }

    /// Scores collected data, runs the AI analysis and builds the report.
    pub async fn evaluate(&self, data: &CollectedData) -> Report {
        let reviews = data.all_reviews();
        let scored = self
            .scorer
            .score(data.venue.rating, &reviews, &data.infrastructure);
        log::info!(
            "Safety score for '{}': {}/100 ({})",
            data.venue.name,
            scored.score(),
            scored.verdict
        );

        let ai_analysis = self
            .ai
            .analyze(&data.venue, &reviews, &data.infrastructure)
            .await;
        if ai_analysis.is_failure() {
            log::warn!(
                "AI analysis encountered an issue: {}",
                ai_analysis
                    .error
                    .as_deref()
                    .unwrap_or(ai_analysis.assessment.as_ref())
            );
        }

        build_report(ReportInputs {
            venue: &data.venue,
            reviews: &reviews,
            infrastructure: &data.infrastructure,
            breakdown: &scored.breakdown,
            verdict: scored.verdict,
            negative_hits: scored.negative_hits,
            ai_analysis: &ai_analysis,
            ai_model: self.ai.model(),
            review_cap: self.scorer.config().limits.report_review_cap,
        })
    }
}

#[cfg(test)]
mod tests {
    use hotel_safety_ai::providers::{AiSettings, DEFAULT_TIMEOUT, ProviderKind};
    use hotel_safety_models::{Assessment, ReviewSource, Verdict};
    use hotel_safety_scoring::ScoringConfig;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    use super::*;

    struct FixedProvider(&'static str);

    #[async_trait::async_trait]
    impl LlmProvider for FixedProvider {
        fn model(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    fn analyzer(reply: &'static str) -> Analyzer {
        Analyzer::with_components(
            None,
            InfrastructureFetcher::new(
                hotel_safety_fetch::build_client(std::time::Duration::from_secs(1)).unwrap(),
                EndpointRegistry::new(Vec::new()),
            ),
            SafetyScorer::default(),
            AiAnalyzer::new(Box::new(FixedProvider(reply)), PromptOptions::default()),
            DEFAULT_LOCATION.to_string(),
        )
    }

    fn data() -> CollectedData {
        CollectedData {
            venue: VenueInfo {
                name: "Radisson Blu".to_string(),
                address: Some("Kharadi, Pune".to_string()),
                rating: 4.5,
                total_reviews: 9000,
                coordinates: None,
                types: vec!["Hotel".to_string()],
            },
            map_reviews: (0..18)
                .map(|i| ReviewRecord::new(ReviewSource::MapProvider, format!("Great stay {i}")))
                .collect(),
            social_reviews: vec![ReviewRecord::new(
                ReviewSource::SocialProvider,
                "Found a cockroach in the room",
            )],
            forum_reviews: vec![
                ReviewRecord::new(ReviewSource::ForumProvider, "Kharadi safe? - Yes, busy area"),
                ReviewRecord::new(ReviewSource::ForumProvider, "Theft at night - be careful"),
            ],
            infrastructure: InfrastructureCounts {
                street_lights: 12,
                police_stations: 1,
                hospitals: 2,
                fire_stations: 0,
                roads_nearby: 30,
            },
        }
    }

    #[test]
    fn reviews_are_merged_in_collection_order() {
        let reviews = data().all_reviews();
        assert_eq!(reviews.len(), 21);
        assert_eq!(reviews[0].source, ReviewSource::MapProvider);
        assert_eq!(reviews[18].source, ReviewSource::SocialProvider);
        assert_eq!(reviews[20].text, "Theft at night - be careful");
    }

    #[tokio::test]
    async fn evaluate_builds_a_complete_report() {
        let analyzer = analyzer("{\"assessment\":\"Safe\",\"concerns\":[],\"positives\":[\"Lit streets\"],\"recommendations\":[],\"confidence_score\":81}");
        let report = analyzer.evaluate(&data()).await;

        // 60 + 25 + (12 + 10 + 10 + 0) - 6 + 10, clamped
        assert_eq!(report.negative_review_count, 2);
        assert_eq!(report.safety_score, 100);
        assert_eq!(report.verdict, Verdict::Safe);
        assert_eq!(report.score_breakdown.negative_penalty, 6);
        assert_eq!(report.score_breakdown.road_adjustment, 10);

        assert_eq!(report.review_sources.google_maps, 18);
        assert_eq!(report.review_sources.twitter, 1);
        assert_eq!(report.review_sources.reddit, 2);
        assert_eq!(report.review_sources.total, 21);
        assert_eq!(report.all_reviews.len(), 20);

        assert_eq!(report.ai_analysis.assessment, Assessment::Safe);
        assert_eq!(report.ai_analysis.positives, vec!["Lit streets"]);
        assert_eq!(report.analysis_metadata.ai_model, "fixed");
    }

    #[tokio::test]
    async fn missing_serpapi_key_is_fatal() {
        let err = analyzer("{}").run("Radisson", None).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::Config { .. }));
        assert!(err.to_string().contains("SERPAPI_KEY"));
    }

    #[tokio::test]
    async fn missing_ai_key_yields_error_sentinel() {
        let config = AnalyzerConfig {
            serpapi_key: None,
            serpapi_base_url: None,
            overpass_url: Some("http://127.0.0.1:9/api/interpreter".to_string()),
            fetch_timeout: std::time::Duration::from_secs(1),
            ai: AiSettings {
                kind: ProviderKind::Gemini,
                api_key: None,
                model: "gemini-2.5-flash".to_string(),
                base_url: None,
                timeout: DEFAULT_TIMEOUT,
            },
            scoring: ScoringConfig::default(),
            default_location: DEFAULT_LOCATION.to_string(),
        };
        let analyzer = Analyzer::new(&config).unwrap();
        assert_eq!(analyzer.ai_model(), "gemini-2.5-flash");

        let report = analyzer.evaluate(&data()).await;
        assert_eq!(report.ai_analysis.assessment, Assessment::Error);
        assert_eq!(report.ai_analysis.confidence_score, 0);
        assert!(
            report
                .ai_analysis
                .error
                .as_deref()
                .is_some_and(|e| e.contains("GEMINI_API_KEY"))
        );
        assert_eq!(report.safety_score, 100);
    }

    /// Serves canned provider responses on a local port. The reply is
    /// chosen from the request target (path and query). Returns the base
    /// URL.
    async fn stub_providers(respond: fn(&str) -> (u16, String)) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut reader = BufReader::new(stream);
                    let mut request_line = String::new();
                    reader.read_line(&mut request_line).await.unwrap();

                    let mut content_length = 0;
                    loop {
                        let mut line = String::new();
                        reader.read_line(&mut line).await.unwrap();
                        if line.trim().is_empty() {
                            break;
                        }
                        if let Some((name, value)) = line.split_once(':') {
                            if name.eq_ignore_ascii_case("content-length") {
                                content_length = value.trim().parse().unwrap();
                            }
                        }
                    }
                    let mut body = vec![0; content_length];
                    reader.read_exact(&mut body).await.unwrap();

                    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
                    let (status, payload) = respond(target);
                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
                        payload.len()
                    );
                    let mut stream = reader.into_inner();
                    stream.write_all(response.as_bytes()).await.unwrap();
                    stream.shutdown().await.ok();
                });
            }
        });
        format!("http://{addr}")
    }

    fn providers(target: &str) -> (u16, String) {
        if target.starts_with("/interpreter") {
            let body = serde_json::json!({
                "elements": [
                    { "type": "node", "tags": { "highway": "street_lamp" } },
                    { "type": "node", "tags": { "amenity": "hospital" } },
                    { "type": "way", "tags": { "highway": "primary" } }
                ]
            });
            (200, body.to_string())
        } else if target.contains("engine=google_maps") {
            let body = serde_json::json!({
                "place_results": {
                    "title": "Radisson Blu Pune Kharadi",
                    "rating": 4.5,
                    "reviews": 9000,
                    "gps_coordinates": { "latitude": 18.55, "longitude": 73.94 }
                },
                "user_reviews": {
                    "most_relevant": [
                        { "rating": 5, "description": "Great stay", "user": { "name": "Asha" } },
                        { "rating": 2, "description": "Saw a cockroach" }
                    ]
                }
            });
            (200, body.to_string())
        } else if target.contains("engine=twitter") {
            (500, serde_json::json!({ "error": "Internal error" }).to_string())
        } else {
            (
                200,
                serde_json::json!({ "error": "Google hasn't returned any results" }).to_string(),
            )
        }
    }

    fn analyzer_against(base: &str) -> Analyzer {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        Analyzer::with_components(
            Some(SerpApiClient::new(
                client.clone(),
                "test-key".to_string(),
                Some(format!("{base}/search.json")),
            )),
            InfrastructureFetcher::new(client, EndpointRegistry::single(format!("{base}/interpreter"))),
            SafetyScorer::default(),
            AiAnalyzer::new(
                Box::new(FixedProvider("{\"assessment\":\"Moderate\",\"confidence_score\":60}")),
                PromptOptions::default(),
            ),
            DEFAULT_LOCATION.to_string(),
        )
    }

    #[tokio::test]
    async fn failing_social_and_forum_searches_degrade_to_empty() {
        let base = stub_providers(providers).await;
        let analyzer = analyzer_against(&base);

        let data = analyzer.collect("Radisson Blu", None).await.unwrap();
        assert_eq!(data.venue.name, "Radisson Blu Pune Kharadi");
        assert_eq!(data.map_reviews.len(), 2);
        assert!(data.social_reviews.is_empty());
        assert!(data.forum_reviews.is_empty());
        assert_eq!(
            data.infrastructure,
            InfrastructureCounts {
                street_lights: 1,
                police_stations: 0,
                hospitals: 1,
                fire_stations: 0,
                roads_nearby: 1,
            }
        );

        let report = analyzer.run("Radisson Blu", None).await.unwrap();
        assert_eq!(report.review_sources.google_maps, 2);
        assert_eq!(report.review_sources.twitter, 0);
        assert_eq!(report.review_sources.reddit, 0);
        assert_eq!(report.negative_review_count, 1);
        assert_eq!(report.ai_analysis.assessment, Assessment::Moderate);
    }

    #[tokio::test]
    async fn unmatched_venue_aborts() {
        let base = stub_providers(|_| (200, serde_json::json!({}).to_string())).await;
        let err = analyzer_against(&base)
            .run("Nowhere Inn", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::VenueNotFound { .. }));
    }
}
