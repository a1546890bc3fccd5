//! Runtime configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use hotel_safety_ai::AiSettings;
use hotel_safety_scoring::ScoringConfig;

use crate::AnalyzeError;

/// Location bias used when a request does not supply one.
pub const DEFAULT_LOCATION: &str = "@18.5654075,73.9445731,14z";

/// Default timeout for data-provider calls.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to build an [`crate::Analyzer`].
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// `SerpAPI` key; map search fails without it.
    pub serpapi_key: Option<String>,
    /// `SerpAPI` endpoint override.
    pub serpapi_base_url: Option<String>,
    /// Single Overpass endpoint replacing the embedded registry.
    pub overpass_url: Option<String>,
    /// Timeout for every data-provider call.
    pub fetch_timeout: Duration,
    /// AI provider settings.
    pub ai: AiSettings,
    /// Scoring parameters.
    pub scoring: ScoringConfig,
    /// Location bias used when a request has none.
    pub default_location: String,
}

impl AnalyzerConfig {
    /// Reads configuration from the environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SERPAPI_KEY` | none |
    /// | `SERPAPI_BASE_URL` | `https://serpapi.com/search.json` |
    /// | `OVERPASS_URL` | embedded endpoint registry |
    /// | `FETCH_TIMEOUT_SECS` | 30 |
    /// | `SCORING_CONFIG` | embedded defaults |
    /// | `DEFAULT_LOCATION` | `@18.5654075,73.9445731,14z` |
    ///
    /// AI variables are documented on [`AiSettings::from_env`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError`] if `SCORING_CONFIG` cannot be loaded or
    /// `AI_PROVIDER` is unknown.
    pub fn from_env() -> Result<Self, AnalyzeError> {
        let serpapi_key = non_empty_var("SERPAPI_KEY");
        if serpapi_key.is_none() {
            log::warn!("SERPAPI_KEY is not set; analyses will fail at the map search step");
        }

        let fetch_timeout = non_empty_var("FETCH_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map_or(DEFAULT_FETCH_TIMEOUT, Duration::from_secs);

        let scoring = match non_empty_var("SCORING_CONFIG") {
            Some(path) => ScoringConfig::from_path(&PathBuf::from(path))?,
            None => ScoringConfig::default(),
        };

        Ok(Self {
            serpapi_key,
            serpapi_base_url: non_empty_var("SERPAPI_BASE_URL"),
            overpass_url: non_empty_var("OVERPASS_URL"),
            fetch_timeout,
            ai: AiSettings::from_env()?,
            scoring,
            default_location: non_empty_var("DEFAULT_LOCATION")
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
