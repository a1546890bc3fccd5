#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Qualitative safety analysis with a generative model.
//!
//! Builds a prompt from the venue, its surroundings and a capped sample of
//! reviews, sends it to the configured [`providers::LlmProvider`] (Gemini,
//! `OpenAI` or Anthropic, or any `OpenAI`-compatible server via
//! `AI_BASE_URL`), and turns whatever comes back into a complete
//! [`AiAnalysis`] via the [`normalizer`]. Analysis never fails: transport
//! problems become an `Error` sentinel instead.

pub mod normalizer;
pub mod prompt;
pub mod providers;

use hotel_safety_models::{AiAnalysis, InfrastructureCounts, ReviewRecord, VenueInfo};
use thiserror::Error;

pub use normalizer::{NormalizationPath, normalize_completion, normalize_completion_with_path};
pub use prompt::PromptOptions;
pub use providers::{AiSettings, CompletionRequest, LlmProvider, create_provider_from_env};

/// Sampling temperature used for the analysis.
pub const TEMPERATURE: f32 = 0.1;
/// Output token budget for the analysis.
pub const MAX_OUTPUT_TOKENS: u32 = 500;
/// Characters of an unusable completion kept in the report.
pub const RAW_RESPONSE_CHARS: usize = 500;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider returned a non-success status.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
        /// Raw response body, if any.
        details: Option<String>,
    },

    /// Provider responded successfully but without any completion text.
    #[error("Provider returned no completion text")]
    EmptyCompletion {
        /// Raw response body.
        body: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Runs the qualitative analysis against one provider.
pub struct AiAnalyzer {
    provider: Box<dyn LlmProvider>,
    options: PromptOptions,
}

impl AiAnalyzer {
    /// Creates an analyzer over `provider`.
    #[must_use]
    pub fn new(provider: Box<dyn LlmProvider>, options: PromptOptions) -> Self {
        Self { provider, options }
    }

    /// Model identifier of the underlying provider.
    #[must_use]
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Analyzes a venue. Always returns a fully populated analysis.
    ///
    /// A successful completion is normalized. A response without any text
    /// yields the `Unable to parse` sentinel; every other failure yields the
    /// `Error` sentinel carrying the error message.
    pub async fn analyze(
        &self,
        venue: &VenueInfo,
        reviews: &[ReviewRecord],
        infrastructure: &InfrastructureCounts,
    ) -> AiAnalysis {
        let request = CompletionRequest {
            prompt: prompt::build_prompt(venue, reviews, infrastructure, self.options),
            response_schema: Some(prompt::response_schema()),
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        };

        log::info!(
            "Requesting AI safety analysis for '{}' from {}",
            venue.name,
            self.provider.model()
        );

        match self.provider.complete(&request).await {
            Ok(completion) => {
                let (analysis, path) = normalize_completion_with_path(&completion);
                log::debug!("AI response normalized via {path:?}");
                analysis
            }
            Err(AiError::EmptyCompletion { body }) => {
                log::warn!("Could not extract AI completion text from response");
                AiAnalysis::unparseable(prompt::snippet(&body, RAW_RESPONSE_CHARS))
            }
            Err(AiError::Provider { message, details }) => {
                log::error!("AI provider error: {message}");
                AiAnalysis::transport_error(message, details)
            }
            Err(e) => {
                log::error!("Error in AI analysis: {e}");
                AiAnalysis::transport_error(e.to_string(), None)
            }
        }
    }
}
