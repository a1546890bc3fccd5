//! LLM provider abstraction and implementations.
//!
//! Supports Google Gemini, `OpenAI` (and any `OpenAI`-compatible server via
//! `AI_BASE_URL`) and Anthropic Claude via a common single-shot completion
//! trait.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use std::time::Duration;

use crate::AiError;

/// Default request timeout for completion calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A single-prompt completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The full user prompt.
    pub prompt: String,
    /// JSON schema the response should follow, for providers that support
    /// constrained output.
    pub response_schema: Option<serde_json::Value>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output token budget.
    pub max_output_tokens: u32,
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier recorded in report metadata.
    fn model(&self) -> &str;

    /// Sends a completion request and returns the raw text of the first
    /// candidate.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Provider`] for non-success statuses,
    /// [`AiError::EmptyCompletion`] when the response carries no text, and
    /// [`AiError::Http`] for transport failures.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError>;
}

/// Which provider to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Google Gemini `generateContent`.
    Gemini,
    /// `OpenAI` chat completions.
    OpenAi,
    /// Anthropic messages.
    Anthropic,
}

impl ProviderKind {
    /// Parses a provider name as accepted by `AI_PROVIDER`.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Config`] for unknown names.
    pub fn parse(name: &str) -> Result<Self, AiError> {
        match name.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "gpt" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(AiError::Config {
                message: format!(
                    "Unknown AI provider: {other}. Use 'gemini', 'openai', or 'anthropic'."
                ),
            }),
        }
    }

    /// Environment variable holding this provider's API key.
    #[must_use]
    pub const fn api_key_var(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Model used when `AI_MODEL` is not set.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::OpenAi => "gpt-4o",
            Self::Anthropic => "claude-sonnet-4-20250514",
        }
    }
}

/// Resolved provider settings.
#[derive(Debug, Clone)]
pub struct AiSettings {
    /// Selected provider.
    pub kind: ProviderKind,
    /// API key; may be absent for local `OpenAI`-compatible servers.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Base URL override.
    pub base_url: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl AiSettings {
    /// Reads provider settings from the environment.
    ///
    /// If `AI_PROVIDER` is set, uses that provider. Otherwise auto-detects
    /// from available credentials in the order `GEMINI_API_KEY`,
    /// `ANTHROPIC_API_KEY`, `OPENAI_API_KEY`, falling back to Gemini.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Config`] if `AI_PROVIDER` names an unknown
    /// provider.
    pub fn from_env() -> Result<Self, AiError> {
        let kind = match std::env::var("AI_PROVIDER") {
            Ok(name) => ProviderKind::parse(&name)?,
            Err(_) => detect_provider(),
        };

        let api_key = std::env::var(kind.api_key_var())
            .ok()
            .filter(|k| !k.trim().is_empty());
        let model = std::env::var("AI_MODEL").unwrap_or_else(|_| kind.default_model().to_string());
        let base_url = std::env::var("AI_BASE_URL").ok().filter(|u| !u.is_empty());
        let timeout = std::env::var("AI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        Ok(Self {
            kind,
            api_key,
            model,
            base_url,
            timeout,
        })
    }
}

/// Builds the provider described by `settings`.
///
/// A missing API key is only accepted for `OpenAI` with a custom base URL
/// (local servers such as Ollama or vLLM).
///
/// # Errors
///
/// Returns [`AiError::Config`] if a required key is missing or the HTTP
/// client cannot be built.
pub fn create_provider(settings: &AiSettings) -> Result<Box<dyn LlmProvider>, AiError> {
    let client = reqwest::Client::builder()
        .timeout(settings.timeout)
        .build()
        .map_err(|e| AiError::Config {
            message: format!("Failed to build HTTP client: {e}"),
        })?;

    let require_key = || {
        settings.api_key.clone().ok_or_else(|| AiError::Config {
            message: format!(
                "{} environment variable not set",
                settings.kind.api_key_var()
            ),
        })
    };

    let model = settings.model.clone();
    let base_url = settings.base_url.clone();

    let provider: Box<dyn LlmProvider> = match settings.kind {
        ProviderKind::Gemini => Box::new(gemini::GeminiProvider::new(
            client,
            require_key()?,
            model,
            base_url,
        )),
        ProviderKind::Anthropic => Box::new(anthropic::AnthropicProvider::new(
            client,
            require_key()?,
            model,
            base_url,
        )),
        ProviderKind::OpenAi => {
            let api_key = if base_url.is_some() {
                settings.api_key.clone()
            } else {
                Some(require_key()?)
            };
            Box::new(openai::OpenAiProvider::new(client, api_key, model, base_url))
        }
    };
    Ok(provider)
}

/// Creates a provider from environment variables.
///
/// # Errors
///
/// See [`AiSettings::from_env`] and [`create_provider`].
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, AiError> {
    create_provider(&AiSettings::from_env()?)
}

/// Auto-detects which provider to use based on available credentials.
fn detect_provider() -> ProviderKind {
    for kind in [
        ProviderKind::Gemini,
        ProviderKind::Anthropic,
        ProviderKind::OpenAi,
    ] {
        if std::env::var(kind.api_key_var()).is_ok() {
            log::info!(
                "Auto-detected AI provider: {kind:?} ({} found)",
                kind.api_key_var()
            );
            return kind;
        }
    }

    if std::env::var("AI_BASE_URL").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI-compatible server (AI_BASE_URL found)");
        return ProviderKind::OpenAi;
    }

    log::warn!(
        "No AI credentials detected. Set one of: GEMINI_API_KEY, ANTHROPIC_API_KEY, \
         OPENAI_API_KEY. You can also set AI_PROVIDER explicitly."
    );
    ProviderKind::Gemini
}

/// Formats a non-success provider response into an [`AiError::Provider`].
pub(crate) fn status_error(status: reqwest::StatusCode, message: String, body: String) -> AiError {
    AiError::Provider {
        message: format!("API returned status {}: {message}", status.as_u16()),
        details: Some(body),
    }
}
