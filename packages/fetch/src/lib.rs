#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! External data collection for venue safety analysis.
//!
//! - [`serpapi`]: venue lookup and reviews via the `SerpAPI` `google_maps`
//!   engine, social posts via the `twitter` engine, and forum threads via
//!   the `google` engine restricted to `site:reddit.com`.
//! - [`overpass`]: counts of street lamps, police stations, hospitals, fire
//!   stations and roads around the venue from `OpenStreetMap`, tried
//!   against the Overpass endpoints in the [`endpoint_registry`] in
//!   priority order.
//! - [`location`]: coordinate parsing for `@lat,lng,zoomz` location bias
//!   strings.
//!
//! Provider payloads are deserialized into permissive optional record
//! shapes and defaulted once when converted into the shared models.

pub mod endpoint_registry;
pub mod location;
pub mod overpass;
pub mod serpapi;

use std::time::Duration;

use thiserror::Error;

pub use endpoint_registry::{EndpointRegistry, OverpassEndpoint};
pub use location::parse_location_bias;
pub use overpass::InfrastructureFetcher;
pub use serpapi::{MapSearchResult, SerpApiClient};

/// Default per-request timeout for provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from fetching external data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider returned an error status or an error payload.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Every configured endpoint failed.
    #[error("All {attempts} endpoints failed")]
    AllEndpointsFailed {
        /// Number of endpoints tried.
        attempts: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Builds the shared HTTP client used by every fetcher.
///
/// # Errors
///
/// Returns [`FetchError::Config`] if the TLS backend cannot be
/// initialized.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("hotel-safety/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FetchError::Config {
            message: format!("Failed to build HTTP client: {e}"),
        })
}
