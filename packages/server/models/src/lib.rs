#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the hotel safety server.
//!
//! The analysis endpoint returns the report type from
//! `hotel_safety_models` unchanged; only the envelope types live here.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/analyze`.
///
/// Both fields are optional on the wire so a missing name yields a 400
/// with a readable message rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Free-text venue query.
    pub hotel_name: Option<String>,
    /// Location bias in `@lat,lng,zoomz` form.
    pub location: Option<String>,
}

impl AnalyzeRequest {
    /// The venue query, if present and not blank.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.hotel_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Error body returned by failing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Wraps a message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Body of the unprefixed `GET /health` liveness probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStatus {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
}

impl ApiStatus {
    /// The healthy status body.
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}
