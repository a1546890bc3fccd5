//! Compile-time registry of Overpass API endpoints.
//!
//! Each endpoint is defined in a TOML file under `services/`. The registry
//! embeds these at compile time; [`EndpointRegistry::embedded`] exposes the
//! enabled ones in priority order.

use serde::Deserialize;

/// An Overpass endpoint configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OverpassEndpoint {
    /// Unique identifier (e.g., `"overpass_de"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this endpoint is tried at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Try order; lower values run first.
    pub priority: u32,
    /// Interpreter URL.
    pub url: String,
}

const fn default_true() -> bool {
    true
}

const ENDPOINT_TOMLS: &[(&str, &str)] = &[
    ("overpass_de", include_str!("../services/overpass_de.toml")),
    ("kumi", include_str!("../services/kumi.toml")),
    ("private_coffee", include_str!("../services/private_coffee.toml")),
];

#[cfg(test)]
const EXPECTED_ENDPOINT_COUNT: usize = 3;

/// Returns every embedded endpoint (enabled and disabled).
///
/// # Panics
///
/// Panics if any embedded TOML config is malformed.
#[must_use]
pub fn all_endpoints() -> Vec<OverpassEndpoint> {
    ENDPOINT_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse Overpass endpoint '{name}': {e}"))
        })
        .collect()
}

/// Ordered list of endpoints to try for infrastructure queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRegistry {
    endpoints: Vec<OverpassEndpoint>,
}

impl EndpointRegistry {
    /// Builds a registry from `endpoints`, keeping only enabled ones sorted
    /// by priority. Ties keep their input order.
    #[must_use]
    pub fn new(endpoints: Vec<OverpassEndpoint>) -> Self {
        let mut endpoints: Vec<OverpassEndpoint> =
            endpoints.into_iter().filter(|e| e.enabled).collect();
        endpoints.sort_by_key(|e| e.priority);
        Self { endpoints }
    }

    /// Registry of the embedded endpoints.
    #[must_use]
    pub fn embedded() -> Self {
        Self::new(all_endpoints())
    }

    /// Registry with a single endpoint, e.g. a self-hosted Overpass
    /// instance.
    #[must_use]
    pub fn single(url: impl Into<String>) -> Self {
        Self::new(vec![OverpassEndpoint {
            id: "custom".to_string(),
            name: "Custom Overpass endpoint".to_string(),
            enabled: true,
            priority: 0,
            url: url.into(),
        }])
    }

    /// Endpoints in try order.
    #[must_use]
    pub fn endpoints(&self) -> &[OverpassEndpoint] {
        &self.endpoints
    }

    /// Whether no endpoint is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::embedded()
    }
}
