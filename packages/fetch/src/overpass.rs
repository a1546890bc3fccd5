//! Surrounding-infrastructure counts from the `OpenStreetMap` Overpass API.
//!
//! One query collects street lamps and highway ways within 800 m and
//! police stations, hospitals and fire stations within 1500 m of the venue.
//! Endpoints from the [`EndpointRegistry`] are tried in priority order
//! until one returns a parseable response.
//!
//! See <https://wiki.openstreetmap.org/wiki/Overpass_API>

use std::collections::BTreeMap;

use hotel_safety_models::{Coordinates, InfrastructureCounts};
use serde::Deserialize;

use crate::{EndpointRegistry, FetchError};

/// Search radius for street lamps and roads, in meters.
pub const NEAR_RADIUS_M: u32 = 800;
/// Search radius for emergency services, in meters.
pub const SERVICE_RADIUS_M: u32 = 1500;

/// Overpass JSON response.
#[derive(Debug, Default, Deserialize)]
pub struct OverpassResponse {
    /// Matched nodes and ways.
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// A single node or way. Only the tags are used.
#[derive(Debug, Default, Deserialize)]
pub struct OverpassElement {
    /// `node`, `way` or `relation`.
    #[serde(rename = "type", default)]
    pub element_type: String,
    /// OSM tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Infrastructure category of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfrastructureKind {
    /// `highway=street_lamp`.
    StreetLight,
    /// `amenity=police`.
    PoliceStation,
    /// `amenity=hospital`.
    Hospital,
    /// `emergency=fire_station`.
    FireStation,
    /// Any other `highway` tag.
    Road,
}

/// Builds the Overpass QL query for `center`.
#[must_use]
pub fn build_query(center: Coordinates) -> String {
    let Coordinates {
        latitude: lat,
        longitude: lon,
    } = center;
    format!(
        "[out:json];
(
  node[\"highway\"=\"street_lamp\"](around:{NEAR_RADIUS_M},{lat},{lon});
  node[\"amenity\"=\"police\"](around:{SERVICE_RADIUS_M},{lat},{lon});
  node[\"amenity\"=\"hospital\"](around:{SERVICE_RADIUS_M},{lat},{lon});
  way[\"highway\"](around:{NEAR_RADIUS_M},{lat},{lon});
  node[\"emergency\"=\"fire_station\"](around:{SERVICE_RADIUS_M},{lat},{lon});
);
out;"
    )
}

/// Classifies an element by its tags. Checks are ordered, so an element
/// matches at most one category.
#[must_use]
pub fn classify(tags: &BTreeMap<String, String>) -> Option<InfrastructureKind> {
    let tag = |key: &str| tags.get(key).map(String::as_str);

    if tag("highway") == Some("street_lamp") {
        Some(InfrastructureKind::StreetLight)
    } else if tag("amenity") == Some("police") {
        Some(InfrastructureKind::PoliceStation)
    } else if tag("amenity") == Some("hospital") {
        Some(InfrastructureKind::Hospital)
    } else if tag("emergency") == Some("fire_station") {
        Some(InfrastructureKind::FireStation)
    } else if tag("highway").is_some_and(|v| !v.is_empty()) {
        Some(InfrastructureKind::Road)
    } else {
        None
    }
}

/// Tallies classified elements.
#[must_use]
pub fn count_elements(elements: &[OverpassElement]) -> InfrastructureCounts {
    let mut counts = InfrastructureCounts::default();
    for kind in elements.iter().filter_map(|e| classify(&e.tags)) {
        let slot = match kind {
            InfrastructureKind::StreetLight => &mut counts.street_lights,
            InfrastructureKind::PoliceStation => &mut counts.police_stations,
            InfrastructureKind::Hospital => &mut counts.hospitals,
            InfrastructureKind::FireStation => &mut counts.fire_stations,
            InfrastructureKind::Road => &mut counts.roads_nearby,
        };
        *slot = slot.saturating_add(1);
    }
    counts
}

/// Parses an Overpass response body into counts.
///
/// # Errors
///
/// Returns [`FetchError::Json`] if the body is not Overpass JSON (the
/// public instances answer overload with an HTML page).
pub fn parse_counts(body: &str) -> Result<InfrastructureCounts, FetchError> {
    let response: OverpassResponse = serde_json::from_str(body)?;
    Ok(count_elements(&response.elements))
}

/// Queries Overpass endpoints for the infrastructure around a venue.
#[derive(Debug, Clone)]
pub struct InfrastructureFetcher {
    client: reqwest::Client,
    registry: EndpointRegistry,
}

impl InfrastructureFetcher {
    /// Creates a fetcher over `registry`.
    #[must_use]
    pub const fn new(client: reqwest::Client, registry: EndpointRegistry) -> Self {
        Self { client, registry }
    }

    /// Endpoints in try order.
    #[must_use]
    pub const fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Fetches counts around `center`, trying each endpoint in order.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::AllEndpointsFailed`] if no endpoint produced a
    /// parseable response.
    pub async fn fetch(&self, center: Coordinates) -> Result<InfrastructureCounts, FetchError> {
        let query = build_query(center);
        let mut attempts = 0;

        for endpoint in self.registry.endpoints() {
            attempts += 1;
            match self.query_endpoint(&endpoint.url, &query).await {
                Ok(counts) => {
                    log::info!(
                        "Infrastructure from {}: {} lamps, {} police, {} hospitals, {} fire, {} roads",
                        endpoint.id,
                        counts.street_lights,
                        counts.police_stations,
                        counts.hospitals,
                        counts.fire_stations,
                        counts.roads_nearby
                    );
                    return Ok(counts);
                }
                Err(e) => {
                    log::warn!("Overpass endpoint '{}' failed: {e}", endpoint.id);
                }
            }
        }

        Err(FetchError::AllEndpointsFailed { attempts })
    }

    /// Like [`InfrastructureFetcher::fetch`], but any failure (or a missing
    /// location) yields zero counts.
    pub async fn fetch_or_default(&self, center: Option<Coordinates>) -> InfrastructureCounts {
        let Some(center) = center else {
            log::warn!("No venue coordinates available, skipping infrastructure lookup");
            return InfrastructureCounts::default();
        };
        match self.fetch(center).await {
            Ok(counts) => counts,
            Err(e) => {
                log::warn!("Could not fetch infrastructure data: {e}");
                InfrastructureCounts::default()
            }
        }
    }

    async fn query_endpoint(
        &self,
        url: &str,
        query: &str,
    ) -> Result<InfrastructureCounts, FetchError> {
        let resp = self
            .client
            .post(url)
            .body(query.to_string())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(FetchError::Provider {
                message: format!("Overpass returned status {}", status.as_u16()),
            });
        }
        parse_counts(&body)
    }
}
