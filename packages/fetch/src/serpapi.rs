//! `SerpAPI` client for venue lookup, social posts and forum threads.
//!
//! See <https://serpapi.com/search-api>

use hotel_safety_models::{Coordinates, ReviewRecord, ReviewSource, VenueInfo};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::FetchError;

/// Default search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com/search.json";

/// Author recorded when a provider omits one.
const ANONYMOUS: &str = "Anonymous";

/// Map-search (`google_maps` engine) response.
#[derive(Debug, Default, Deserialize)]
pub struct MapsResponse {
    /// Set when the query resolved to a single place.
    pub place_results: Option<PlaceResult>,
    /// Set when the query matched several places.
    #[serde(default)]
    pub local_results: Vec<PlaceResult>,
    /// Reviews of the resolved place.
    pub user_reviews: Option<UserReviews>,
    /// Provider-reported error.
    pub error: Option<String>,
}

/// One place from a map search.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceResult {
    /// Display name.
    pub title: Option<String>,
    /// Average rating, 0-5.
    pub rating: Option<f64>,
    /// Total number of reviews.
    pub reviews: Option<u64>,
    /// Street address.
    pub address: Option<String>,
    /// Location.
    pub gps_coordinates: Option<GpsCoordinates>,
    /// Place categories; the provider sends either one string or a list.
    #[serde(rename = "type")]
    pub place_type: Option<OneOrMany>,
    /// Reviews nested under the place.
    pub user_reviews: Option<UserReviews>,
}

/// Provider coordinate pair.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GpsCoordinates {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

/// A value the provider sends as either a string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// A single value.
    One(String),
    /// A list of values.
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Review listing of a place.
#[derive(Debug, Default, Deserialize)]
pub struct UserReviews {
    /// Reviews in the provider's relevance order.
    #[serde(default)]
    pub most_relevant: Vec<MapReview>,
}

/// One map-provider review.
#[derive(Debug, Default, Deserialize)]
pub struct MapReview {
    /// Star rating.
    pub rating: Option<f64>,
    /// Review text.
    #[serde(alias = "snippet")]
    pub description: Option<String>,
    /// Relative or absolute date as displayed.
    pub date: Option<String>,
    /// Reviewer.
    pub user: Option<ResultUser>,
}

/// Author block shared by several engines.
#[derive(Debug, Default, Deserialize)]
pub struct ResultUser {
    /// Display name.
    pub name: Option<String>,
}

/// Organic results response (`twitter` and `google` engines).
#[derive(Debug, Default, Deserialize)]
pub struct OrganicResponse {
    /// Results in ranking order.
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
    /// Provider-reported error.
    pub error: Option<String>,
}

/// One organic search result.
#[derive(Debug, Default, Deserialize)]
pub struct OrganicResult {
    /// Page or thread title.
    pub title: Option<String>,
    /// Text excerpt.
    pub snippet: Option<String>,
    /// Result URL.
    pub link: Option<String>,
    /// Posting date, when shown.
    pub date: Option<String>,
    /// Posting account (social results).
    pub user: Option<ResultUser>,
}

/// Venue and its reviews from a map search.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSearchResult {
    /// The resolved venue, or `None` if the search matched nothing.
    pub venue: Option<VenueInfo>,
    /// Up to the requested number of map-provider reviews.
    pub reviews: Vec<ReviewRecord>,
}

impl MapsResponse {
    /// Converts the response into models, keeping at most `max_reviews`
    /// reviews.
    ///
    /// A single resolved place wins; otherwise the first listing of a
    /// multi-place search is used. Places without a title are treated as
    /// not found.
    #[must_use]
    pub fn into_result(self, max_reviews: usize) -> MapSearchResult {
        let place = self
            .place_results
            .or_else(|| self.local_results.into_iter().next());

        let Some(mut place) = place.filter(|p| p.title.as_deref().is_some_and(|t| !t.trim().is_empty()))
        else {
            return MapSearchResult {
                venue: None,
                reviews: Vec::new(),
            };
        };

        let reviews = self
            .user_reviews
            .or_else(|| place.user_reviews.take())
            .map(|r| r.most_relevant)
            .unwrap_or_default()
            .into_iter()
            .take(max_reviews)
            .map(MapReview::into_record)
            .collect();

        MapSearchResult {
            venue: Some(place.into_venue()),
            reviews,
        }
    }
}

impl PlaceResult {
    fn into_venue(self) -> VenueInfo {
        VenueInfo {
            name: self.title.unwrap_or_default(),
            address: self.address,
            rating: self.rating.unwrap_or(0.0),
            total_reviews: self.reviews.unwrap_or(0),
            coordinates: self.gps_coordinates.map(|c| Coordinates {
                latitude: c.latitude,
                longitude: c.longitude,
            }),
            types: self.place_type.map(OneOrMany::into_vec).unwrap_or_default(),
        }
    }
}

impl MapReview {
    fn into_record(self) -> ReviewRecord {
        ReviewRecord {
            rating: self.rating,
            author: Some(author_name(self.user)),
            date: self.date,
            ..ReviewRecord::new(ReviewSource::MapProvider, self.description.unwrap_or_default())
        }
    }
}

fn author_name(user: Option<ResultUser>) -> String {
    user.and_then(|u| u.name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| ANONYMOUS.to_string())
}

/// Converts social results into review records.
#[must_use]
pub fn social_reviews(response: OrganicResponse, limit: usize) -> Vec<ReviewRecord> {
    response
        .organic_results
        .into_iter()
        .take(limit)
        .map(|post| ReviewRecord {
            author: Some(author_name(post.user)),
            date: post.date,
            link: post.link,
            ..ReviewRecord::new(ReviewSource::SocialProvider, post.snippet.unwrap_or_default())
        })
        .collect()
}

/// Converts forum results into review records with `"{title} - {snippet}"`
/// text.
#[must_use]
pub fn forum_reviews(response: OrganicResponse, limit: usize) -> Vec<ReviewRecord> {
    response
        .organic_results
        .into_iter()
        .take(limit)
        .map(|thread| {
            let text = format!(
                "{} - {}",
                thread.title.unwrap_or_default(),
                thread.snippet.unwrap_or_default()
            );
            ReviewRecord {
                link: thread.link,
                ..ReviewRecord::new(ReviewSource::ForumProvider, text)
            }
        })
        .collect()
}

/// Social search query for a venue.
#[must_use]
pub fn social_query(venue_name: &str) -> String {
    format!("{venue_name} hotel review OR experience OR stay")
}

/// Forum search query for a venue.
#[must_use]
pub fn forum_query(venue_name: &str) -> String {
    format!("{venue_name} site:reddit.com")
}

/// `SerpAPI` client.
#[derive(Debug, Clone)]
pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    /// Creates a client. `base_url` defaults to [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: String, base_url: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Looks up a venue and its reviews.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails or the provider reports
    /// an error.
    pub async fn search_place(
        &self,
        query: &str,
        location_bias: Option<&str>,
        max_reviews: usize,
    ) -> Result<MapSearchResult, FetchError> {
        let mut params = vec![
            ("engine", "google_maps"),
            ("type", "search"),
            ("q", query),
            ("hl", "en"),
        ];
        if let Some(ll) = location_bias.filter(|l| !l.trim().is_empty()) {
            params.push(("ll", ll));
        }

        let response: MapsResponse = self.get(&params).await?;
        provider_error(response.error.as_deref())?;

        let result = response.into_result(max_reviews);
        match &result.venue {
            Some(venue) => log::info!(
                "Found '{}' with {} map reviews",
                venue.name,
                result.reviews.len()
            ),
            None => log::warn!("Map search for '{query}' matched no place"),
        }
        Ok(result)
    }

    /// Fetches social posts mentioning the venue.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails or the provider reports
    /// an error.
    pub async fn search_social(
        &self,
        venue_name: &str,
        limit: usize,
    ) -> Result<Vec<ReviewRecord>, FetchError> {
        let q = social_query(venue_name);
        let response: OrganicResponse = self.get(&[("engine", "twitter"), ("q", q.as_str())]).await?;
        provider_error(response.error.as_deref())?;
        Ok(social_reviews(response, limit))
    }

    /// Fetches forum threads discussing the venue.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails or the provider reports
    /// an error.
    pub async fn search_forum(
        &self,
        venue_name: &str,
        limit: usize,
    ) -> Result<Vec<ReviewRecord>, FetchError> {
        let q = forum_query(venue_name);
        let response: OrganicResponse = self.get(&[("engine", "google"), ("q", q.as_str())]).await?;
        provider_error(response.error.as_deref())?;
        Ok(forum_reviews(response, limit))
    }

    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, FetchError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<OrganicResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| "request failed".to_string());
            return Err(FetchError::Provider {
                message: format!("SerpAPI returned status {}: {message}", status.as_u16()),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn provider_error(error: Option<&str>) -> Result<(), FetchError> {
    match error {
        Some(message) => Err(FetchError::Provider {
            message: format!("SerpAPI error: {message}"),
        }),
        None => Ok(()),
    }
}
