//! HTTP client for the Places text-search endpoint.

mod search_cell;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use varredor_core::{AppConfig, GridPoint, PlaceSummary};

use crate::error::SearchError;
use crate::normalize::normalize_place;
use crate::rate_limit::RateLimiter;
use crate::types::{Circle, LocationBias, TextSearchRequest, TextSearchResponse, WireLatLng};

pub use search_cell::{CellSearch, Truncation};

/// Response fields requested from the service. `nextPageToken` must be listed
/// or the service omits it and pagination silently stops after one page.
pub const FIELD_MASK: &str = "places.id,places.displayName,places.rating,places.userRatingCount,\
places.formattedAddress,places.regularOpeningHours.weekdayDescriptions,places.location,nextPageToken";

/// Pagination and page-size policy for cell searches.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub page_size: u32,
    /// Wait before following a continuation token. The service rejects
    /// tokens used too soon after issue.
    pub page_token_delay: Duration,
    /// Hard cap on pages per cell.
    pub max_pages: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page_size: 20,
            page_token_delay: Duration::from_secs(2),
            max_pages: 10,
        }
    }
}

impl SearchOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page_size: config.page_size,
            page_token_delay: Duration::from_millis(config.page_token_delay_ms),
            max_pages: config.max_pages_per_cell,
        }
    }
}

/// One decoded page of search results.
#[derive(Debug, Default)]
pub struct SearchPage {
    pub places: Vec<PlaceSummary>,
    pub next_page_token: Option<String>,
}

/// Client for location-biased place searches.
///
/// Every request goes through the shared [`RateLimiter`]. Use
/// [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    search_url: Url,
    options: SearchOptions,
    limiter: Arc<RateLimiter>,
}

impl PlacesClient {
    /// Creates a client from application config.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the `reqwest::Client` cannot be built
    /// or [`SearchError::InvalidBaseUrl`] if the configured base URL is bad.
    pub fn new(config: &AppConfig, limiter: Arc<RateLimiter>) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Self::from_parts(
            client,
            &config.google_api_key,
            &config.places_base_url,
            SearchOptions::from_config(config),
            limiter,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the `reqwest::Client` cannot be built
    /// or [`SearchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        options: SearchOptions,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Self::from_parts(client, api_key, base_url, options, limiter)
    }

    fn from_parts(
        client: Client,
        api_key: &str,
        base_url: &str,
        options: SearchOptions,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            search_url: Self::search_url(base_url)?,
            options,
            limiter,
        })
    }

    #[must_use]
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Fetches one page of results around `point`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::RateLimited`] on HTTP 429.
    /// - [`SearchError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`SearchError::Http`] on network or TLS failure.
    /// - [`SearchError::Deserialize`] if the body does not match the expected shape.
    pub async fn fetch_page(
        &self,
        point: GridPoint,
        radius_meters: u32,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, SearchError> {
        let body = Self::request_body(point, radius_meters, query, self.options.page_size, page_token);

        let _slot = self.limiter.acquire().await?;
        let response = self
            .client
            .post(self.search_url.clone())
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(SearchError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let parsed = serde_json::from_str::<TextSearchResponse>(&text).map_err(|e| {
            SearchError::Deserialize {
                context: format!("text search page at ({}, {})", point.lat, point.lng),
                source: e,
            }
        })?;

        Ok(SearchPage {
            places: parsed.places.into_iter().filter_map(normalize_place).collect(),
            next_page_token: parsed.next_page_token,
        })
    }

    fn request_body<'a>(
        point: GridPoint,
        radius_meters: u32,
        query: &'a str,
        page_size: u32,
        page_token: Option<&'a str>,
    ) -> TextSearchRequest<'a> {
        TextSearchRequest {
            text_query: query,
            location_bias: LocationBias {
                circle: Circle {
                    center: WireLatLng {
                        latitude: point.lat,
                        longitude: point.lng,
                    },
                    radius: f64::from(radius_meters),
                },
            },
            page_size,
            page_token,
        }
    }

    /// Builds `{base}/v1/places:searchText`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidBaseUrl`] if `base_url` does not parse
    /// or cannot carry a path.
    fn search_url(base_url: &str) -> Result<Url, SearchError> {
        let invalid = |reason: String| SearchError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason,
        };
        let mut url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v1", "places:searchText"]);
        Ok(url)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
