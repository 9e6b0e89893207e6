//! Location → bounding box resolution via the geocoding endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use varredor_core::{AppConfig, BoundingBox};

use crate::error::GeocodeError;
use crate::types::GeocodeResponse;

const STATUS_OK: &str = "OK";

/// Client for the geocoding endpoint.
pub struct Geocoder {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl Geocoder {
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the `reqwest::Client` cannot be built
    /// or [`GeocodeError::InvalidBaseUrl`] if the configured base URL is bad.
    pub fn new(config: &AppConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            api_key: config.google_api_key.clone(),
            endpoint: Self::endpoint(&config.geocode_base_url)?,
        })
    }

    /// Creates a geocoder with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`Geocoder::new`].
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint: Self::endpoint(base_url)?,
        })
    }

    /// Resolve `location` to the bounding box of its first geocoding result.
    ///
    /// Prefers `geometry.bounds` and falls back to `geometry.viewport`, which
    /// is all that point-like results carry.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::EmptyLocation`] for blank input.
    /// - [`GeocodeError::Status`] when the service status is not `OK`.
    /// - [`GeocodeError::MissingBounds`] when the first result has neither box.
    /// - [`GeocodeError::InvalidBounds`] when the box corners are inverted.
    /// - [`GeocodeError::Http`], [`GeocodeError::UnexpectedStatus`], or
    ///   [`GeocodeError::Deserialize`] on transport or decoding failure.
    pub async fn resolve_bounds(&self, location: &str) -> Result<BoundingBox, GeocodeError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(GeocodeError::EmptyLocation);
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", location)
            .append_pair("key", &self.api_key);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let body = serde_json::from_str::<GeocodeResponse>(&text).map_err(|e| {
            GeocodeError::Deserialize {
                context: format!("geocode(address={location})"),
                source: e,
            }
        })?;

        let bbox = Self::pick_bounds(location, body)?;
        tracing::info!(
            location,
            ne_lat = bbox.northeast.lat,
            ne_lng = bbox.northeast.lng,
            sw_lat = bbox.southwest.lat,
            sw_lng = bbox.southwest.lng,
            "resolved location bounds"
        );
        Ok(bbox)
    }

    fn pick_bounds(location: &str, body: GeocodeResponse) -> Result<BoundingBox, GeocodeError> {
        if body.status != STATUS_OK {
            return Err(GeocodeError::Status {
                location: location.to_owned(),
                status: body.status,
                message: body
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
            });
        }

        let geometry = body
            .results
            .into_iter()
            .next()
            .map(|r| r.geometry)
            .ok_or_else(|| GeocodeError::MissingBounds {
                location: location.to_owned(),
            })?;

        let bbox = geometry
            .bounds
            .or(geometry.viewport)
            .ok_or_else(|| GeocodeError::MissingBounds {
                location: location.to_owned(),
            })?;

        bbox.validate().map_err(|source| GeocodeError::InvalidBounds {
            location: location.to_owned(),
            source,
        })?;
        Ok(bbox)
    }

    fn endpoint(base_url: &str) -> Result<Url, GeocodeError> {
        let invalid = |reason: String| GeocodeError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason,
        };
        let mut url =
            Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["maps", "api", "geocode", "json"]);
        Ok(url)
    }
}
