//! Wire types for the geocoding and place-search endpoints.
//!
//! ## Geocoding (`GET /maps/api/geocode/json`)
//!
//! `status` is `"OK"` on success; `"ZERO_RESULTS"`, `"REQUEST_DENIED"`,
//! `"OVER_QUERY_LIMIT"` and friends arrive with HTTP 200 and an
//! `error_message`. Area-like results (cities, regions) carry
//! `geometry.bounds`; point-like results (a street address) carry only
//! `geometry.viewport`.
//!
//! ## Place search (`POST /v1/places:searchText`)
//!
//! Only fields listed in the `X-Goog-FieldMask` header come back, and absent
//! values are omitted rather than `null`. A place with no reviews has neither
//! `rating` nor `userRatingCount`. `nextPageToken` is present only when
//! another page exists and must be echoed back as `pageToken`.

use serde::{Deserialize, Serialize};
use varredor_core::BoundingBox;

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeGeometry {
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
    #[serde(default)]
    pub viewport: Option<BoundingBox>,
}

/// Request body for a location-biased text search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSearchRequest<'a> {
    pub text_query: &'a str,
    pub location_bias: LocationBias,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct LocationBias {
    pub circle: Circle,
}

#[derive(Debug, Serialize)]
pub struct Circle {
    pub center: WireLatLng,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WireLatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSearchResponse {
    #[serde(default)]
    pub places: Vec<WirePlace>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePlace {
    /// Missing ids are dropped during normalization.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_rating_count: Option<u32>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub regular_opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub location: Option<WireLatLng>,
}

#[derive(Debug, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    #[serde(default)]
    pub weekday_descriptions: Vec<String>,
}
