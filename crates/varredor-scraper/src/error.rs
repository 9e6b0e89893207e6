use thiserror::Error;

use varredor_core::CoreError;

/// Failures resolving a location into a bounding box. All are fatal for the
/// sweep and are never retried.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("location must not be empty")]
    EmptyLocation,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from geocoding endpoint")]
    UnexpectedStatus { status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("geocoding \"{location}\" failed with status {status}: {message}")]
    Status {
        location: String,
        status: String,
        message: String,
    },

    #[error("geocoding result for \"{location}\" has neither bounds nor viewport")]
    MissingBounds { location: String },

    #[error("geocoding result for \"{location}\" is unusable: {source}")]
    InvalidBounds {
        location: String,
        #[source]
        source: CoreError,
    },

    #[error("invalid geocoding base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Failures of a single place-search page request.
///
/// The cell loop turns these into a truncation of that cell; they never abort
/// the sweep.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by place search (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected HTTP status {status} from place search")]
    UnexpectedStatus { status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid place search base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("request limiter is closed")]
    LimiterClosed,
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error("client setup failed: {0}")]
    Setup(#[from] SearchError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("sweep cancelled")]
    Cancelled,
}
