pub mod client;
pub mod error;
pub mod geocode;
pub mod normalize;
pub mod pagination;
pub mod rate_limit;
pub mod sweep;
pub mod types;

pub use client::{CellSearch, PlacesClient, SearchOptions, SearchPage, Truncation, FIELD_MASK};
pub use error::{GeocodeError, SearchError, SweepError};
pub use geocode::Geocoder;
pub use normalize::normalize_place;
pub use rate_limit::{pause, RateLimiter};
pub use sweep::{SweepOrchestrator, SweepProgress};
