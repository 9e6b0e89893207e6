//! Domain types, configuration, and the pure algorithms of a restaurant sweep:
//! grid tessellation, cross-cell aggregation, and Bayesian rating scores.

pub mod access;
pub mod app_config;
pub mod config;
pub mod geo;
pub mod places;
pub mod rating;
pub mod sweep;

use thiserror::Error;

pub use access::AccessGate;
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{tessellate, BoundingBox, GridPoint, LatLng};
pub use places::{merge, PlaceIndex, PlaceRecord, PlaceSummary};
pub use rating::{mean_rating, percentile, score, score_index, RatingStats};
pub use sweep::{location_slug, SweepParams, SweepResult, SweepStats};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid bounding box: northeast ({ne_lat}, {ne_lng}) is south or west of southwest ({sw_lat}, {sw_lng})")]
    InvalidBoundingBox {
        ne_lat: f64,
        ne_lng: f64,
        sw_lat: f64,
        sw_lng: f64,
    },

    #[error("grid step must be a positive finite distance, got {0} km")]
    InvalidStep(f64),

    #[error("sweep {0} is already finalized")]
    SweepFinalized(uuid::Uuid),
}
