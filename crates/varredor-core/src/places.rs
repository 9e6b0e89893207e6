//! Place records and cross-cell aggregation.
//!
//! Grid cells overlap on purpose (a fixed search radius against a variable
//! grid spacing), so the same place surfaces from several cells. The
//! aggregator keys every record by the search service's place id and keeps
//! the first record seen for each id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One place as returned by a single page of a cell search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSummary {
    /// Search-service place id, the dedup key.
    pub id: String,
    pub name: String,
    /// Star rating in `[0, 5]`; `0.0` when the service reports none.
    pub rating: f64,
    pub review_count: u32,
    pub address: String,
    /// One line per weekday, as formatted by the service. Empty when unknown.
    pub opening_hours: Vec<String>,
    pub lat: f64,
    pub lng: f64,
}

/// A place in the aggregated sweep dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    pub rating: f64,
    pub review_count: u32,
    pub address: String,
    pub opening_hours: Vec<String>,
    pub lat: f64,
    pub lng: f64,
    /// Set by [`crate::rating::score`] once the full set is aggregated.
    pub weighted_rating: Option<f64>,
}

impl From<PlaceSummary> for PlaceRecord {
    fn from(summary: PlaceSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            rating: summary.rating,
            review_count: summary.review_count,
            address: summary.address,
            opening_hours: summary.opening_hours,
            lat: summary.lat,
            lng: summary.lng,
            weighted_rating: None,
        }
    }
}

/// Aggregated places keyed by place id.
pub type PlaceIndex = HashMap<String, PlaceRecord>;

/// Merge one cell's results into the accumulator.
///
/// Ids not yet present are inserted. Ids already present keep their existing
/// record untouched (first-seen-wins), so merging the same cell twice is a
/// no-op the second time. Returns the number of newly inserted places.
pub fn merge<I>(accumulator: &mut PlaceIndex, cell_results: I) -> usize
where
    I: IntoIterator<Item = PlaceSummary>,
{
    let mut inserted = 0usize;
    for summary in cell_results {
        if accumulator.contains_key(&summary.id) {
            continue;
        }
        accumulator.insert(summary.id.clone(), PlaceRecord::from(summary));
        inserted += 1;
    }
    inserted
}
