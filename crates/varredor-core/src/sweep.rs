//! The value a sweep produces: a bounding box, its grid, and the aggregated
//! places found across every cell.
//!
//! A `SweepResult` is populated cell by cell while the sweep runs, then
//! finalized once (weighted ratings computed) and handed read-only to the
//! exporters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::{BoundingBox, GridPoint};
use crate::places::{merge, PlaceIndex, PlaceRecord, PlaceSummary};
use crate::rating::{score_index, RatingStats};
use crate::CoreError;

/// Per-sweep knobs, defaulted from `AppConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepParams {
    pub step_km: f64,
    pub radius_meters: u32,
    pub query: String,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            step_km: 1.0,
            radius_meters: 4000,
            query: "restaurant".to_string(),
        }
    }
}

impl SweepParams {
    #[must_use]
    pub fn from_config(config: &crate::AppConfig) -> Self {
        Self {
            step_km: config.grid_step_km,
            radius_meters: config.search_radius_meters,
            query: config.search_query.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStats {
    pub cells_total: usize,
    pub cells_searched: usize,
    /// Cells whose pagination stopped early (error response or page cap).
    pub cells_truncated: usize,
    pub pages_fetched: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResult {
    pub id: Uuid,
    pub location: String,
    pub params: SweepParams,
    pub bounding_box: BoundingBox,
    pub grid_points: Vec<GridPoint>,
    pub stats: SweepStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    places: PlaceIndex,
}

impl SweepResult {
    #[must_use]
    pub fn new(
        location: impl Into<String>,
        params: SweepParams,
        bounding_box: BoundingBox,
        grid_points: Vec<GridPoint>,
    ) -> Self {
        let stats = SweepStats {
            cells_total: grid_points.len(),
            ..SweepStats::default()
        };
        Self {
            id: Uuid::new_v4(),
            location: location.into(),
            params,
            bounding_box,
            grid_points,
            stats,
            started_at: Utc::now(),
            finished_at: None,
            places: PlaceIndex::new(),
        }
    }

    /// Fold one cell's places into the aggregate. Returns how many were new.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SweepFinalized`] once [`Self::finalize`] has run.
    pub fn ingest_cell<I>(&mut self, cell_results: I) -> Result<usize, CoreError>
    where
        I: IntoIterator<Item = PlaceSummary>,
    {
        if self.is_finalized() {
            return Err(CoreError::SweepFinalized(self.id));
        }
        Ok(merge(&mut self.places, cell_results))
    }

    /// Compute weighted ratings over the complete aggregate and freeze it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SweepFinalized`] if called twice.
    pub fn finalize(&mut self) -> Result<RatingStats, CoreError> {
        if self.is_finalized() {
            return Err(CoreError::SweepFinalized(self.id));
        }
        let stats = score_index(&mut self.places);
        self.finished_at = Some(Utc::now());
        Ok(stats)
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finished_at.is_some()
    }

    #[must_use]
    pub fn places(&self) -> &PlaceIndex {
        &self.places
    }

    /// Places by weighted rating (highest first), then name, then id.
    #[must_use]
    pub fn ranked(&self) -> Vec<&PlaceRecord> {
        let mut ranked: Vec<&PlaceRecord> = self.places.values().collect();
        ranked.sort_by(|a, b| {
            let wa = a.weighted_rating.unwrap_or(0.0);
            let wb = b.weighted_rating.unwrap_or(0.0);
            wb.total_cmp(&wa)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked
    }

    #[must_use]
    pub fn slug(&self) -> String {
        location_slug(&self.location)
    }
}

/// File and worksheet name fragment for a location:
/// `"Lisboa, Portugal"` → `"lisboa_portugal"`.
#[must_use]
pub fn location_slug(location: &str) -> String {
    location
        .trim()
        .to_lowercase()
        .replace(',', "")
        .replace(' ', "_")
}
