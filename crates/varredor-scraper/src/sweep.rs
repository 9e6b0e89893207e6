//! The sweep pipeline: geocode → tessellate → search every cell → aggregate
//! → score.
//!
//! Cells are independent, so up to `max_concurrent_cells` run at once. Their
//! results are consumed in grid order by this task alone, which makes the
//! first-seen-wins merge deterministic whatever the pool width. Scoring waits
//! for every cell.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use varredor_core::{tessellate, AppConfig, GridPoint, SweepParams, SweepResult};

use crate::client::{CellSearch, PlacesClient};
use crate::error::SweepError;
use crate::geocode::Geocoder;
use crate::rate_limit::{pause, RateLimiter};

/// Progress report emitted after each cell is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepProgress {
    pub cells_done: usize,
    pub cells_total: usize,
    pub places_found: usize,
    pub new_places: usize,
}

pub struct SweepOrchestrator {
    geocoder: Geocoder,
    places: PlacesClient,
    /// Pause before each cell starts, on top of the shared limiter.
    cell_delay: Duration,
    max_concurrent_cells: usize,
}

impl SweepOrchestrator {
    #[must_use]
    pub fn new(
        geocoder: Geocoder,
        places: PlacesClient,
        cell_delay: Duration,
        max_concurrent_cells: usize,
    ) -> Self {
        Self {
            geocoder,
            places,
            cell_delay,
            max_concurrent_cells: max_concurrent_cells.max(1),
        }
    }

    /// Builds the geocoder, a shared limiter, and the search client from
    /// config.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError`] if either HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, SweepError> {
        let limiter = Arc::new(RateLimiter::new(
            config.max_concurrent_cells,
            config.min_request_interval_ms,
        ));
        Ok(Self::new(
            Geocoder::new(config)?,
            PlacesClient::new(config, limiter)?,
            Duration::from_millis(config.cell_delay_ms),
            config.max_concurrent_cells,
        ))
    }

    /// Run a full sweep of `location`.
    ///
    /// # Errors
    ///
    /// See [`Self::run_with_progress`].
    pub async fn run(
        &self,
        location: &str,
        params: &SweepParams,
        cancel: &CancellationToken,
    ) -> Result<SweepResult, SweepError> {
        self.run_with_progress(location, params, cancel, |_| {}).await
    }

    /// Run a full sweep of `location`, calling `on_progress` after each cell.
    ///
    /// Per-cell search failures only truncate that cell and are counted in
    /// [`varredor_core::SweepStats::cells_truncated`].
    ///
    /// # Errors
    ///
    /// - [`SweepError::Geocode`] if the location cannot be resolved.
    /// - [`SweepError::Core`] if the grid step is invalid.
    /// - [`SweepError::Cancelled`] if `cancel` fires before the sweep is
    ///   finalized. No partial result is returned.
    pub async fn run_with_progress<F>(
        &self,
        location: &str,
        params: &SweepParams,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<SweepResult, SweepError>
    where
        F: FnMut(&SweepProgress),
    {
        if cancel.is_cancelled() {
            return Err(SweepError::Cancelled);
        }

        let bbox = match self.geocoder.resolve_bounds(location).await {
            Ok(bbox) => bbox,
            Err(err) => {
                tracing::error!(location, error = %err, "geocoding failed; sweep aborted");
                return Err(err.into());
            }
        };
        let grid = tessellate(&bbox, params.step_km)?;
        let mut sweep = SweepResult::new(location.trim(), params.clone(), bbox, grid);
        let cells_total = sweep.grid_points.len();

        tracing::info!(
            sweep_id = %sweep.id,
            location = %sweep.location,
            cells = cells_total,
            step_km = params.step_km,
            radius_meters = params.radius_meters,
            "starting sweep"
        );

        let points: Vec<GridPoint> = sweep.grid_points.clone();
        let places = &self.places;
        let cell_delay = self.cell_delay;
        let radius = params.radius_meters;
        let query = params.query.as_str();

        let mut cells = std::pin::pin!(stream::iter(points)
            .map(|point| async move {
                if !pause(cell_delay, cancel).await {
                    return CellSearch::cancelled();
                }
                places.search_cell(point, radius, query, cancel).await
            })
            .buffered(self.max_concurrent_cells));

        let mut cells_done = 0usize;
        while let Some(cell) = cells.next().await {
            if cell.is_cancelled() || cancel.is_cancelled() {
                tracing::warn!(sweep_id = %sweep.id, cells_done, "sweep cancelled");
                return Err(SweepError::Cancelled);
            }

            cells_done += 1;
            sweep.stats.cells_searched += 1;
            sweep.stats.pages_fetched += cell.pages_fetched;
            if let Some(reason) = &cell.truncation {
                sweep.stats.cells_truncated += 1;
                tracing::warn!(
                    sweep_id = %sweep.id,
                    cell = cells_done,
                    reason = ?reason,
                    kept = cell.places.len(),
                    "cell truncated; keeping partial results"
                );
            }

            let new_places = sweep.ingest_cell(cell.places)?;
            let progress = SweepProgress {
                cells_done,
                cells_total,
                places_found: sweep.places().len(),
                new_places,
            };
            tracing::debug!(
                sweep_id = %sweep.id,
                cell = cells_done,
                cells_total,
                new_places,
                place_count = progress.places_found,
                "cell merged"
            );
            on_progress(&progress);
        }

        let stats = sweep.finalize()?;
        tracing::info!(
            sweep_id = %sweep.id,
            place_count = sweep.places().len(),
            cells_truncated = sweep.stats.cells_truncated,
            pages_fetched = sweep.stats.pages_fetched,
            m = stats.m,
            c = stats.c,
            "sweep finalized"
        );
        Ok(sweep)
    }
}
