//! Bayesian (IMDB-style) weighted rating.
//!
//! `weighted = v/(v+m)·R + m/(v+m)·C`, where `v` is a place's review count,
//! `R` its raw rating, `m` the 75th percentile of review counts across the
//! whole dataset, and `C` the dataset mean rating. Places with few reviews
//! are pulled toward `C`; heavily reviewed places keep roughly their own `R`.
//!
//! `m` and `C` are global, so scoring must run after aggregation completes.

use crate::places::{PlaceIndex, PlaceRecord};

const REVIEW_PERCENTILE: f64 = 75.0;

/// Dataset-wide statistics used by [`score`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingStats {
    /// 75th percentile of review counts.
    pub m: f64,
    /// Mean raw rating.
    pub c: f64,
}

impl RatingStats {
    #[must_use]
    pub fn from_places<'a, I>(places: I) -> Self
    where
        I: IntoIterator<Item = &'a PlaceRecord>,
    {
        let (counts, ratings): (Vec<f64>, Vec<f64>) = places
            .into_iter()
            .map(|p| (f64::from(p.review_count), p.rating))
            .unzip();
        Self {
            m: percentile(&counts, REVIEW_PERCENTILE),
            c: mean_rating(&ratings),
        }
    }

    /// Weighted rating for one place, rounded to three decimals.
    #[must_use]
    pub fn weighted(&self, review_count: u32, rating: f64) -> f64 {
        let v = f64::from(review_count);
        let total = v + self.m;
        if total <= 0.0 {
            return 0.0;
        }
        round3((v / total) * rating + (self.m / total) * self.c)
    }
}

/// Percentile with linear interpolation between closest ranks.
///
/// Returns `0.0` for an empty slice. `pct` is in `[0, 100]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - rank.floor();
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Arithmetic mean, `0.0` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_rating(ratings: &[f64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().sum::<f64>() / ratings.len() as f64
}

/// Fill `weighted_rating` on every place from the dataset's global stats.
///
/// All other fields are left untouched. Returns the stats used.
pub fn score(places: &mut [PlaceRecord]) -> RatingStats {
    let stats = RatingStats::from_places(places.iter());
    apply(&stats, places.iter_mut());
    stats
}

/// [`score`] over an aggregated [`PlaceIndex`].
pub fn score_index(index: &mut PlaceIndex) -> RatingStats {
    let stats = RatingStats::from_places(index.values());
    apply(&stats, index.values_mut());
    stats
}

fn apply<'a, I>(stats: &RatingStats, places: I)
where
    I: IntoIterator<Item = &'a mut PlaceRecord>,
{
    let mut scored = 0usize;
    for place in places {
        place.weighted_rating = Some(stats.weighted(place.review_count, place.rating));
        scored += 1;
    }
    tracing::debug!(m = stats.m, c = stats.c, scored, "computed weighted ratings");
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
