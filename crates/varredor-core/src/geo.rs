//! Geographic primitives and grid tessellation.
//!
//! Generates uniform lat/lng query points across a bounding box for an
//! exhaustive areal sweep. Longitude step widens with the cosine of the box's
//! mean latitude so physical spacing stays ~equal in both axes.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Flat-earth approximation used for both axes before longitude correction.
pub const KM_PER_LAT_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Rectangular region given by its northeast and southwest corners.
///
/// Cities that straddle the antimeridian are not representable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

impl BoundingBox {
    /// Builds a box, rejecting corners where northeast lies south or west of
    /// southwest.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBoundingBox`] when the corner invariant
    /// does not hold.
    pub fn new(northeast: LatLng, southwest: LatLng) -> Result<Self, CoreError> {
        let bbox = Self {
            northeast,
            southwest,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBoundingBox`] when northeast is south or
    /// west of southwest.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.northeast.lat >= self.southwest.lat && self.northeast.lng >= self.southwest.lng {
            Ok(())
        } else {
            Err(CoreError::InvalidBoundingBox {
                ne_lat: self.northeast.lat,
                ne_lng: self.northeast.lng,
                sw_lat: self.southwest.lat,
                sw_lng: self.southwest.lng,
            })
        }
    }

    #[must_use]
    pub fn mean_lat(&self) -> f64 {
        (self.northeast.lat + self.southwest.lat) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Latitude and longitude increments, in degrees, for a `step_km` spacing
/// inside `bbox`.
#[must_use]
pub fn grid_steps(bbox: &BoundingBox, step_km: f64) -> (f64, f64) {
    let lat_step = step_km / KM_PER_LAT_DEGREE;
    let lng_step = step_km / (KM_PER_LAT_DEGREE * bbox.mean_lat().to_radians().cos());
    (lat_step, lng_step)
}

/// Tessellate `bbox` into query points spaced `step_km` apart.
///
/// Points are emitted row-major from the southwest corner: latitude ascending
/// in the outer loop, longitude ascending in the inner loop. Both loops are
/// inclusive of the northeast edge and points are never clamped, so the last
/// row or column may sit on the edge or, from accumulated float error, a
/// hair past it. A degenerate box yields exactly one point.
///
/// # Errors
///
/// Returns [`CoreError::InvalidStep`] when `step_km` is not a positive finite
/// distance or is too small to advance the coordinates, and
/// [`CoreError::InvalidBoundingBox`] when the box corners are inverted.
pub fn tessellate(bbox: &BoundingBox, step_km: f64) -> Result<Vec<GridPoint>, CoreError> {
    if !step_km.is_finite() || step_km <= 0.0 {
        return Err(CoreError::InvalidStep(step_km));
    }
    bbox.validate()?;

    let (lat_step, lng_step) = grid_steps(bbox, step_km);
    let sw = bbox.southwest;
    let ne = bbox.northeast;

    // A step below float resolution would never advance the cursor.
    if !lng_step.is_finite() || sw.lat + lat_step <= sw.lat || sw.lng + lng_step <= sw.lng {
        return Err(CoreError::InvalidStep(step_km));
    }

    let mut points = Vec::new();
    let mut lat = sw.lat;
    while lat <= ne.lat {
        let mut lng = sw.lng;
        while lng <= ne.lng {
            points.push(GridPoint { lat, lng });
            lng += lng_step;
        }
        lat += lat_step;
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lisbon_box() -> BoundingBox {
        BoundingBox::new(
            LatLng {
                lat: 38.736,
                lng: -9.142,
            },
            LatLng {
                lat: 38.705,
                lng: -9.160,
            },
        )
        .unwrap()
    }

    #[test]
    fn lisbon_box_yields_four_rows_by_two_columns() {
        let bbox = lisbon_box();
        let pts = tessellate(&bbox, 1.0).unwrap();
        assert_eq!(pts.len(), 8, "got {pts:?}");

        // First point is the southwest corner, bit for bit.
        assert_eq!(
            pts[0],
            GridPoint {
                lat: 38.705,
                lng: -9.160
            }
        );

        // Row-major: each pair of points shares a latitude, longitudes ascend.
        for row in pts.chunks(2) {
            assert_eq!(row[0].lat, row[1].lat);
            assert!(row[0].lng < row[1].lng);
        }
        for pair in pts.windows(2) {
            assert!(pair[0].lat <= pair[1].lat);
        }
    }

    #[test]
    fn spacing_matches_step_in_km() {
        let bbox = lisbon_box();
        let pts = tessellate(&bbox, 1.0).unwrap();
        let lat_km = (pts[2].lat - pts[0].lat) * KM_PER_LAT_DEGREE;
        let lng_km = (pts[1].lng - pts[0].lng)
            * KM_PER_LAT_DEGREE
            * bbox.mean_lat().to_radians().cos();
        assert!((lat_km - 1.0).abs() < 1e-9, "lat spacing {lat_km}");
        assert!((lng_km - 1.0).abs() < 1e-9, "lng spacing {lng_km}");
    }

    #[test]
    fn last_row_and_column_reach_within_one_step_of_northeast() {
        let bbox = lisbon_box();
        let (lat_step, lng_step) = grid_steps(&bbox, 1.0);
        let pts = tessellate(&bbox, 1.0).unwrap();
        let last = pts.last().unwrap();
        assert!(last.lat <= bbox.northeast.lat && last.lat + lat_step > bbox.northeast.lat);
        assert!(last.lng <= bbox.northeast.lng && last.lng + lng_step > bbox.northeast.lng);
    }

    #[test]
    fn degenerate_box_yields_single_point() {
        let corner = LatLng {
            lat: 41.15,
            lng: -8.61,
        };
        let bbox = BoundingBox::new(corner, corner).unwrap();
        let pts = tessellate(&bbox, 1.0).unwrap();
        assert_eq!(
            pts,
            vec![GridPoint {
                lat: 41.15,
                lng: -8.61
            }]
        );
    }

    #[test]
    fn tessellation_is_deterministic() {
        let bbox = lisbon_box();
        assert_eq!(
            tessellate(&bbox, 0.7).unwrap(),
            tessellate(&bbox, 0.7).unwrap()
        );
    }

    #[test]
    fn smaller_step_produces_more_points() {
        let bbox = lisbon_box();
        let coarse = tessellate(&bbox, 2.0).unwrap();
        let fine = tessellate(&bbox, 0.5).unwrap();
        assert!(!coarse.is_empty());
        assert!(fine.len() > coarse.len());
    }

    #[test]
    fn longitude_columns_thin_out_toward_the_poles() {
        let equatorial = BoundingBox::new(
            LatLng { lat: 0.0, lng: 1.0 },
            LatLng { lat: 0.0, lng: 0.0 },
        )
        .unwrap();
        let northern = BoundingBox::new(
            LatLng { lat: 60.0, lng: 1.0 },
            LatLng { lat: 60.0, lng: 0.0 },
        )
        .unwrap();
        let low = tessellate(&equatorial, 5.0).unwrap();
        let high = tessellate(&northern, 5.0).unwrap();
        assert!(high.len() < low.len(), "{} vs {}", high.len(), low.len());
    }

    #[test]
    fn rejects_non_positive_step() {
        let bbox = lisbon_box();
        assert_eq!(tessellate(&bbox, 0.0), Err(CoreError::InvalidStep(0.0)));
        assert!(tessellate(&bbox, -1.0).is_err());
        assert!(tessellate(&bbox, f64::NAN).is_err());
    }

    #[test]
    fn rejects_inverted_box() {
        let result = BoundingBox::new(
            LatLng {
                lat: 38.0,
                lng: -9.0,
            },
            LatLng {
                lat: 39.0,
                lng: -9.5,
            },
        );
        assert!(matches!(result, Err(CoreError::InvalidBoundingBox { .. })));
    }
}
