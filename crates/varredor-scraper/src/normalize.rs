//! Conversion from place-search wire shapes to [`varredor_core::PlaceSummary`].

use varredor_core::PlaceSummary;

use crate::types::WirePlace;

/// Normalizes a raw [`WirePlace`] into a [`PlaceSummary`].
///
/// Returns `None` when the place has no id, since it cannot be deduplicated.
/// Other missing fields fall back to neutral values: rating `0.0`, review
/// count `0`, empty name/address, no opening hours, and `(0, 0)` coordinates.
#[must_use]
pub fn normalize_place(place: WirePlace) -> Option<PlaceSummary> {
    let id = place.id.filter(|id| !id.trim().is_empty())?;
    let (lat, lng) = place
        .location
        .map_or((0.0, 0.0), |loc| (loc.latitude, loc.longitude));

    Some(PlaceSummary {
        id,
        name: place.display_name.map(|n| n.text).unwrap_or_default(),
        rating: place.rating.unwrap_or(0.0).clamp(0.0, 5.0),
        review_count: place.user_rating_count.unwrap_or(0),
        address: place.formatted_address.unwrap_or_default(),
        opening_hours: place
            .regular_opening_hours
            .map(|h| h.weekday_descriptions)
            .unwrap_or_default(),
        lat,
        lng,
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
