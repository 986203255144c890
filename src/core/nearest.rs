use crate::core::criteria::CriteriaStore;
use crate::core::distance::distance_between;
use crate::core::filters::is_available;
use crate::models::{LatLng, Listing};

/// A listing paired with its distance from a reference point
#[derive(Debug, Clone, Copy)]
pub struct NearbyListing<'a> {
    pub listing: &'a Listing,
    pub position: LatLng,
    pub distance_miles: f64,
}

/// Up to `limit` available listings closest to `center`
///
/// Availability is respected, every other filter and the viewport are not.
/// Ties keep the original listing order.
pub fn nearest_available<'a>(
    listings: &'a [Listing],
    criteria: &CriteriaStore,
    center: LatLng,
    limit: usize,
) -> Vec<NearbyListing<'a>> {
    let mut nearby: Vec<NearbyListing<'a>> = listings
        .iter()
        .filter(|listing| is_available(listing, criteria))
        .filter_map(|listing| {
            let position = listing.position()?;
            Some(NearbyListing {
                listing,
                position,
                distance_miles: distance_between(center, position),
            })
        })
        .collect();

    // Stable sort keeps listing order for equal distances
    nearby.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    nearby.truncate(limit);
    nearby
}
