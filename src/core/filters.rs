use crate::core::criteria::CriteriaStore;
use crate::core::distance::is_within_radius;
use crate::models::{Bounds, Listing};

/// Radius around a geocoded search origin for location-only searches
pub const DEFAULT_RADIUS_MILES: f64 = 30.0;

/// Predicate evaluator
///
/// Pure checks deciding whether a listing card and its map marker should
/// be shown for the current criteria.
#[derive(Debug, Clone, Copy)]
pub struct Predicates {
    radius_miles: f64,
}

impl Default for Predicates {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS_MILES)
    }
}

impl Predicates {
    pub fn new(radius_miles: f64) -> Self {
        Self { radius_miles }
    }

    pub fn radius_miles(&self) -> f64 {
        self.radius_miles
    }

    /// Card visibility: geography, availability and every other filter
    ///
    /// `viewport` is `None` when there is no map (static list mode).
    #[inline]
    pub fn is_visible(
        &self,
        listing: &Listing,
        criteria: &CriteriaStore,
        viewport: Option<&Bounds>,
    ) -> bool {
        self.matches_geography(listing, criteria, viewport)
            && is_available(listing, criteria)
            && passes_filters(listing, criteria)
    }

    /// Marker visibility: availability and the non-geographic filters.
    /// Markers never follow the viewport, the viewport comes from the map.
    #[inline]
    pub fn marker_visible(&self, listing: &Listing, criteria: &CriteriaStore) -> bool {
        listing.position().is_some()
            && is_available(listing, criteria)
            && passes_filters(listing, criteria)
    }

    /// Geographic clause
    ///
    /// Location-only searches (origin known, no availability check yet) use
    /// the radius around the origin. Otherwise the viewport applies, and
    /// without a viewport there is no geographic constraint at all.
    ///
    /// A listing without coordinates only passes when there is no map: it
    /// cannot be placed in a viewport, and the radius test is skipped for it.
    #[inline]
    pub fn matches_geography(
        &self,
        listing: &Listing,
        criteria: &CriteriaStore,
        viewport: Option<&Bounds>,
    ) -> bool {
        let Some(position) = listing.position() else {
            return viewport.is_none();
        };

        match (criteria.search_origin(), criteria.availability().did_check()) {
            (Some(origin), false) => is_within_radius(origin, position, self.radius_miles),
            _ => viewport.map_or(true, |bounds| bounds.contains(position)),
        }
    }
}

/// Availability clause, always true when no check was performed
#[inline]
pub fn is_available(listing: &Listing, criteria: &CriteriaStore) -> bool {
    criteria.availability().is_available(listing.id)
}

/// Price, property type and amenity clauses
#[inline]
pub fn passes_filters(listing: &Listing, criteria: &CriteriaStore) -> bool {
    if !criteria.price_window().admits(listing) {
        return false;
    }

    let types = criteria.selected_types();
    if !types.is_empty()
        && !listing
            .property_type
            .as_deref()
            .is_some_and(|t| types.contains(t))
    {
        return false;
    }

    if criteria.pets_required() && !listing.pets_allowed {
        return false;
    }

    if criteria.smoking_required() && !listing.smoking_allowed {
        return false;
    }

    true
}

/// Drop listings that are not live; done once when listings are loaded
pub fn live_only(listings: Vec<Listing>) -> Vec<Listing> {
    let total = listings.len();
    let live: Vec<Listing> = listings.into_iter().filter(|l| l.is_live).collect();
    if live.len() != total {
        tracing::debug!("Dropped {} non-live listings", total - live.len());
    }
    live
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatLng;
    use std::collections::HashSet;

    fn create_listing(id: i64, lat: f64, lng: f64, price_min: f64, price_max: f64) -> Listing {
        Listing {
            id,
            latitude: Some(lat),
            longitude: Some(lng),
            price_min,
            price_max,
            property_type: Some("House".to_string()),
            pets_allowed: false,
            smoking_allowed: false,
            is_live: true,
        }
    }

    fn viewport() -> Bounds {
        Bounds::new(LatLng::new(-1.0, -1.0), LatLng::new(1.0, 1.0))
    }

    #[test]
    fn test_price_window_must_contain_both_bounds() {
        let listing = create_listing(1, 0.0, 0.0, 100.0, 200.0);
        let mut criteria = CriteriaStore::new(&[listing.clone()]);

        criteria.set_price_window(50.0, 250.0);
        assert!(passes_filters(&listing, &criteria));

        criteria.set_price_window(150.0, 180.0);
        assert!(!passes_filters(&listing, &criteria));

        criteria.set_price_window(0.0, 90.0);
        assert!(!passes_filters(&listing, &criteria));
    }

    #[test]
    fn test_type_filter() {
        let mut cabin = create_listing(1, 0.0, 0.0, 100.0, 200.0);
        cabin.property_type = Some("Cabin".to_string());
        let mut untyped = create_listing(2, 0.0, 0.0, 100.0, 200.0);
        untyped.property_type = None;

        let mut criteria = CriteriaStore::new(&[cabin.clone(), untyped.clone()]);
        assert!(passes_filters(&untyped, &criteria));

        criteria.toggle_type("Cabin");
        assert!(passes_filters(&cabin, &criteria));
        assert!(!passes_filters(&untyped, &criteria));
    }

    #[test]
    fn test_amenity_filters() {
        let mut listing = create_listing(1, 0.0, 0.0, 100.0, 200.0);
        let mut criteria = CriteriaStore::new(&[listing.clone()]);

        criteria.toggle_pets();
        assert!(!passes_filters(&listing, &criteria));
        listing.pets_allowed = true;
        assert!(passes_filters(&listing, &criteria));

        criteria.toggle_smoking();
        assert!(!passes_filters(&listing, &criteria));
        listing.smoking_allowed = true;
        assert!(passes_filters(&listing, &criteria));
    }

    #[test]
    fn test_viewport_clause() {
        let predicates = Predicates::default();
        let inside = create_listing(1, 0.5, 0.5, 100.0, 200.0);
        let outside = create_listing(2, 5.0, 5.0, 100.0, 200.0);
        let criteria = CriteriaStore::new(&[inside.clone(), outside.clone()]);

        assert!(predicates.is_visible(&inside, &criteria, Some(&viewport())));
        assert!(!predicates.is_visible(&outside, &criteria, Some(&viewport())));
        // Without a map nothing is excluded geographically
        assert!(predicates.is_visible(&outside, &criteria, None));
        // Markers ignore the viewport
        assert!(predicates.marker_visible(&outside, &criteria));
    }

    #[test]
    fn test_radius_replaces_viewport_in_location_only_mode() {
        let predicates = Predicates::default();
        let near = create_listing(1, 0.0, 0.2, 100.0, 200.0);
        let far = create_listing(2, 0.0, 1.0, 100.0, 200.0);
        let mut criteria = CriteriaStore::new(&[near.clone(), far.clone()]);
        let ticket = criteria.begin_geocode();
        criteria.apply_geocode(ticket, Some(LatLng::new(0.0, 0.0)));

        // A viewport that excludes both is ignored in location-only mode
        let elsewhere = Bounds::new(LatLng::new(10.0, 10.0), LatLng::new(11.0, 11.0));
        assert!(predicates.is_visible(&near, &criteria, Some(&elsewhere)));
        assert!(!predicates.is_visible(&far, &criteria, Some(&elsewhere)));

        // Once availability is checked the viewport applies again
        let ticket = criteria.begin_availability_check();
        criteria.apply_availability(ticket, Some(HashSet::from([1, 2])));
        assert!(!predicates.is_visible(&near, &criteria, Some(&elsewhere)));
        assert!(predicates.is_visible(&far, &criteria, Some(&viewport())));
    }

    #[test]
    fn test_missing_position_only_visible_without_map() {
        let predicates = Predicates::default();
        let mut listing = create_listing(1, 0.0, 0.0, 100.0, 200.0);
        listing.latitude = None;
        let mut criteria = CriteriaStore::new(&[listing.clone()]);

        assert!(predicates.is_visible(&listing, &criteria, None));
        assert!(!predicates.is_visible(&listing, &criteria, Some(&Bounds::world())));
        assert!(!predicates.marker_visible(&listing, &criteria));

        // Radius is skipped for it in a location-only static list
        let ticket = criteria.begin_geocode();
        criteria.apply_geocode(ticket, Some(LatLng::new(40.0, -80.0)));
        assert!(predicates.is_visible(&listing, &criteria, None));

        // Other filters still apply
        criteria.toggle_pets();
        assert!(!predicates.is_visible(&listing, &criteria, None));
    }

    #[test]
    fn test_live_only() {
        let live = create_listing(1, 0.0, 0.0, 1.0, 2.0);
        let mut dead = create_listing(2, 0.0, 0.0, 1.0, 2.0);
        dead.is_live = false;

        let filtered = live_only(vec![live, dead]);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.iter().all(|l| l.is_live));
    }
}
