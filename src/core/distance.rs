use crate::models::{Bounds, LatLng};

/// Earth's radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Miles per degree of latitude for the radius above
const MILES_PER_DEGREE: f64 = EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0;

/// Calculate the Haversine distance between two points in miles
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in miles
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Haversine distance between two points in miles
#[inline]
pub fn distance_between(a: LatLng, b: LatLng) -> f64 {
    haversine_distance(a.lat, a.lng, b.lat, b.lng)
}

/// Calculate a bounding box around a center point
///
/// Cheaper than Haversine, used to reject far away listings before the
/// exact radius test. Longitude spread widens with latitude.
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_miles: f64) -> Bounds {
    let lat_delta = radius_miles / MILES_PER_DEGREE;
    let lon_delta = radius_miles / (MILES_PER_DEGREE * lat.to_radians().cos().abs().max(1e-6));

    Bounds::new(
        LatLng::new(lat - lat_delta, lon - lon_delta),
        LatLng::new(lat + lat_delta, lon + lon_delta),
    )
}

/// True when `point` lies within `radius_miles` great-circle miles of `origin`
#[inline]
pub fn is_within_radius(origin: LatLng, point: LatLng, radius_miles: f64) -> bool {
    if !calculate_bounding_box(origin.lat, origin.lng, radius_miles).contains(point) {
        return false;
    }
    distance_between(origin, point) <= radius_miles
}
