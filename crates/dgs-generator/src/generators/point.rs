//! Geographic point generator.

use dgs_core::Point;
use rand::Rng;
use std::f64::consts::PI;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Generate a random point within `radius_km` of `(lat, lon)`.
///
/// Picks a uniform bearing and distance, then applies the spherical
/// destination formula. The longitude is normalised to `[-180, 180]`.
pub fn generate_point<R: Rng + ?Sized>(rng: &mut R, lat: f64, lon: f64, radius_km: f64) -> Point {
    if radius_km <= 0.0 {
        return Point::new(lat, lon);
    }

    let bearing = rng.random_range(0.0..2.0 * PI);
    let angular = rng.random_range(0.0..=radius_km) / EARTH_RADIUS_KM;

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    let lon2 = (lon2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    Point::new(lat2.to_degrees(), lon2)
}

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: Point, b: Point) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
