//! Spherical-earth geodesy.
//!
//! Both functions treat the earth as a sphere of radius [`EARTH_RADIUS_KM`].
//! Over the short hops used for path simulation the error against an
//! ellipsoidal model is well under a metre per step.

use crate::Coordinate;

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Solves the direct geodesic problem on a sphere.
///
/// Starting at `origin`, travels `distance_km` along the great circle that
/// leaves `origin` at `bearing_degrees` (compass convention: `0` is north,
/// `90` is east, clockwise) and returns the point reached.
///
/// The returned longitude is not normalized; repeatedly stepping east will
/// produce values past `180`. Call [`Coordinate::wrapped`] if a canonical
/// range is needed.
///
/// # Example
/// ```
/// use roam::{destination, Coordinate, EARTH_RADIUS_KM};
///
/// // One degree of arc due north from the equator.
/// let one_degree_km = EARTH_RADIUS_KM * core::f64::consts::PI / 180.0;
/// let p = destination(Coordinate::new(0.0, 0.0), 0.0, one_degree_km);
/// assert!((p.latitude - 1.0).abs() < 1e-9);
/// assert_eq!(p.longitude, 0.0);
/// ```
#[must_use]
pub fn destination(origin: Coordinate, bearing_degrees: f64, distance_km: f64) -> Coordinate {
    let lat = origin.latitude.to_radians();
    let lng = origin.longitude.to_radians();
    let bearing = bearing_degrees.to_radians();
    let distance_ratio = distance_km / EARTH_RADIUS_KM;

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_d, cos_d) = distance_ratio.sin_cos();

    let new_lat = (sin_lat * cos_d + cos_lat * sin_d * bearing.cos()).asin();
    let new_lng =
        lng + (bearing.sin() * sin_d * cos_lat).atan2(cos_d - sin_lat * new_lat.sin());

    Coordinate::new(new_lat.to_degrees(), new_lng.to_degrees())
}

/// Great-circle distance between two points, in kilometres (haversine).
///
/// # Example
/// ```
/// use roam::{haversine_distance, Coordinate};
///
/// let a = Coordinate::new(12.9177, 77.6238);
/// assert_eq!(haversine_distance(a, a), 0.0);
/// ```
#[must_use]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = lat_b - lat_a;
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
