//! Spatial query utilities for distance calculations.
//!
//! Uses the Haversine formula on a sphere with the WGS84 equatorial radius.
//! Points are `geo::Point` in (lon, lat) degree order.

use geo::Point;

/// Earth radius in meters (WGS84 equatorial)
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Great-circle distance between two points in meters
pub fn distance(p1: Point, p2: Point) -> f64 {
    haversine(p1.y(), p1.x(), p2.y(), p2.x())
}

/// Distance in meters between the two longitudes, measured along the equator.
///
/// Only used to bound search windows; see [`window_bound`].
pub fn longitude_bound_distance(p1: Point, p2: Point) -> f64 {
    haversine(0.0, p1.x(), 0.0, p2.x())
}

/// Largest `longitude_bound_distance` two points can have while their true
/// `distance` is within `radius_m`, given neither lies beyond `max_abs_lat`.
///
/// From the haversine identity, sin(d/2R) >= cos(max_abs_lat) * sin(d0/2R)
/// where d0 is the equatorial longitude distance. Returns infinity when the
/// bound degenerates (points near a pole).
pub fn window_bound(radius_m: f64, max_abs_lat: f64) -> f64 {
    let cos_lat = max_abs_lat.abs().min(90.0).to_radians().cos();
    let half_angle = radius_m / (2.0 * EARTH_RADIUS_M);

    if half_angle >= std::f64::consts::FRAC_PI_2 || cos_lat <= f64::EPSILON {
        return f64::INFINITY;
    }

    let s = half_angle.sin() / cos_lat;
    if s >= 1.0 {
        return f64::INFINITY;
    }
    2.0 * EARTH_RADIUS_M * s.asin()
}
