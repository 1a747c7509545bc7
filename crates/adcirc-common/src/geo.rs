//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (spherical approximation).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Build from a (lat, lon) pair, the order most field notes use.
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self { lon, lat }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self.lon, self.lat, other.lon, other.lat)
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Calculate the haversine distance between two points in meters.
pub fn haversine_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points. `clamp`
    // keeps NaN, so a missing coordinate never looks like a real distance.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}
