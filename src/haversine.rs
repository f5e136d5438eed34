//! Great-circle distances and walking time estimates.
//!
//! Uses a spherical Earth, so results carry the usual haversine error
//! (ignores the ellipsoid) but need no network access.

use crate::polyline::RouteGeometry;

/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Average walking speed assumption for time estimation.
pub const DEFAULT_WALKING_SPEED_KMH: f64 = 5.0;

/// Haversine distance between two (latitude, longitude) points in meters.
pub fn haversine_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Sum of haversine distances over consecutive (longitude, latitude) vertices.
pub fn path_length_m(geometry: &RouteGeometry) -> f64 {
    geometry
        .vertices()
        .windows(2)
        .map(|pair| {
            let (lon1, lat1) = pair[0];
            let (lon2, lat2) = pair[1];
            haversine_m((lat1, lon1), (lat2, lon2))
        })
        .sum()
}

/// Converts distances into walking minutes at a fixed pace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkingEstimator {
    /// Assumed walking speed in km/h.
    pub speed_kmh: f64,
}

impl Default for WalkingEstimator {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_WALKING_SPEED_KMH,
        }
    }
}

impl WalkingEstimator {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Walking time in whole minutes, rounding halves up.
    pub fn minutes_for(&self, meters: f64) -> u32 {
        let minutes = meters.max(0.0) / 1000.0 / self.speed_kmh * 60.0;
        (minutes + 0.5).floor() as u32
    }
}
