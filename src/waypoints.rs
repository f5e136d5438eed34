//! User-placed waypoints and the ordered store that owns them.

use crate::error::WaypointError;

/// A validated geographic point placed by the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    lat: f64,
    lng: f64,
}

impl Waypoint {
    /// Creates a waypoint, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, WaypointError> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);
        if lat_ok && lng_ok {
            Ok(Self { lat, lng })
        } else {
            Err(WaypointError::InvalidCoordinate { lat, lng })
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// (latitude, longitude) pair, the order the distance engine takes.
    pub fn lat_lng(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    /// (longitude, latitude) pair, the vertex order of route geometries.
    pub fn lon_lat(&self) -> (f64, f64) {
        (self.lng, self.lat)
    }
}

/// Ordered waypoint sequence. Insertion order is traversal order.
///
/// `revision` increases on every successful mutation so owners can tell
/// whether the sequence changed since they last looked.
#[derive(Debug, Clone, Default)]
pub struct WaypointStore {
    points: Vec<Waypoint>,
    revision: u64,
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a point and returns the new length.
    pub fn add(&mut self, lat: f64, lng: f64) -> Result<usize, WaypointError> {
        let waypoint = Waypoint::new(lat, lng)?;
        self.points.push(waypoint);
        self.revision += 1;
        Ok(self.points.len())
    }

    /// Replaces the point at `index`.
    pub fn move_at(&mut self, index: usize, lat: f64, lng: f64) -> Result<(), WaypointError> {
        let len = self.points.len();
        let waypoint = Waypoint::new(lat, lng)?;
        let slot = self
            .points
            .get_mut(index)
            .ok_or(WaypointError::IndexOutOfRange { index, len })?;
        *slot = waypoint;
        self.revision += 1;
        Ok(())
    }

    /// Pops the last point. An empty store is left untouched and yields `None`.
    pub fn remove_last(&mut self) -> Option<Waypoint> {
        let removed = self.points.pop()?;
        self.revision += 1;
        Some(removed)
    }

    pub fn clear(&mut self) {
        if !self.points.is_empty() {
            self.points.clear();
            self.revision += 1;
        }
    }

    /// Replaces the whole sequence, e.g. when restoring a shared route.
    pub fn replace_all(&mut self, points: Vec<Waypoint>) {
        self.points = points;
        self.revision += 1;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[Waypoint] {
        &self.points
    }

    /// Owned copy handed to resolvers and the codec.
    pub fn snapshot(&self) -> Vec<Waypoint> {
        self.points.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
