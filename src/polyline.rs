//! Polyline representation for route geometries.
//!
//! Vertices are stored as (longitude, latitude) pairs, the order routers
//! return them in and the order map views draw them in.

use serde::{Deserialize, Serialize};

use crate::haversine;
use crate::waypoints::Waypoint;

/// A route geometry as an ordered list of (longitude, latitude) vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    vertices: Vec<(f64, f64)>,
}

impl RouteGeometry {
    /// Creates a geometry from (longitude, latitude) vertices.
    pub fn new(vertices: Vec<(f64, f64)>) -> Self {
        Self { vertices }
    }

    /// Straight segments through the waypoints, reprojected to (lon, lat).
    pub fn from_waypoints(waypoints: &[Waypoint]) -> Self {
        Self::new(waypoints.iter().map(Waypoint::lon_lat).collect())
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    pub fn into_vertices(self) -> Vec<(f64, f64)> {
        self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Great-circle length of the polyline in meters.
    pub fn length_m(&self) -> f64 {
        haversine::path_length_m(self)
    }
}
