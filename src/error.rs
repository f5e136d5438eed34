//! Error types for the route planner.
//!
//! Every error here is local and recoverable. The `Display` text is what the
//! map view shows to the user.

use thiserror::Error;

/// Errors from editing the waypoint sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaypointError {
    #[error("invalid coordinate ({lat}, {lng}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinate { lat: f64, lng: f64 },
    #[error("waypoint index {index} is out of range (route has {len} waypoints)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors from turning waypoints into a route geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("at least 2 waypoints are needed to build a route")]
    InsufficientWaypoints,
    #[error("could not find a route between these points: {0}")]
    NoRouteFound(String),
    #[error("routing service unavailable: {0}")]
    NetworkFailure(String),
}

/// Errors from decoding a shared route token.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("route link is not valid base64: {0}")]
    InvalidEncoding(String),
    #[error("route link is malformed: {0}")]
    Malformed(String),
    #[error("route link contains no waypoints")]
    NoWaypoints,
    #[error("route link contains an invalid coordinate: {0}")]
    InvalidCoordinate(#[from] WaypointError),
}

/// Errors from reading planner configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}
