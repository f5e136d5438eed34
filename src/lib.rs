//! route-planner core
//!
//! Waypoint editing, route resolution (straight lines or a remote routing
//! service), distance/time metrics and shareable route links for a walking
//! route planner. Map rendering and the routing service itself are
//! collaborators behind the traits in [`traits`].

pub mod backend;
pub mod brouter;
pub mod codec;
pub mod config;
pub mod error;
pub mod haversine;
pub mod metrics;
pub mod osrm;
pub mod polyline;
pub mod resolver;
pub mod session;
pub mod traits;
pub mod waypoints;
