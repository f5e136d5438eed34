//! Test fixtures for route-planner.
//!
//! Provides:
//! - Real central London locations (from OpenStreetMap)
//! - Recording map view / location collaborators
//! - Scripted routers with controllable latency and answers

#![allow(dead_code)]

pub mod london_locations;
pub mod recorders;

pub use london_locations::*;
pub use recorders::*;
