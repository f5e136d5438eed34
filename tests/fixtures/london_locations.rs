//! Central London locations for walking-route fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

pub const TRAFALGAR_SQUARE: Location = Location::new("Trafalgar Square", 51.5074, -0.1278);
pub const WESTMINSTER_BRIDGE: Location = Location::new("Westminster Bridge", 51.5007, -0.1246);
pub const LONDON_EYE: Location = Location::new("London Eye", 51.5033, -0.1196);
pub const COVENT_GARDEN: Location = Location::new("Covent Garden", 51.5117, -0.1240);
pub const ST_PAULS: Location = Location::new("St Paul's Cathedral", 51.5138, -0.0984);

/// A short riverside walk, in order.
pub const RIVERSIDE_WALK: &[Location] = &[
    TRAFALGAR_SQUARE,
    WESTMINSTER_BRIDGE,
    LONDON_EYE,
    COVENT_GARDEN,
    ST_PAULS,
];
