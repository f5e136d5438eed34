//! Display units and derived route metrics.

use serde::{Deserialize, Serialize};

use crate::haversine::WalkingEstimator;

/// Meters per statute mile, as used by the distance display.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Distance units. Only affects formatting, never stored geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Units {
    #[default]
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "mi")]
    Miles,
}

impl Units {
    pub fn label(self) -> &'static str {
        match self {
            Units::Kilometers => "km",
            Units::Miles => "mi",
        }
    }

    /// Converts meters into this unit.
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            Units::Kilometers => meters / 1000.0,
            Units::Miles => meters / METERS_PER_MILE,
        }
    }

    /// Distance with two decimals, e.g. `"0.78"`.
    pub fn format(self, meters: f64) -> String {
        format!("{:.2}", self.from_meters(meters))
    }
}

impl std::str::FromStr for Units {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "km" | "kilometers" => Ok(Units::Kilometers),
            "mi" | "miles" => Ok(Units::Miles),
            other => Err(format!("unknown units {other:?} (expected km or mi)")),
        }
    }
}

/// Distance and walking time for the displayed route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetrics {
    pub total_distance_m: f64,
    pub walking_time_minutes: u32,
}

impl RouteMetrics {
    pub fn from_distance(total_distance_m: f64, walking: &WalkingEstimator) -> Self {
        Self {
            total_distance_m,
            walking_time_minutes: walking.minutes_for(total_distance_m),
        }
    }

    pub fn zero() -> Self {
        Self {
            total_distance_m: 0.0,
            walking_time_minutes: 0,
        }
    }

    pub fn distance_label(&self, units: Units) -> String {
        units.format(self.total_distance_m)
    }

    pub fn time_label(&self) -> String {
        format_walking_time(self.walking_time_minutes)
    }
}

/// `"9 min"` under an hour, `"1h 5min"` from an hour up.
pub fn format_walking_time(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        format!("{hours}h {rest}min")
    } else {
        format!("{rest} min")
    }
}
