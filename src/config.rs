//! Planner configuration.
//!
//! Defaults match the public services the site uses. `from_env` overlays
//! `ROUTE_PLANNER_*` variables on top of the defaults.

use std::env;
use std::time::Duration;

use crate::brouter::BrouterConfig;
use crate::error::ConfigError;
use crate::haversine::DEFAULT_WALKING_SPEED_KMH;
use crate::osrm::OsrmConfig;

/// Which routing service answers routed-mode queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterKind {
    #[default]
    Brouter,
    Osrm,
}

impl std::str::FromStr for RouterKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "brouter" => Ok(RouterKind::Brouter),
            "osrm" => Ok(RouterKind::Osrm),
            other => Err(format!("unknown router {other:?} (expected brouter or osrm)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub router: RouterKind,
    pub brouter: BrouterConfig,
    pub osrm: OsrmConfig,
    /// Assumed walking speed in km/h.
    pub walking_speed_kmh: f64,
    /// Upper bound on one routed resolution, transport timeouts included.
    pub resolve_timeout_secs: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            router: RouterKind::default(),
            brouter: BrouterConfig::default(),
            osrm: OsrmConfig::default(),
            walking_speed_kmh: DEFAULT_WALKING_SPEED_KMH,
            resolve_timeout_secs: 20,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("ROUTE_PLANNER_ROUTER") {
            config.router = parse_value("ROUTE_PLANNER_ROUTER", &value)?;
        }
        if let Some(value) = lookup("ROUTE_PLANNER_BASE_URL") {
            config.set_base_url(value);
        }
        if let Some(value) = lookup("ROUTE_PLANNER_PROFILE") {
            config.set_profile(value);
        }
        if let Some(value) = lookup("ROUTE_PLANNER_TIMEOUT_SECS") {
            let secs: u64 = parse_value("ROUTE_PLANNER_TIMEOUT_SECS", &value)?;
            config.resolve_timeout_secs = secs;
            config.brouter.timeout_secs = secs;
            config.osrm.timeout_secs = secs;
        }
        if let Some(value) = lookup("ROUTE_PLANNER_WALKING_SPEED_KMH") {
            let speed: f64 = parse_value("ROUTE_PLANNER_WALKING_SPEED_KMH", &value)?;
            if !(speed.is_finite() && speed > 0.0) {
                return Err(ConfigError::InvalidValue {
                    key: "ROUTE_PLANNER_WALKING_SPEED_KMH".to_string(),
                    value,
                });
            }
            config.walking_speed_kmh = speed;
        }

        Ok(config)
    }

    /// Sets the base URL of the selected router.
    pub fn set_base_url(&mut self, base_url: String) {
        let base_url = base_url.trim_end_matches('/').to_string();
        match self.router {
            RouterKind::Brouter => self.brouter.base_url = base_url,
            RouterKind::Osrm => self.osrm.base_url = base_url,
        }
    }

    /// Sets the profile of the selected router.
    pub fn set_profile(&mut self, profile: String) {
        match self.router {
            RouterKind::Brouter => self.brouter.profile = profile,
            RouterKind::Osrm => self.osrm.profile = profile,
        }
    }

    /// Profile name of the selected router.
    pub fn profile(&self) -> &str {
        match self.router {
            RouterKind::Brouter => &self.brouter.profile,
            RouterKind::Osrm => &self.osrm.profile,
        }
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
