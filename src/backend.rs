//! Routing service chosen at runtime from configuration.

use crate::brouter::BrouterClient;
use crate::config::{PlannerConfig, RouterKind};
use crate::osrm::OsrmClient;
use crate::resolver::RouteResolver;
use crate::traits::{Router, RouterResponse};

#[derive(Debug, Clone)]
pub enum RouterBackend {
    Brouter(BrouterClient),
    Osrm(OsrmClient),
}

impl RouterBackend {
    pub fn from_config(config: &PlannerConfig) -> Result<Self, reqwest::Error> {
        Ok(match config.router {
            RouterKind::Brouter => RouterBackend::Brouter(BrouterClient::new(config.brouter.clone())?),
            RouterKind::Osrm => RouterBackend::Osrm(OsrmClient::new(config.osrm.clone())?),
        })
    }
}

impl Router for RouterBackend {
    async fn query(&self, points: &[(f64, f64)], profile: &str) -> RouterResponse {
        match self {
            RouterBackend::Brouter(client) => client.query(points, profile).await,
            RouterBackend::Osrm(client) => client.query(points, profile).await,
        }
    }
}

/// Resolver for the configured router, profile and timeout.
pub fn resolver_from_config(
    config: &PlannerConfig,
) -> Result<RouteResolver<RouterBackend>, reqwest::Error> {
    let backend = RouterBackend::from_config(config)?;
    Ok(RouteResolver::new(
        backend,
        config.profile(),
        config.resolve_timeout(),
    ))
}
