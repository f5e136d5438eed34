//! Turns a waypoint sequence into a route geometry.
//!
//! Direct mode joins the waypoints with straight segments and never fails
//! once there are two of them. Routed mode asks one routing service for a
//! path through every waypoint, bounded by a timeout. Nothing is retried.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::haversine;
use crate::polyline::RouteGeometry;
use crate::traits::{Router, RouterResponse};
use crate::waypoints::Waypoint;

/// How waypoints are joined into a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RouteMode {
    /// Straight segments between waypoints.
    #[serde(rename = "direct")]
    Direct,
    /// Paths computed by the routing service.
    #[default]
    #[serde(rename = "auto")]
    Routed,
}

impl std::str::FromStr for RouteMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "direct" => Ok(RouteMode::Direct),
            "routed" | "auto" => Ok(RouteMode::Routed),
            other => Err(format!("unknown route mode {other:?} (expected direct or routed)")),
        }
    }
}

/// A resolved route geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub geometry: RouteGeometry,
    /// Track length reported by the routing service, if one was used.
    pub reported_length_m: Option<f64>,
}

impl ResolvedRoute {
    /// Distance to display: the service's own figure when it gave one,
    /// otherwise the great-circle length of the geometry.
    pub fn distance_m(&self) -> f64 {
        self.reported_length_m
            .unwrap_or_else(|| haversine::path_length_m(&self.geometry))
    }

    pub fn haversine_length_m(&self) -> f64 {
        haversine::path_length_m(&self.geometry)
    }
}

#[derive(Debug, Clone)]
pub struct RouteResolver<R> {
    router: R,
    profile: String,
    timeout: Duration,
}

impl<R: Router> RouteResolver<R> {
    pub fn new(router: R, profile: impl Into<String>, timeout: Duration) -> Self {
        Self {
            router,
            profile: profile.into(),
            timeout,
        }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn resolve(
        &self,
        waypoints: &[Waypoint],
        mode: RouteMode,
    ) -> Result<ResolvedRoute, RouteError> {
        match mode {
            RouteMode::Direct => Self::resolve_direct(waypoints),
            RouteMode::Routed => self.resolve_routed(waypoints).await,
        }
    }

    /// Straight-line route, no network access.
    pub fn resolve_direct(waypoints: &[Waypoint]) -> Result<ResolvedRoute, RouteError> {
        if waypoints.len() < 2 {
            return Err(RouteError::InsufficientWaypoints);
        }
        Ok(ResolvedRoute {
            geometry: RouteGeometry::from_waypoints(waypoints),
            reported_length_m: None,
        })
    }

    async fn resolve_routed(&self, waypoints: &[Waypoint]) -> Result<ResolvedRoute, RouteError> {
        if waypoints.len() < 2 {
            return Err(RouteError::InsufficientWaypoints);
        }

        let points: Vec<(f64, f64)> = waypoints.iter().map(Waypoint::lon_lat).collect();
        tracing::debug!(
            waypoints = points.len(),
            profile = %self.profile,
            "querying router"
        );

        let response = tokio::time::timeout(self.timeout, self.router.query(&points, &self.profile))
            .await
            .map_err(|_| {
                RouteError::NetworkFailure(format!(
                    "no response within {} s",
                    self.timeout.as_secs_f64()
                ))
            })?;

        match response {
            RouterResponse::Success { geometry, length_m } if geometry.len() >= 2 => {
                tracing::debug!(length_m, vertices = geometry.len(), "route found");
                Ok(ResolvedRoute {
                    geometry,
                    reported_length_m: Some(length_m),
                })
            }
            RouterResponse::Success { .. } => Err(RouteError::NoRouteFound(
                "the routing service returned a degenerate path".to_string(),
            )),
            RouterResponse::Empty => Err(RouteError::NoRouteFound(
                "no connected path exists between the waypoints".to_string(),
            )),
            RouterResponse::HttpError {
                status: Some(status),
                message,
            } => Err(RouteError::NetworkFailure(format!("HTTP {status}: {message}"))),
            RouterResponse::HttpError {
                status: None,
                message,
            } => Err(RouteError::NetworkFailure(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRouter(RouterResponse);

    impl Router for FixedRouter {
        async fn query(&self, _points: &[(f64, f64)], _profile: &str) -> RouterResponse {
            self.0.clone()
        }
    }

    struct SlowRouter;

    impl Router for SlowRouter {
        async fn query(&self, _points: &[(f64, f64)], _profile: &str) -> RouterResponse {
            tokio::time::sleep(Duration::from_secs(60)).await;
            RouterResponse::Empty
        }
    }

    fn london() -> Vec<Waypoint> {
        vec![
            Waypoint::new(51.5074, -0.1278).unwrap(),
            Waypoint::new(51.5007, -0.1246).unwrap(),
        ]
    }

    fn resolver(response: RouterResponse) -> RouteResolver<FixedRouter> {
        RouteResolver::new(FixedRouter(response), "trekking", Duration::from_secs(5))
    }

    #[test]
    fn test_direct_geometry_is_waypoints() {
        let route = RouteResolver::<FixedRouter>::resolve_direct(&london()).unwrap();
        assert_eq!(
            route.geometry.vertices(),
            &[(-0.1278, 51.5074), (-0.1246, 51.5007)]
        );
        assert_eq!(route.reported_length_m, None);
        assert!((route.distance_m() - 777.2).abs() < 5.0);
    }

    #[test]
    fn test_direct_needs_two_waypoints() {
        let one = vec![Waypoint::new(51.5, -0.1).unwrap()];
        assert_eq!(
            RouteResolver::<FixedRouter>::resolve_direct(&one),
            Err(RouteError::InsufficientWaypoints)
        );
    }

    #[tokio::test]
    async fn test_routed_trusts_reported_length() {
        let geometry = RouteGeometry::new(vec![(-0.1278, 51.5074), (-0.126, 51.503), (-0.1246, 51.5007)]);
        let resolver = resolver(RouterResponse::Success {
            geometry: geometry.clone(),
            length_m: 910.0,
        });
        let route = resolver.resolve(&london(), RouteMode::Routed).await.unwrap();
        assert_eq!(route.geometry, geometry);
        assert_eq!(route.distance_m(), 910.0);
        assert!(route.haversine_length_m() < 910.0);
    }

    #[tokio::test]
    async fn test_routed_empty_is_no_route() {
        let resolver = resolver(RouterResponse::Empty);
        let result = resolver.resolve(&london(), RouteMode::Routed).await;
        assert!(matches!(result, Err(RouteError::NoRouteFound(_))));
    }

    #[tokio::test]
    async fn test_routed_single_vertex_is_no_route() {
        let resolver = resolver(RouterResponse::Success {
            geometry: RouteGeometry::new(vec![(-0.1278, 51.5074)]),
            length_m: 0.0,
        });
        let result = resolver.resolve(&london(), RouteMode::Routed).await;
        assert!(matches!(result, Err(RouteError::NoRouteFound(_))));
    }

    #[tokio::test]
    async fn test_routed_http_error_is_network_failure() {
        let resolver = resolver(RouterResponse::HttpError {
            status: Some(503),
            message: "unavailable".to_string(),
        });
        let result = resolver.resolve(&london(), RouteMode::Routed).await;
        assert_eq!(
            result,
            Err(RouteError::NetworkFailure("HTTP 503: unavailable".to_string()))
        );
    }

    #[tokio::test]
    async fn test_routed_needs_two_waypoints() {
        let resolver = resolver(RouterResponse::Empty);
        let result = resolver.resolve(&london()[..1], RouteMode::Routed).await;
        assert_eq!(result, Err(RouteError::InsufficientWaypoints));
    }

    #[tokio::test(start_paused = true)]
    async fn test_routed_timeout_is_network_failure() {
        let resolver = RouteResolver::new(SlowRouter, "trekking", Duration::from_secs(2));
        let result = resolver.resolve(&london(), RouteMode::Routed).await;
        assert!(matches!(result, Err(RouteError::NetworkFailure(_))));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("direct".parse::<RouteMode>(), Ok(RouteMode::Direct));
        assert_eq!("auto".parse::<RouteMode>(), Ok(RouteMode::Routed));
        assert!("walk".parse::<RouteMode>().is_err());
    }
}
