//! OSRM HTTP adapter for routed paths.

use std::time::Duration;

use serde::Deserialize;

use crate::brouter::error_message;
use crate::polyline::RouteGeometry;
use crate::traits::{Router, RouterResponse};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "foot".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }
}

impl Router for OsrmClient {
    async fn query(&self, points: &[(f64, f64)], profile: &str) -> RouterResponse {
        let coords = points
            .iter()
            .map(|(lon, lat)| format!("{:.6},{:.6}", lon, lat))
            .collect::<Vec<_>>()
            .join(";");

        // snapping=any lets footpaths and tracks match, not only main roads.
        let url = format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson&continue_straight=false&snapping=any",
            self.config.base_url, profile, coords
        );

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("OSRM request failed: {err}");
                return RouterResponse::HttpError {
                    status: None,
                    message: err.to_string(),
                };
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                return RouterResponse::HttpError {
                    status: Some(status.as_u16()),
                    message: err.to_string(),
                };
            }
        };

        // OSRM answers NoRoute / NoSegment with a 400 and a JSON code.
        if status.as_u16() == 400 && is_no_route(&body) {
            return RouterResponse::Empty;
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "OSRM returned an error");
            return RouterResponse::HttpError {
                status: Some(status.as_u16()),
                message: error_message(&body),
            };
        }

        parse_route(&body)
    }
}

/// Converts an OSRM `route` body into a [`RouterResponse`].
pub fn parse_route(body: &str) -> RouterResponse {
    let Ok(parsed) = serde_json::from_str::<OsrmRouteResponse>(body) else {
        return RouterResponse::Empty;
    };
    if parsed.code != "Ok" {
        tracing::debug!(code = %parsed.code, "OSRM found no route");
        return RouterResponse::Empty;
    }

    let Some(route) = parsed.routes.into_iter().next() else {
        return RouterResponse::Empty;
    };
    let vertices: Option<Vec<(f64, f64)>> = route
        .geometry
        .coordinates
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Some((*lon, *lat)),
            _ => None,
        })
        .collect();

    match vertices {
        Some(vertices) if vertices.len() >= 2 => RouterResponse::Success {
            geometry: RouteGeometry::new(vertices),
            length_m: route.distance,
        },
        _ => RouterResponse::Empty,
    }
}

fn is_no_route(body: &str) -> bool {
    serde_json::from_str::<OsrmRouteResponse>(body)
        .map(|parsed| matches!(parsed.code.as_str(), "NoRoute" | "NoSegment"))
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<Vec<f64>>,
}
