//! BRouter HTTP adapter for routed paths.
//!
//! Requests `format=geojson` and reads the first feature's `LineString`
//! plus its `track-length` property.

use std::time::Duration;

use serde::Deserialize;

use crate::polyline::RouteGeometry;
use crate::traits::{Router, RouterResponse};

#[derive(Debug, Clone)]
pub struct BrouterConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for BrouterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://brouter.de/brouter".to_string(),
            profile: "trekking".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrouterClient {
    config: BrouterConfig,
    client: reqwest::Client,
}

impl BrouterClient {
    pub fn new(config: BrouterConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BrouterConfig {
        &self.config
    }
}

impl Router for BrouterClient {
    async fn query(&self, points: &[(f64, f64)], profile: &str) -> RouterResponse {
        let lonlats = points
            .iter()
            .map(|(lon, lat)| format!("{:.6},{:.6}", lon, lat))
            .collect::<Vec<_>>()
            .join("|");

        let request = self.client.get(&self.config.base_url).query(&[
            ("lonlats", lonlats.as_str()),
            ("profile", profile),
            ("alternativeidx", "0"),
            ("format", "geojson"),
        ]);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("BRouter request failed: {err}");
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

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "BRouter returned an error");
            return RouterResponse::HttpError {
                status: Some(status.as_u16()),
                message: error_message(&body),
            };
        }

        parse_geojson(&body)
    }
}

/// Converts a BRouter GeoJSON body into a [`RouterResponse`].
///
/// Anything that is not a feature collection with a usable first feature is
/// [`RouterResponse::Empty`].
pub fn parse_geojson(body: &str) -> RouterResponse {
    let collection: FeatureCollection = match serde_json::from_str(body) {
        Ok(collection) => collection,
        Err(err) => {
            tracing::warn!("undecodable BRouter body: {err}");
            return RouterResponse::Empty;
        }
    };

    let Some(feature) = collection.features.into_iter().next() else {
        return RouterResponse::Empty;
    };
    if feature.geometry.kind != "LineString" {
        return RouterResponse::Empty;
    }

    let vertices: Option<Vec<(f64, f64)>> = feature
        .geometry
        .coordinates
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Some((*lon, *lat)),
            _ => None,
        })
        .collect();
    let Some(vertices) = vertices.filter(|v| v.len() >= 2) else {
        return RouterResponse::Empty;
    };

    let geometry = RouteGeometry::new(vertices);
    let length_m = feature
        .properties
        .track_length
        .and_then(|length| length.meters())
        .unwrap_or_else(|| geometry.length_m());

    RouterResponse::Success { geometry, length_m }
}

pub(crate) fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response".to_string();
    }
    trimmed.chars().take(200).collect()
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(rename = "track-length")]
    track_length: Option<TrackLength>,
}

// BRouter reports numbers as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TrackLength {
    Number(f64),
    Text(String),
}

impl TrackLength {
    fn meters(&self) -> Option<f64> {
        let value = match self {
            TrackLength::Number(value) => Some(*value),
            TrackLength::Text(text) => text.trim().parse::<f64>().ok(),
        };
        value.filter(|value| value.is_finite() && *value >= 0.0)
    }
}
