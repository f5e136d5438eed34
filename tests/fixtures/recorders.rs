//! Recording collaborators for session tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use route_planner::polyline::RouteGeometry;
use route_planner::traits::{MapView, RouteLocation, Router, RouterResponse};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Render(RouteGeometry),
    Clear,
    Metrics {
        distance: String,
        unit: String,
        time: String,
    },
    Error(String),
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub calls: Vec<ViewCall>,
}

impl RecordingView {
    pub fn last_rendered(&self) -> Option<&RouteGeometry> {
        self.calls.iter().rev().find_map(|call| match call {
            ViewCall::Render(geometry) => Some(geometry),
            _ => None,
        })
    }

    pub fn last_metrics(&self) -> Option<(&str, &str, &str)> {
        self.calls.iter().rev().find_map(|call| match call {
            ViewCall::Metrics {
                distance,
                unit,
                time,
            } => Some((distance.as_str(), unit.as_str(), time.as_str())),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ViewCall::Error(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn render_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, ViewCall::Render(_)))
            .count()
    }
}

impl MapView for RecordingView {
    fn render_geometry(&mut self, geometry: &RouteGeometry) {
        self.calls.push(ViewCall::Render(geometry.clone()));
    }

    fn clear_geometry(&mut self) {
        self.calls.push(ViewCall::Clear);
    }

    fn display_metrics(&mut self, distance: &str, unit: &str, time_label: &str) {
        self.calls.push(ViewCall::Metrics {
            distance: distance.to_string(),
            unit: unit.to_string(),
            time: time_label.to_string(),
        });
    }

    fn display_error(&mut self, message: &str) {
        self.calls.push(ViewCall::Error(message.to_string()));
    }
}

#[derive(Debug, Default)]
pub struct RecordingLocation {
    pub history: Vec<Option<String>>,
}

impl RecordingLocation {
    pub fn current(&self) -> Option<&str> {
        self.history.last().and_then(|fragment| fragment.as_deref())
    }
}

impl RouteLocation for RecordingLocation {
    fn replace_fragment(&mut self, fragment: Option<&str>) {
        self.history.push(fragment.map(str::to_string));
    }
}

/// Router that answers with the requested points as the path, reporting
/// 1000 m per point, after a per-request-size delay. Records every query.
#[derive(Debug, Clone, Default)]
pub struct EchoRouter {
    delays: HashMap<usize, Duration>,
    answers: HashMap<usize, RouterResponse>,
    fixed: Option<RouterResponse>,
    pub calls: Arc<Mutex<Vec<(Vec<(f64, f64)>, String)>>>,
}

impl EchoRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay answers to queries with `points` points.
    pub fn delay(mut self, points: usize, delay: Duration) -> Self {
        self.delays.insert(points, delay);
        self
    }

    /// Answer queries with `points` points with `response` instead of echoing.
    pub fn answer(mut self, points: usize, response: RouterResponse) -> Self {
        self.answers.insert(points, response);
        self
    }

    /// Always answer with `response` instead of echoing.
    pub fn answering(mut self, response: RouterResponse) -> Self {
        self.fixed = Some(response);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Router for EchoRouter {
    async fn query(&self, points: &[(f64, f64)], profile: &str) -> RouterResponse {
        self.calls
            .lock()
            .unwrap()
            .push((points.to_vec(), profile.to_string()));

        if let Some(delay) = self.delays.get(&points.len()) {
            tokio::time::sleep(*delay).await;
        }

        match self.answers.get(&points.len()).or(self.fixed.as_ref()) {
            Some(response) => response.clone(),
            None => RouterResponse::Success {
                geometry: RouteGeometry::new(points.to_vec()),
                length_m: 1000.0 * points.len() as f64,
            },
        }
    }
}
