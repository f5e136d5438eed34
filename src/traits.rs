//! Collaborator seams for the route planner.
//!
//! The planner never talks to a map widget, a browser location bar or an
//! HTTP routing service directly. Front ends implement these traits for
//! their own toolkit.

use std::future::Future;

use crate::polyline::RouteGeometry;

/// What a routing service answered for one query.
///
/// Raw wire formats are converted into this at the HTTP boundary so the
/// resolver only ever sees these three shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterResponse {
    /// A path through all requested points, with the service's own length.
    Success {
        geometry: RouteGeometry,
        length_m: f64,
    },
    /// The service answered but had no usable route.
    Empty,
    /// The service was unreachable or answered with a non-2xx status.
    /// `status` is `None` for transport errors.
    HttpError {
        status: Option<u16>,
        message: String,
    },
}

/// A remote routing service.
///
/// `points` are (longitude, latitude) pairs in traversal order and are sent
/// as a single query. `profile` is the service's routing profile name.
pub trait Router: Send + Sync {
    fn query(
        &self,
        points: &[(f64, f64)],
        profile: &str,
    ) -> impl Future<Output = RouterResponse> + Send;
}

/// The map widget showing the route.
pub trait MapView {
    fn render_geometry(&mut self, geometry: &RouteGeometry);

    fn clear_geometry(&mut self);

    fn display_metrics(&mut self, distance: &str, unit: &str, time_label: &str);

    fn display_error(&mut self, message: &str);
}

/// The addressable location the shareable route is written to, such as a
/// browser URL fragment.
pub trait RouteLocation {
    /// Sets the fragment (without the leading `#`), or removes it on `None`.
    fn replace_fragment(&mut self, fragment: Option<&str>);
}
