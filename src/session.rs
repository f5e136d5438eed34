//! Session controller: owns the waypoints, the selected mode and units, and
//! the displayed route, and keeps them consistent as events arrive.
//!
//! Every change to the waypoints or the mode bumps a generation counter.
//! Routed resolutions are handed out as [`PendingResolution`]s tagged with
//! the generation they were issued under, and [`SessionController::complete`]
//! drops any outcome whose generation is no longer current. The latest edit
//! always wins; a superseded network call is never applied, whether or not
//! it was cancelled.
//!
//! Direct-mode resolutions need no network and are applied inside
//! [`SessionController::handle`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};

use crate::codec::{self, ShareableState};
use crate::error::{RouteError, WaypointError};
use crate::haversine::WalkingEstimator;
use crate::metrics::{RouteMetrics, Units};
use crate::resolver::{ResolvedRoute, RouteMode, RouteResolver};
use crate::traits::{MapView, RouteLocation, Router};
use crate::waypoints::{Waypoint, WaypointStore};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No waypoints.
    Empty,
    /// One waypoint, nothing to draw.
    Single,
    /// A resolution for the current waypoints is in flight.
    Resolving,
    /// The displayed geometry is the latest successful resolution.
    Resolved,
    /// The latest resolution failed and no earlier geometry exists.
    Failed,
}

/// Input events from the map view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    MapClick { lat: f64, lng: f64 },
    MarkerDragEnd { index: usize, lat: f64, lng: f64 },
    ModeChanged(RouteMode),
    UnitsChanged(Units),
    Undo,
    Clear,
}

/// A routed resolution waiting to be run.
///
/// Owns a snapshot of the waypoints so it can run on any task without
/// borrowing the controller.
#[derive(Debug)]
pub struct PendingResolution<R> {
    generation: u64,
    waypoints: Vec<Waypoint>,
    mode: RouteMode,
    resolver: Arc<RouteResolver<R>>,
}

impl<R: Router> PendingResolution<R> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    pub async fn run(self) -> ResolutionOutcome {
        let result = self.resolver.resolve(&self.waypoints, self.mode).await;
        ResolutionOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// Result of a resolution, tagged with the generation it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionOutcome {
    pub generation: u64,
    pub result: Result<ResolvedRoute, RouteError>,
}

/// What [`SessionController::complete`] did with an outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The route is now displayed.
    Applied,
    /// The error was reported; the previous geometry (if any) stays.
    Failed(RouteError),
    /// The outcome belonged to an outdated request and was dropped.
    Stale,
}

pub struct SessionController<R, V, L> {
    resolver: Arc<RouteResolver<R>>,
    view: V,
    location: L,
    walking: WalkingEstimator,
    store: WaypointStore,
    mode: RouteMode,
    units: Units,
    route: Option<ResolvedRoute>,
    metrics: Option<RouteMetrics>,
    state: SessionState,
    generation: u64,
}

impl<R, V, L> SessionController<R, V, L>
where
    R: Router,
    V: MapView,
    L: RouteLocation,
{
    pub fn new(resolver: Arc<RouteResolver<R>>, view: V, location: L) -> Self {
        Self {
            resolver,
            view,
            location,
            walking: WalkingEstimator::default(),
            store: WaypointStore::new(),
            mode: RouteMode::default(),
            units: Units::default(),
            route: None,
            metrics: None,
            state: SessionState::Empty,
            generation: 0,
        }
    }

    pub fn with_walking(mut self, walking: WalkingEstimator) -> Self {
        self.walking = walking;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        self.store.as_slice()
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn route(&self) -> Option<&ResolvedRoute> {
        self.route.as_ref()
    }

    pub fn metrics(&self) -> Option<RouteMetrics> {
        self.metrics
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn shareable_state(&self) -> ShareableState {
        ShareableState::new(self.store.as_slice(), self.mode, self.units)
    }

    /// Link to the current route, or `None` when there is nothing to share.
    pub fn share_link(&self, base_url: &str) -> Option<String> {
        if self.store.is_empty() {
            return None;
        }
        Some(codec::share_link(base_url, &self.shareable_state()))
    }

    /// Applies one event. Returns the routed resolution to run, if any.
    pub fn handle(
        &mut self,
        event: SessionEvent,
    ) -> Result<Option<PendingResolution<R>>, WaypointError> {
        match event {
            SessionEvent::MapClick { lat, lng } => {
                let len = self.store.add(lat, lng)?;
                tracing::debug!(len, lat, lng, "added waypoint");
                Ok(self.waypoints_changed())
            }
            SessionEvent::MarkerDragEnd { index, lat, lng } => {
                self.store.move_at(index, lat, lng)?;
                tracing::debug!(index, lat, lng, "moved waypoint");
                Ok(self.waypoints_changed())
            }
            SessionEvent::Undo => match self.store.remove_last() {
                Some(removed) => {
                    tracing::debug!(?removed, "removed last waypoint");
                    Ok(self.waypoints_changed())
                }
                None => Ok(None),
            },
            SessionEvent::Clear => {
                self.store.clear();
                tracing::debug!("cleared waypoints");
                Ok(self.waypoints_changed())
            }
            SessionEvent::ModeChanged(mode) => {
                if mode == self.mode {
                    return Ok(None);
                }
                tracing::info!(?mode, "route mode changed");
                self.mode = mode;
                self.generation += 1;
                self.persist();
                if self.store.len() >= 2 {
                    Ok(self.begin_resolution())
                } else {
                    Ok(None)
                }
            }
            SessionEvent::UnitsChanged(units) => {
                self.units = units;
                self.show_metrics();
                self.persist();
                Ok(None)
            }
        }
    }

    /// Seeds the session from a shared state, replacing everything.
    pub fn restore(&mut self, state: ShareableState) -> Option<PendingResolution<R>> {
        tracing::info!(waypoints = state.waypoints().len(), "restoring shared route");
        self.mode = state.mode();
        self.units = state.units();
        self.store.replace_all(state.waypoints().to_vec());
        self.waypoints_changed()
    }

    /// Seeds the session from a URL fragment or link.
    ///
    /// A bad token is reported to the view and the session stays as it was.
    pub fn load_fragment(&mut self, input: &str) -> Option<PendingResolution<R>> {
        match codec::from_fragment(input) {
            Ok(Some(state)) => self.restore(state),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("failed to load route from link: {err}");
                self.view.display_error(&err.to_string());
                None
            }
        }
    }

    /// Applies an outcome if it is still current.
    pub fn complete(&mut self, outcome: ResolutionOutcome) -> Completion {
        if outcome.generation != self.generation {
            tracing::debug!(
                issued = outcome.generation,
                current = self.generation,
                "discarding stale resolution"
            );
            return Completion::Stale;
        }
        self.apply(outcome.result)
    }

    /// Runs a pending resolution to completion and applies it.
    pub async fn settle(&mut self, pending: Option<PendingResolution<R>>) -> Option<Completion> {
        let outcome = pending?.run().await;
        Some(self.complete(outcome))
    }

    /// Handles one event and waits for any resolution it starts.
    pub async fn dispatch(&mut self, event: SessionEvent) -> Result<Option<Completion>, WaypointError> {
        let pending = self.handle(event)?;
        Ok(self.settle(pending).await)
    }

    fn waypoints_changed(&mut self) -> Option<PendingResolution<R>> {
        self.generation += 1;
        self.persist();

        match self.store.len() {
            0 | 1 => {
                self.route = None;
                self.metrics = None;
                self.state = if self.store.is_empty() {
                    SessionState::Empty
                } else {
                    SessionState::Single
                };
                self.view.clear_geometry();
                self.show_metrics();
                None
            }
            _ => self.begin_resolution(),
        }
    }

    fn begin_resolution(&mut self) -> Option<PendingResolution<R>> {
        if self.state == SessionState::Resolving {
            tracing::debug!(generation = self.generation, "superseding in-flight resolution");
        }
        self.state = SessionState::Resolving;

        match self.mode {
            RouteMode::Direct => {
                let result = RouteResolver::<R>::resolve_direct(self.store.as_slice());
                self.apply(result);
                None
            }
            RouteMode::Routed => {
                tracing::debug!(
                    generation = self.generation,
                    waypoints = self.store.len(),
                    "issuing routed resolution"
                );
                Some(PendingResolution {
                    generation: self.generation,
                    waypoints: self.store.snapshot(),
                    mode: self.mode,
                    resolver: Arc::clone(&self.resolver),
                })
            }
        }
    }

    fn apply(&mut self, result: Result<ResolvedRoute, RouteError>) -> Completion {
        match result {
            Ok(route) => {
                let metrics = RouteMetrics::from_distance(route.distance_m(), &self.walking);
                tracing::info!(
                    distance_m = metrics.total_distance_m,
                    minutes = metrics.walking_time_minutes,
                    "route updated"
                );
                self.view.render_geometry(&route.geometry);
                self.route = Some(route);
                self.metrics = Some(metrics);
                self.state = SessionState::Resolved;
                self.show_metrics();
                self.persist();
                Completion::Applied
            }
            Err(err) => {
                tracing::warn!("route resolution failed: {err}");
                self.view.display_error(&err.to_string());
                self.state = if self.route.is_some() {
                    SessionState::Resolved
                } else {
                    SessionState::Failed
                };
                Completion::Failed(err)
            }
        }
    }

    fn show_metrics(&mut self) {
        let metrics = self.metrics.unwrap_or_else(RouteMetrics::zero);
        self.view.display_metrics(
            &metrics.distance_label(self.units),
            self.units.label(),
            &metrics.time_label(),
        );
    }

    fn persist(&mut self) {
        if self.store.is_empty() {
            self.location.replace_fragment(None);
        } else {
            let fragment = codec::to_fragment(&self.shareable_state());
            self.location.replace_fragment(Some(&fragment));
        }
    }
}

impl<R, V, L> SessionController<R, V, L>
where
    R: Router + 'static,
    V: MapView,
    L: RouteLocation,
{
    /// Event loop: applies events as they arrive while routed resolutions
    /// run on their own tasks.
    ///
    /// Issuing a new resolution aborts the previous one; its outcome would be
    /// discarded as stale anyway. Returns once the channel is closed and the
    /// last resolution has settled.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        let mut in_flight: JoinSet<ResolutionOutcome> = JoinSet::new();
        let mut latest: Option<AbortHandle> = None;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    match self.handle(event) {
                        Ok(Some(pending)) => {
                            let handle = in_flight.spawn(pending.run());
                            if let Some(previous) = latest.replace(handle) {
                                previous.abort();
                            }
                        }
                        Ok(None) => {}
                        Err(err) => {
                            tracing::warn!("rejected {event:?}: {err}");
                            self.view.display_error(&err.to_string());
                        }
                    }
                }
                Some(joined) = in_flight.join_next() => self.on_joined(joined),
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            self.on_joined(joined);
        }
        self
    }

    fn on_joined(&mut self, joined: Result<ResolutionOutcome, tokio::task::JoinError>) {
        match joined {
            Ok(outcome) => {
                self.complete(outcome);
            }
            Err(err) if err.is_cancelled() => {
                tracing::debug!("superseded resolution cancelled");
            }
            Err(err) => {
                tracing::error!("resolution task failed: {err}");
            }
        }
    }
}
