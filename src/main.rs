//! Terminal front end for the route planner.
//!
//! `plan` builds a route from `--point` arguments, `open` restores one from a
//! share link, and `decode` prints what a link contains without routing.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use route_planner::backend::{RouterBackend, resolver_from_config};
use route_planner::codec;
use route_planner::config::{PlannerConfig, RouterKind};
use route_planner::haversine::WalkingEstimator;
use route_planner::metrics::Units;
use route_planner::polyline::RouteGeometry;
use route_planner::resolver::RouteMode;
use route_planner::session::{SessionController, SessionEvent, SessionState};
use route_planner::traits::{MapView, RouteLocation};

const DEFAULT_LINK_BASE: &str = "https://www.example.com/tools/route-planner.html";

#[derive(Debug, Parser)]
#[command(name = "route-planner", version, about = "Plan walking routes and share them as links")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Routing service for routed mode (brouter or osrm)
    #[arg(long, global = true)]
    router: Option<RouterKind>,

    /// Base URL of the routing service
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Routing profile, e.g. trekking or foot
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Walking speed in km/h
    #[arg(long, global = true, value_parser = parse_speed)]
    speed: Option<f64>,

    /// Page the share link points at
    #[arg(long, global = true, default_value = DEFAULT_LINK_BASE)]
    link_base: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a route through the given points
    Plan {
        /// Waypoint as `lat,lng`; repeat in route order
        #[arg(long = "point", required = true, value_parser = parse_point)]
        points: Vec<(f64, f64)>,

        /// direct or routed
        #[arg(long, default_value = "routed")]
        mode: RouteMode,

        /// km or mi
        #[arg(long, default_value = "km")]
        units: Units,
    },
    /// Restore and resolve a route from a share link
    Open { link: String },
    /// Print the contents of a share link
    Decode { link: String },
}

fn parse_point(value: &str) -> Result<(f64, f64), String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lng, got {value:?}"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("bad latitude {lat:?}: {err}"))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("bad longitude {lng:?}: {err}"))?;
    Ok((lat, lng))
}

fn parse_speed(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(speed) if speed.is_finite() && speed > 0.0 => Ok(speed),
        _ => Err(format!("walking speed must be a positive number, got {value:?}")),
    }
}

/// Prints what a map view would draw.
#[derive(Debug, Default)]
struct TerminalView {
    verbose: bool,
}

impl MapView for TerminalView {
    fn render_geometry(&mut self, geometry: &RouteGeometry) {
        println!("route: {} vertices", geometry.len());
        if self.verbose {
            for (lon, lat) in geometry.vertices() {
                println!("  {lat:.6},{lon:.6}");
            }
        }
    }

    fn clear_geometry(&mut self) {
        println!("route cleared");
    }

    fn display_metrics(&mut self, distance: &str, unit: &str, time_label: &str) {
        println!("distance: {distance} {unit}  walking time: {time_label}");
    }

    fn display_error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }
}

/// Keeps the last fragment written, standing in for the address bar.
#[derive(Debug, Default)]
struct Fragment(Option<String>);

impl RouteLocation for Fragment {
    fn replace_fragment(&mut self, fragment: Option<&str>) {
        self.0 = fragment.map(str::to_string);
    }
}

type Session = SessionController<RouterBackend, TerminalView, Fragment>;

fn load_config(cli: &Cli) -> Result<PlannerConfig, String> {
    let mut config = PlannerConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(router) = cli.router {
        config.router = router;
    }
    if let Some(base_url) = &cli.base_url {
        config.set_base_url(base_url.clone());
    }
    if let Some(profile) = &cli.profile {
        config.set_profile(profile.clone());
    }
    if let Some(speed) = cli.speed {
        config.walking_speed_kmh = speed;
    }
    Ok(config)
}

fn new_session(config: &PlannerConfig) -> Result<Session, String> {
    let resolver = resolver_from_config(config)
        .map_err(|err| format!("failed to build HTTP client: {err}"))?;
    tracing::debug!(
        router = ?config.router,
        profile = resolver.profile(),
        "session ready"
    );
    let view = TerminalView {
        verbose: tracing::enabled!(tracing::Level::DEBUG),
    };
    Ok(SessionController::new(Arc::new(resolver), view, Fragment::default())
        .with_walking(WalkingEstimator::new(config.walking_speed_kmh)))
}

async fn plan(
    session: Session,
    points: Vec<(f64, f64)>,
    mode: RouteMode,
    units: Units,
) -> Session {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut events = vec![SessionEvent::ModeChanged(mode), SessionEvent::UnitsChanged(units)];
    events.extend(points.into_iter().map(|(lat, lng)| SessionEvent::MapClick { lat, lng }));
    for event in events {
        // `rx` is alive until `run` returns.
        let _ = tx.send(event);
    }
    // Closing the channel lets `run` finish once the last route settles.
    drop(tx);
    session.run(rx).await
}

fn report(session: &Session, link_base: &str) -> ExitCode {
    if let Some(link) = session.share_link(link_base) {
        println!("share: {link}");
    }
    match session.state() {
        SessionState::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn decode(link: &str) -> ExitCode {
    match codec::from_fragment(link) {
        Ok(Some(state)) => {
            println!(
                "mode: {}  units: {}",
                match state.mode() {
                    RouteMode::Direct => "direct",
                    RouteMode::Routed => "routed",
                },
                state.units().label()
            );
            for (index, waypoint) in state.waypoints().iter().enumerate() {
                println!("{:>3}: {:.6},{:.6}", index + 1, waypoint.lat(), waypoint.lng());
            }
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("error: link has no #{}= fragment", codec::FRAGMENT_KEY);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Decode { link } = &cli.command {
        return decode(link);
    }

    let session = match load_config(&cli).and_then(|config| new_session(&config)) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Plan {
            points,
            mode,
            units,
        } => {
            let session = plan(session, points, mode, units).await;
            report(&session, &cli.link_base)
        }
        Command::Open { link } => {
            let mut session = session;
            let pending = session.load_fragment(&link);
            if session.waypoints().is_empty() {
                eprintln!("error: no route in {link:?}");
                return ExitCode::FAILURE;
            }
            session.settle(pending).await;
            report(&session, &cli.link_base)
        }
        Command::Decode { .. } => ExitCode::SUCCESS,
    }
}
