//! Shareable route state and its URL token.
//!
//! A token is base64 over a small JSON object:
//!
//! ```text
//! {"w":[["51.500000","-0.100000"],...],"m":"direct","u":"km"}
//! ```
//!
//! Coordinates are written with 6 decimals. New tokens use URL-safe base64
//! without padding; decoding also accepts standard padded base64, which is
//! what older share links contain.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::metrics::Units;
use crate::resolver::RouteMode;
use crate::waypoints::Waypoint;

/// Key of the URL fragment carrying the token, as in `#route=<token>`.
pub const FRAGMENT_KEY: &str = "route";

const COORDINATE_SCALE: f64 = 1e6;

/// Everything needed to rebuild a route from a link.
///
/// Coordinates are rounded to 6 decimal places on construction, so
/// `decode(&encode(&state)) == Ok(state)` holds exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareableState {
    waypoints: Vec<Waypoint>,
    mode: RouteMode,
    units: Units,
}

impl ShareableState {
    pub fn new(waypoints: &[Waypoint], mode: RouteMode, units: Units) -> Self {
        let waypoints = waypoints
            .iter()
            .map(|waypoint| {
                // Rounding can't push a valid coordinate out of range.
                Waypoint::new(round_coordinate(waypoint.lat()), round_coordinate(waypoint.lng()))
                    .unwrap_or(*waypoint)
            })
            .collect();
        Self {
            waypoints,
            mode,
            units,
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    pub fn units(&self) -> Units {
        self.units
    }
}

fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

#[derive(Debug, Serialize, Deserialize)]
struct Payload {
    w: Vec<[Coordinate; 2]>,
    m: RouteMode,
    u: Units,
}

// Links written by the site carry coordinates as strings; accept numbers too.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Text(String),
    Number(f64),
}

impl Coordinate {
    fn value(&self) -> Result<f64, DecodeError> {
        match self {
            Coordinate::Number(value) => Ok(*value),
            Coordinate::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| DecodeError::Malformed(format!("coordinate {text:?} is not a number"))),
        }
    }
}

/// Encodes a state into a URL-safe token.
pub fn encode(state: &ShareableState) -> String {
    let payload = Payload {
        w: state
            .waypoints
            .iter()
            .map(|waypoint| {
                [
                    Coordinate::Text(format!("{:.6}", waypoint.lat())),
                    Coordinate::Text(format!("{:.6}", waypoint.lng())),
                ]
            })
            .collect(),
        m: state.mode,
        u: state.units,
    };
    // Serializing strings and unit enums cannot fail.
    let json = serde_json::to_string(&payload).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes a token produced by [`encode`] or by an older share link.
pub fn decode(token: &str) -> Result<ShareableState, DecodeError> {
    let token = token.trim();
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim_end_matches('='))
        .or_else(|_| STANDARD.decode(token))
        .map_err(|err| DecodeError::InvalidEncoding(err.to_string()))?;
    let json = String::from_utf8(bytes).map_err(|err| DecodeError::InvalidEncoding(err.to_string()))?;
    let payload: Payload =
        serde_json::from_str(&json).map_err(|err| DecodeError::Malformed(err.to_string()))?;

    if payload.w.is_empty() {
        return Err(DecodeError::NoWaypoints);
    }

    let waypoints = payload
        .w
        .iter()
        .map(|[lat, lng]| -> Result<Waypoint, DecodeError> {
            Ok(Waypoint::new(lat.value()?, lng.value()?)?)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ShareableState::new(&waypoints, payload.m, payload.u))
}

/// Fragment body for a state, `route=<token>` (no leading `#`).
pub fn to_fragment(state: &ShareableState) -> String {
    format!("{}={}", FRAGMENT_KEY, encode(state))
}

/// Reads the state out of a fragment, a `#fragment` or a full URL.
///
/// Returns `Ok(None)` when there is no `route=` entry, meaning the session
/// starts empty.
pub fn from_fragment(input: &str) -> Result<Option<ShareableState>, DecodeError> {
    let fragment = match input.split_once('#') {
        Some((_, fragment)) => fragment,
        None => input,
    };

    let token = fragment
        .split('&')
        .find_map(|entry| entry.strip_prefix(FRAGMENT_KEY)?.strip_prefix('='));

    match token {
        Some(token) => decode(token).map(Some),
        None => Ok(None),
    }
}

/// Full share link, `<base_url>#route=<token>`.
pub fn share_link(base_url: &str, state: &ShareableState) -> String {
    let base = base_url.split('#').next().unwrap_or(base_url);
    format!("{}#{}", base, to_fragment(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(points: &[(f64, f64)], mode: RouteMode, units: Units) -> ShareableState {
        let waypoints: Vec<Waypoint> = points
            .iter()
            .map(|(lat, lng)| Waypoint::new(*lat, *lng).unwrap())
            .collect();
        ShareableState::new(&waypoints, mode, units)
    }

    #[test]
    fn test_round_trip_single_point() {
        let original = state(&[(51.5, -0.1)], RouteMode::Direct, Units::Kilometers);
        assert_eq!(decode(&encode(&original)), Ok(original));
    }

    #[test]
    fn test_round_trip_rounds_to_six_decimals() {
        let original = state(
            &[(51.507412345, -0.127812345), (-33.8688197, 151.2092955), (0.0, -0.0)],
            RouteMode::Routed,
            Units::Miles,
        );
        assert_eq!(original.waypoints()[0].lat_lng(), (51.507412, -0.127812));
        assert_eq!(decode(&encode(&original)), Ok(original));
    }

    #[test]
    fn test_round_trip_extremes() {
        let original = state(
            &[(90.0, 180.0), (-90.0, -180.0), (12.3456785, 98.7654325)],
            RouteMode::Direct,
            Units::Miles,
        );
        assert_eq!(decode(&encode(&original)), Ok(original));
    }

    #[test]
    fn test_encode_is_url_safe() {
        let token = encode(&state(
            &[(51.5074, -0.1278), (51.5007, -0.1246), (51.5033, -0.1196)],
            RouteMode::Routed,
            Units::Kilometers,
        ));
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_payload_layout() {
        let token = encode(&state(&[(51.5, -0.1)], RouteMode::Direct, Units::Kilometers));
        let json = String::from_utf8(URL_SAFE_NO_PAD.decode(token).unwrap()).unwrap();
        assert_eq!(json, r#"{"w":[["51.500000","-0.100000"]],"m":"direct","u":"km"}"#);
    }

    #[test]
    fn test_decode_legacy_standard_base64() {
        let json = r#"{"w":[["51.507400","-0.127800"],["51.500700","-0.124600"]],"m":"auto","u":"mi"}"#;
        let token = STANDARD.encode(json);
        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.waypoints().len(), 2);
        assert_eq!(decoded.mode(), RouteMode::Routed);
        assert_eq!(decoded.units(), Units::Miles);
    }

    #[test]
    fn test_decode_numeric_coordinates() {
        let token = URL_SAFE_NO_PAD.encode(r#"{"w":[[51.5,-0.1]],"m":"direct","u":"km"}"#);
        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.waypoints()[0].lat_lng(), (51.5, -0.1));
    }

    #[test]
    fn test_decode_truncated_token() {
        let token = encode(&state(&[(51.5, -0.1), (51.6, -0.2)], RouteMode::Direct, Units::Kilometers));
        let truncated = &token[..token.len() / 2];
        assert!(decode(truncated).is_err());
    }

    #[test]
    fn test_decode_not_base64() {
        assert!(matches!(decode("!!not base64!!"), Err(DecodeError::InvalidEncoding(_))));
    }

    #[test]
    fn test_decode_missing_field() {
        let token = URL_SAFE_NO_PAD.encode(r#"{"w":[["51.5","-0.1"]],"m":"direct"}"#);
        assert!(matches!(decode(&token), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_unknown_mode() {
        let token = URL_SAFE_NO_PAD.encode(r#"{"w":[["51.5","-0.1"]],"m":"teleport","u":"km"}"#);
        assert!(matches!(decode(&token), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_no_waypoints() {
        let token = URL_SAFE_NO_PAD.encode(r#"{"w":[],"m":"direct","u":"km"}"#);
        assert_eq!(decode(&token), Err(DecodeError::NoWaypoints));
    }

    #[test]
    fn test_decode_out_of_range() {
        let token = URL_SAFE_NO_PAD.encode(r#"{"w":[["95.0","-0.1"]],"m":"direct","u":"km"}"#);
        assert!(matches!(decode(&token), Err(DecodeError::InvalidCoordinate(_))));
    }

    #[test]
    fn test_decode_non_numeric_coordinate() {
        let token = URL_SAFE_NO_PAD.encode(r#"{"w":[["north","-0.1"]],"m":"direct","u":"km"}"#);
        assert!(matches!(decode(&token), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_fragment_round_trip() {
        let original = state(&[(51.5, -0.1), (51.6, -0.2)], RouteMode::Direct, Units::Miles);
        let fragment = to_fragment(&original);
        assert!(fragment.starts_with("route="));
        assert_eq!(from_fragment(&fragment), Ok(Some(original.clone())));
        assert_eq!(from_fragment(&format!("#{fragment}")), Ok(Some(original.clone())));

        let link = share_link("https://example.org/tools/route-planner.html#old", &original);
        assert!(link.starts_with("https://example.org/tools/route-planner.html#route="));
        assert_eq!(from_fragment(&link), Ok(Some(original)));
    }

    #[test]
    fn test_fragment_without_route() {
        assert_eq!(from_fragment(""), Ok(None));
        assert_eq!(from_fragment("#"), Ok(None));
        assert_eq!(from_fragment("https://example.org/page#section-2"), Ok(None));
        assert_eq!(from_fragment("#router=abc"), Ok(None));
    }

    #[test]
    fn test_fragment_with_bad_token() {
        assert!(from_fragment("#route=abc").is_err());
    }
}
