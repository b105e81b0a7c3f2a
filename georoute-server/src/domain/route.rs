//! Driving routes between two locations.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Location;

/// A path between two locations with its travel time and road distance.
///
/// `duration` is in seconds and `distance` in kilometres. Negative values
/// are sentinels: [`Route::UNKNOWN`] means the value has not been
/// computed, [`Route::NOT_COMPUTED`] marks distances deliberately left
/// out by a duration matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Where the route starts.
    pub start: Option<Location>,

    /// Where the route ends.
    pub destination: Option<Location>,

    /// Intermediate points in travel order.
    #[serde(default)]
    pub waypoints: Vec<Location>,

    /// Travel time in seconds.
    pub duration: f64,

    /// Road distance in kilometres.
    pub distance: f64,
}

impl Route {
    /// Sentinel for a duration or distance that is not known yet.
    pub const UNKNOWN: f64 = -1.0;

    /// Sentinel for a distance intentionally skipped by a matrix request.
    pub const NOT_COMPUTED: f64 = -2.0;

    /// Create an empty route with unknown duration and distance.
    pub fn empty() -> Self {
        Self {
            start: None,
            destination: None,
            waypoints: Vec::new(),
            duration: Self::UNKNOWN,
            distance: Self::UNKNOWN,
        }
    }

    /// Create a route between two locations.
    pub fn new(start: Location, destination: Location, duration: f64, distance: f64) -> Self {
        Self {
            start: Some(start),
            destination: Some(destination),
            waypoints: Vec::new(),
            duration,
            distance,
        }
    }

    /// Set both endpoints, keeping everything else.
    pub fn with_endpoints(mut self, start: Location, destination: Location) -> Self {
        self.start = Some(start);
        self.destination = Some(destination);
        self
    }

    /// Travel time, or `None` while the duration is a sentinel.
    pub fn travel_time(&self) -> Option<Duration> {
        (self.duration.is_finite() && self.duration >= 0.0)
            .then(|| Duration::from_secs_f64(self.duration))
    }

    /// True for routes produced by a duration matrix (no distance).
    pub fn is_matrix_entry(&self) -> bool {
        self.distance == Self::NOT_COMPUTED
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Route {
    /// Renders as `[start -> destination; 12,34 km, 01:02:03 h]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        write_endpoint(f, self.start.as_ref())?;
        write!(f, " -> ")?;
        write_endpoint(f, self.destination.as_ref())?;
        write!(
            f,
            "; {} km, {} h]",
            format_distance(self.distance),
            format_duration(self.duration)
        )
    }
}

fn write_endpoint(f: &mut fmt::Formatter<'_>, loc: Option<&Location>) -> fmt::Result {
    match loc {
        Some(loc) => write!(f, "{loc}"),
        None => f.write_str("?"),
    }
}

/// At most two decimals, no trailing zeros, comma as decimal separator.
fn format_distance(km: f64) -> String {
    let fixed = format!("{km:.2}");
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    let out = trimmed.replace('.', ",");
    if out == "-0" { "0".to_string() } else { out }
}

fn format_duration(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "--:--:--".to_string();
    }
    let total = secs.trunc() as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
