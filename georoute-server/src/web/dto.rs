//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Location, PostalAddress, Route};

/// Query for `GET /geocode`.
#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    /// Free-form address
    pub q: String,
}

/// A point given by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct PointInput {
    pub latitude: f64,
    pub longitude: f64,

    /// Optional display name
    pub name: Option<String>,
}

impl PointInput {
    /// Whether the coordinates are finite and within WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn to_location(&self) -> Location {
        let mut location = Location::new(self.latitude, self.longitude);
        location.set_name(self.name.as_deref());
        location
    }
}

/// Request for `POST /route`.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub from: PointInput,
    pub to: PointInput,
}

/// Request for `POST /matrix`.
#[derive(Debug, Deserialize)]
pub struct MatrixRequest {
    pub destination: PointInput,
    pub starts: Vec<PointInput>,
}

/// Request for `POST /shortest`.
#[derive(Debug, Deserialize)]
pub struct ShortestRequest {
    pub routes: Vec<Route>,
}

/// A resolved location.
#[derive(Debug, Serialize)]
pub struct LocationResult {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,

    /// Name if set, otherwise the assembled postal address
    pub label: String,

    pub address: PostalAddress,
}

impl LocationResult {
    pub fn from_location(location: &Location) -> Self {
        Self {
            latitude: location.latitude(),
            longitude: location.longitude(),
            name: location.name().map(str::to_string),
            label: location.to_string(),
            address: location.address().clone(),
        }
    }
}

/// A computed route.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    pub from: Option<LocationResult>,
    pub to: Option<LocationResult>,

    /// Seconds; absent when unknown
    pub duration_secs: Option<f64>,

    /// Kilometres; absent when unknown or not computed
    pub distance_km: Option<f64>,

    /// Human-readable one-liner
    pub summary: String,

    /// Path geometry as `[latitude, longitude]` pairs
    pub waypoints: Vec<[f64; 2]>,
}

impl RouteResult {
    pub fn from_route(route: &Route) -> Self {
        Self {
            from: route.start.as_ref().map(LocationResult::from_location),
            to: route.destination.as_ref().map(LocationResult::from_location),
            duration_secs: measured(route.duration),
            distance_km: measured(route.distance),
            summary: route.to_string(),
            waypoints: route
                .waypoints
                .iter()
                .map(|w| [w.latitude(), w.longitude()])
                .collect(),
        }
    }
}

/// Response for `POST /matrix`.
#[derive(Debug, Serialize)]
pub struct MatrixResponse {
    /// One route per start, in request order
    pub routes: Vec<RouteResult>,

    /// Index of the start with the shortest duration
    pub shortest: usize,
}

/// Response for `POST /shortest`.
#[derive(Debug, Serialize)]
pub struct ShortestResponse {
    pub index: usize,
    pub route: RouteResult,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Sentinel values (negative) become `None`.
fn measured(value: f64) -> Option<f64> {
    (value >= 0.0).then_some(value)
}
