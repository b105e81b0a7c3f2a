//! OSRM (Open Source Routing Machine) adapter.
//!
//! The same HTTP API is served by a locally run `osrm-routed` and by the
//! public demo server, so one client type covers both; they differ only
//! in base URL and name. The table service backs duration matrices.

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::domain::{Location, Route};

use super::error::ProviderError;
use super::http::{DEFAULT_TIMEOUT_SECS, build_client, get_json};
use super::{MatrixProvider, Provider, RouteProvider, lon_lat};

/// Where a locally supervised `osrm-routed` listens.
pub const LOCAL_BASE_URL: &str = "http://127.0.0.1:7880";

/// The public demo server. Fair-use only.
pub const DEMO_BASE_URL: &str = "https://router.project-osrm.org";

/// Response of the `route` service.
#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    #[serde(default)]
    legs: Vec<Leg>,
}

/// One leg between two consecutive input coordinates.
#[derive(Debug, Deserialize)]
struct Leg {
    /// Seconds.
    duration: f64,
    /// Metres.
    distance: f64,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    geometry: Option<Geometry>,
}

/// GeoJSON line string; coordinates are `[lon, lat]`.
#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

/// Response of the `table` service.
#[derive(Debug, Deserialize)]
struct TableResponse {
    code: String,
    message: Option<String>,
    /// One row per source, one column per destination; `null` if unroutable.
    #[serde(default)]
    durations: Vec<Vec<Option<f64>>>,
}

/// Configuration for an OSRM client.
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Name used in logs
    pub name: String,
    /// Base URL of the server
    pub base_url: String,
    /// Routing profile (`driving`, `car`, ...)
    pub profile: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OsrmConfig {
    /// Config for a server at `base_url`.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            profile: "driving".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// The locally supervised server.
    pub fn local() -> Self {
        Self::new("osrm-local", LOCAL_BASE_URL)
    }

    /// The public demo server.
    pub fn demo() -> Self {
        Self::new("osrm-demo", DEMO_BASE_URL)
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the routing profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// OSRM HTTP client, used for routes and duration tables.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    http: reqwest::Client,
    config: OsrmConfig,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: build_client(config.timeout_secs)?,
            config,
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn fetch_route(&self, from: &Location, to: &Location) -> Result<Route, ProviderError> {
        let url = format!(
            "{}/route/v1/{}/{};{}",
            self.config.base_url,
            self.config.profile,
            lon_lat(from),
            lon_lat(to)
        );
        let query = [
            ("geometries", "geojson".to_string()),
            ("steps", "true".to_string()),
            ("generate_hints", "false".to_string()),
        ];

        let response: RouteResponse = get_json(&self.http, &url, &query).await?;
        convert_route(response)
    }

    async fn fetch_table(
        &self,
        destination: &Location,
        starts: &[Location],
    ) -> Result<Vec<f64>, ProviderError> {
        let (url, query) = table_request(&self.config, destination, starts);
        let response: TableResponse = get_json(&self.http, &url, &query).await?;
        convert_table(response, starts.len())
    }
}

impl Provider for OsrmClient {
    fn name(&self) -> &str {
        &self.config.name
    }
}

impl RouteProvider for OsrmClient {
    fn route<'a>(
        &'a self,
        from: &'a Location,
        to: &'a Location,
    ) -> BoxFuture<'a, Result<Route, ProviderError>> {
        Box::pin(self.fetch_route(from, to))
    }
}

impl MatrixProvider for OsrmClient {
    fn durations<'a>(
        &'a self,
        destination: &'a Location,
        starts: &'a [Location],
    ) -> BoxFuture<'a, Result<Vec<f64>, ProviderError>> {
        Box::pin(self.fetch_table(destination, starts))
    }
}

/// URL and query of a `table` request. The destination is coordinate 0,
/// the starts follow as sources 1..=n.
fn table_request(
    config: &OsrmConfig,
    destination: &Location,
    starts: &[Location],
) -> (String, Vec<(&'static str, String)>) {
    let coordinates = std::iter::once(destination)
        .chain(starts)
        .map(lon_lat)
        .collect::<Vec<_>>()
        .join(";");
    let sources = (1..=starts.len())
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(";");

    let url = format!(
        "{}/table/v1/{}/{}",
        config.base_url, config.profile, coordinates
    );
    (
        url,
        vec![("destinations", "0".to_string()), ("sources", sources)],
    )
}

fn check_code(code: &str, message: Option<String>) -> Result<(), ProviderError> {
    if code == "Ok" {
        return Ok(());
    }
    Err(ProviderError::Rejected {
        message: match message {
            Some(message) => format!("{code}: {message}"),
            None => code.to_string(),
        },
    })
}

/// First leg of the first route: duration, distance in km, step geometry.
fn convert_route(response: RouteResponse) -> Result<Route, ProviderError> {
    check_code(&response.code, response.message)?;

    let leg = response
        .routes
        .into_iter()
        .next()
        .and_then(|r| r.legs.into_iter().next())
        .ok_or(ProviderError::NoResult)?;

    let waypoints = leg
        .steps
        .iter()
        .filter_map(|step| step.geometry.as_ref())
        .flat_map(|geometry| geometry.coordinates.iter())
        .map(|[lon, lat]| Location::new(*lat, *lon))
        .collect();

    Ok(Route {
        waypoints,
        duration: leg.duration,
        distance: leg.distance / 1000.0,
        ..Route::empty()
    })
}

/// First column of every row, which must cover all `expected` starts.
fn convert_table(response: TableResponse, expected: usize) -> Result<Vec<f64>, ProviderError> {
    check_code(&response.code, response.message)?;

    if response.durations.len() != expected {
        return Err(ProviderError::Json {
            message: format!(
                "expected {expected} duration rows, got {}",
                response.durations.len()
            ),
        });
    }

    response
        .durations
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.first().copied().flatten().ok_or_else(|| ProviderError::Rejected {
                message: format!("no duration for start #{i}"),
            })
        })
        .collect()
}
