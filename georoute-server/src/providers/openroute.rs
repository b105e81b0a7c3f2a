//! OpenRouteService directions API adapter.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::credentials::{Credentials, service};
use crate::domain::{Location, Route};

use super::error::ProviderError;
use super::http::{DEFAULT_TIMEOUT_SECS, build_client, get_json};
use super::{Provider, RouteProvider, lon_lat};

/// Default base URL for the OpenRouteService API.
const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org/v2";

/// GeoJSON response of `GET /directions/{profile}`.
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
    geometry: Option<LineString>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    summary: Summary,
}

/// Totals for the whole route. Missing for zero-length routes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Summary {
    /// Metres.
    distance: f64,
    /// Seconds.
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct LineString {
    #[serde(default)]
    coordinates: Vec<Vec<f64>>,
}

/// Configuration for the OpenRouteService client.
#[derive(Debug, Clone)]
pub struct OpenRouteServiceConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Routing profile
    pub profile: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenRouteServiceConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: "driving-car".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for OpenRouteServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the OpenRouteService directions API.
#[derive(Debug, Clone)]
pub struct OpenRouteServiceClient {
    http: reqwest::Client,
    config: OpenRouteServiceConfig,
    credentials: Arc<Credentials>,
}

impl OpenRouteServiceClient {
    pub fn new(
        config: OpenRouteServiceConfig,
        credentials: Arc<Credentials>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http: build_client(config.timeout_secs)?,
            config,
            credentials,
        })
    }

    async fn fetch_route(&self, from: &Location, to: &Location) -> Result<Route, ProviderError> {
        let key = self
            .credentials
            .usable(service::OPENROUTESERVICE)
            .ok_or_else(|| ProviderError::Unavailable {
                service: service::OPENROUTESERVICE.to_string(),
            })?;

        let url = format!("{}/directions/{}", self.config.base_url, self.config.profile);
        let query = [
            ("api_key", key.to_string()),
            ("start", lon_lat(from)),
            ("end", lon_lat(to)),
        ];

        let response: DirectionsResponse = get_json(&self.http, &url, &query).await?;
        convert_directions(response)
    }
}

impl Provider for OpenRouteServiceClient {
    fn name(&self) -> &str {
        service::OPENROUTESERVICE
    }
}

impl RouteProvider for OpenRouteServiceClient {
    fn route<'a>(
        &'a self,
        from: &'a Location,
        to: &'a Location,
    ) -> BoxFuture<'a, Result<Route, ProviderError>> {
        Box::pin(self.fetch_route(from, to))
    }
}

fn convert_directions(response: DirectionsResponse) -> Result<Route, ProviderError> {
    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or(ProviderError::NoResult)?;

    let waypoints = feature
        .geometry
        .map(|line| {
            line.coordinates
                .iter()
                .filter_map(|pos| match pos.as_slice() {
                    [lon, lat, ..] => Some(Location::new(*lat, *lon)),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Route {
        waypoints,
        duration: feature.properties.summary.duration,
        distance: feature.properties.summary.distance / 1000.0,
        ..Route::empty()
    })
}
