//! MapQuest geocoding API adapter.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::credentials::{Credentials, service};
use crate::domain::{BoundingBox, Location, PostalAddress};

use super::error::ProviderError;
use super::http::{DEFAULT_TIMEOUT_SECS, build_client, get_json};
use super::{GeocodeProvider, Provider};

/// Default base URL for the MapQuest geocoding API.
const DEFAULT_BASE_URL: &str = "https://www.mapquestapi.com/geocoding/v1";

/// Region MapQuest is asked to prefer when a name is ambiguous.
const DEFAULT_BIAS: BoundingBox = BoundingBox {
    min_latitude: 40.880295,
    max_latitude: 56.897004,
    min_longitude: -6.372070,
    max_longitude: 18.698730,
};

/// Response of the `address` endpoint.
#[derive(Debug, Deserialize)]
struct AddressResponse {
    #[serde(default)]
    results: Vec<AddressResult>,
}

#[derive(Debug, Deserialize)]
struct AddressResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

/// A candidate location. `adminArea*` levels run from country (1) down
/// to neighbourhood (6).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: LatLng,
    street: Option<String>,
    postal_code: Option<String>,
    admin_area6: Option<String>,
    admin_area5: Option<String>,
    admin_area4: Option<String>,
    admin_area3: Option<String>,
    admin_area1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Configuration for the MapQuest client.
#[derive(Debug, Clone)]
pub struct MapQuestConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Region passed as the `boundingBox` hint, if any
    pub bias: Option<BoundingBox>,
}

impl MapQuestConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            bias: Some(DEFAULT_BIAS),
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

    /// Set or clear the bounding box hint.
    pub fn with_bias(mut self, bias: Option<BoundingBox>) -> Self {
        self.bias = bias;
        self
    }
}

impl Default for MapQuestConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the MapQuest geocoding API.
#[derive(Debug, Clone)]
pub struct MapQuestClient {
    http: reqwest::Client,
    config: MapQuestConfig,
    credentials: Arc<Credentials>,
}

impl MapQuestClient {
    pub fn new(config: MapQuestConfig, credentials: Arc<Credentials>) -> Result<Self, ProviderError> {
        Ok(Self {
            http: build_client(config.timeout_secs)?,
            config,
            credentials,
        })
    }

    async fn lookup(&self, address: &str) -> Result<Location, ProviderError> {
        let key = self
            .credentials
            .usable(service::MAPQUEST)
            .ok_or_else(|| ProviderError::Unavailable {
                service: service::MAPQUEST.to_string(),
            })?;

        let url = format!("{}/address", self.config.base_url);
        let mut query = vec![
            ("key", key.to_string()),
            ("maxResults", "1".to_string()),
            ("outFormat", "json".to_string()),
            ("location", address.to_string()),
        ];
        if let Some(bias) = &self.config.bias {
            query.push((
                "boundingBox",
                format!(
                    "{},{},{},{}",
                    bias.min_latitude, bias.min_longitude, bias.max_latitude, bias.max_longitude
                ),
            ));
        }

        let response: AddressResponse = get_json(&self.http, &url, &query).await?;
        convert_response(response)
    }
}

impl Provider for MapQuestClient {
    fn name(&self) -> &str {
        service::MAPQUEST
    }
}

impl GeocodeProvider for MapQuestClient {
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<Location, ProviderError>> {
        Box::pin(self.lookup(address))
    }
}

/// Take the first candidate of the first result.
fn convert_response(response: AddressResponse) -> Result<Location, ProviderError> {
    let candidate = response
        .results
        .into_iter()
        .next()
        .and_then(|r| r.locations.into_iter().next())
        .ok_or(ProviderError::NoResult)?;

    let address = PostalAddress {
        street_and_number: candidate.street,
        zip_code: candidate.postal_code,
        neighborhood: candidate.admin_area6,
        city: candidate.admin_area5,
        county: candidate.admin_area4,
        state: candidate.admin_area3,
        country: candidate.admin_area1,
    };

    Ok(Location::with_address(
        candidate.lat_lng.lat,
        candidate.lat_lng.lng,
        address,
    ))
}
