//! LocationIQ search API adapter.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::credentials::{Credentials, service};
use crate::domain::{Location, PostalAddress};

use super::error::ProviderError;
use super::http::{DEFAULT_TIMEOUT_SECS, build_client, get_json};
use super::{GeocodeProvider, Provider};

/// Default base URL (EU region).
const DEFAULT_BASE_URL: &str = "https://eu1.locationiq.com/v1";

/// A search hit. LocationIQ returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    address: Option<PlaceAddress>,
}

/// Nominatim-style address breakdown.
#[derive(Debug, Default, Deserialize)]
struct PlaceAddress {
    road: Option<String>,
    house_number: Option<String>,
    suburb: Option<String>,
    postcode: Option<String>,
    town: Option<String>,
    city: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// Configuration for the LocationIQ client.
#[derive(Debug, Clone)]
pub struct LocationIqConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl LocationIqConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
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

impl Default for LocationIqConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the LocationIQ forward geocoding API.
#[derive(Debug, Clone)]
pub struct LocationIqClient {
    http: reqwest::Client,
    config: LocationIqConfig,
    credentials: Arc<Credentials>,
}

impl LocationIqClient {
    pub fn new(
        config: LocationIqConfig,
        credentials: Arc<Credentials>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http: build_client(config.timeout_secs)?,
            config,
            credentials,
        })
    }

    async fn lookup(&self, address: &str) -> Result<Location, ProviderError> {
        let key = self
            .credentials
            .usable(service::LOCATIONIQ)
            .ok_or_else(|| ProviderError::Unavailable {
                service: service::LOCATIONIQ.to_string(),
            })?;

        let url = format!("{}/search", self.config.base_url);
        let query = [
            ("key", key.to_string()),
            ("q", address.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("limit", "1".to_string()),
        ];

        let places: Vec<Place> = get_json(&self.http, &url, &query).await?;
        convert_places(places)
    }
}

impl Provider for LocationIqClient {
    fn name(&self) -> &str {
        service::LOCATIONIQ
    }
}

impl GeocodeProvider for LocationIqClient {
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<Location, ProviderError>> {
        Box::pin(self.lookup(address))
    }
}

fn convert_places(places: Vec<Place>) -> Result<Location, ProviderError> {
    let place = places.into_iter().next().ok_or(ProviderError::NoResult)?;

    let lat = parse_coordinate("lat", &place.lat)?;
    let lon = parse_coordinate("lon", &place.lon)?;

    let Some(details) = place.address else {
        return Ok(Location::new(lat, lon));
    };

    let street_and_number = match (details.road, details.house_number) {
        (Some(road), Some(number)) => Some(format!("{road} {number}")),
        (Some(road), None) => Some(road),
        (None, number) => number,
    };

    let address = PostalAddress {
        street_and_number,
        zip_code: details.postcode,
        neighborhood: details.suburb,
        city: details.town.or(details.city).or(details.village),
        county: details.county,
        state: details.state,
        country: details.country,
    };

    Ok(Location::with_address(lat, lon, address))
}

fn parse_coordinate(field: &str, value: &str) -> Result<f64, ProviderError> {
    value.trim().parse().map_err(|_| ProviderError::Json {
        message: format!("invalid {field}: {value:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::parse_json;

    const RESPONSE: &str = r#"[
        {
            "place_id": "123",
            "lat": "51.9622",
            "lon": "7.6280",
            "display_name": "10, Prinzipalmarkt, Altstadt, Münster, Nordrhein-Westfalen, 48143, Deutschland",
            "address": {
                "house_number": "10",
                "road": "Prinzipalmarkt",
                "suburb": "Altstadt",
                "city": "Münster",
                "state": "Nordrhein-Westfalen",
                "postcode": "48143",
                "country": "Deutschland",
                "country_code": "de"
            }
        }
    ]"#;

    #[test]
    fn convert_full_place() {
        let places: Vec<Place> = parse_json(RESPONSE).unwrap();
        let loc = convert_places(places).unwrap();

        assert_eq!(loc.latitude(), 51.9622);
        assert_eq!(loc.longitude(), 7.628);
        assert_eq!(loc.street_and_number(), Some("Prinzipalmarkt 10"));
        assert_eq!(loc.neighborhood(), Some("Altstadt"));
        assert_eq!(loc.city(), Some("Münster"));
        assert_eq!(loc.country(), Some("Deutschland"));
        assert_eq!(
            loc.to_string(),
            "Prinzipalmarkt 10, 48143 Münster (Altstadt), Nordrhein-Westfalen, Deutschland"
        );
    }

    #[test]
    fn town_preferred_over_city() {
        let json = r#"[{"lat": "52.0", "lon": "7.5", "address": {"town": "Greven", "city": "Münster"}}]"#;
        let loc = convert_places(parse_json(json).unwrap()).unwrap();
        assert_eq!(loc.city(), Some("Greven"));
    }

    #[test]
    fn house_number_without_road() {
        let json = r#"[{"lat": "52.0", "lon": "7.5", "address": {"house_number": "7"}}]"#;
        let loc = convert_places(parse_json(json).unwrap()).unwrap();
        assert_eq!(loc.street_and_number(), Some("7"));
    }

    #[test]
    fn missing_address_gives_bare_coordinates() {
        let json = r#"[{"lat": "52.0", "lon": "7.5"}]"#;
        let loc = convert_places(parse_json(json).unwrap()).unwrap();
        assert_eq!(loc, Location::new(52.0, 7.5));
    }

    #[test]
    fn empty_array_is_no_result() {
        let places: Vec<Place> = parse_json("[]").unwrap();
        assert!(matches!(convert_places(places), Err(ProviderError::NoResult)));
    }

    #[test]
    fn bad_coordinate_is_json_error() {
        let json = r#"[{"lat": "north", "lon": "7.5"}]"#;
        let result = convert_places(parse_json(json).unwrap());
        assert!(matches!(result, Err(ProviderError::Json { .. })));
    }

    #[test]
    fn error_object_fails_to_parse() {
        // LocationIQ answers unknown addresses with an object, not an array.
        let json = r#"{"error": "Unable to geocode"}"#;
        assert!(parse_json::<Vec<Place>>(json).is_err());
    }

    #[tokio::test]
    async fn placeholder_key_is_unavailable() {
        let mut creds = Credentials::empty();
        creds.insert(service::LOCATIONIQ, "PASTE_KEY_HERE");
        let client = LocationIqClient::new(LocationIqConfig::new(), Arc::new(creds)).unwrap();

        let result = client.geocode("Münster").await;
        assert!(matches!(result, Err(ProviderError::Unavailable { .. })));
    }
}
