//! Geographic locations and their canonical rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Equatorial earth radius in kilometres used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Structured postal details of a location.
///
/// Every field is optional. Values are trimmed when they enter a
/// [`Location`]; empty strings are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    /// Street name and, if known, the house number.
    pub street_and_number: Option<String>,
    /// Postal code.
    pub zip_code: Option<String>,
    /// Neighbourhood or borough.
    pub neighborhood: Option<String>,
    /// City or town.
    pub city: Option<String>,
    /// County or similar administrative area.
    pub county: Option<String>,
    /// State (not country).
    pub state: Option<String>,
    /// Country.
    pub country: Option<String>,
}

impl PostalAddress {
    /// Set the street and house number.
    pub fn with_street_and_number(mut self, value: impl Into<String>) -> Self {
        self.street_and_number = Some(value.into());
        self
    }

    /// Set the postal code.
    pub fn with_zip_code(mut self, value: impl Into<String>) -> Self {
        self.zip_code = Some(value.into());
        self
    }

    /// Set the neighbourhood.
    pub fn with_neighborhood(mut self, value: impl Into<String>) -> Self {
        self.neighborhood = Some(value.into());
        self
    }

    /// Set the city.
    pub fn with_city(mut self, value: impl Into<String>) -> Self {
        self.city = Some(value.into());
        self
    }

    /// Set the county.
    pub fn with_county(mut self, value: impl Into<String>) -> Self {
        self.county = Some(value.into());
        self
    }

    /// Set the state.
    pub fn with_state(mut self, value: impl Into<String>) -> Self {
        self.state = Some(value.into());
        self
    }

    /// Set the country.
    pub fn with_country(mut self, value: impl Into<String>) -> Self {
        self.country = Some(value.into());
        self
    }

    /// True if no field carries a value.
    pub fn is_empty(&self) -> bool {
        [
            &self.street_and_number,
            &self.zip_code,
            &self.neighborhood,
            &self.city,
            &self.county,
            &self.state,
            &self.country,
        ]
        .iter()
        .all(|field| present(field).is_none())
    }

    /// Trim every field and drop the ones left empty.
    fn normalized(self) -> Self {
        Self {
            street_and_number: clean(self.street_and_number),
            zip_code: clean(self.zip_code),
            neighborhood: clean(self.neighborhood),
            city: clean(self.city),
            county: clean(self.county),
            state: clean(self.state),
            country: clean(self.country),
        }
    }

    /// Assemble the address line, e.g. `Main St 1, 12345 Springfield (Old Town), Germany`.
    fn render(&self) -> String {
        let zip = present(&self.zip_code);
        let city = present(&self.city);

        let mut out = String::with_capacity(160);
        if let Some(street) = present(&self.street_and_number) {
            out.push_str(street);
        }
        if let Some(zip) = zip {
            out.push_str(", ");
            out.push_str(zip);
        }
        if let Some(city) = city {
            out.push_str(if zip.is_some() { " " } else { ", " });
            out.push_str(city);
        }
        if let Some(neighborhood) = present(&self.neighborhood) {
            if city.is_some() {
                out.push_str(" (");
                out.push_str(neighborhood);
                out.push(')');
            } else {
                out.push(' ');
                out.push_str(neighborhood);
            }
        }
        for part in [&self.county, &self.state, &self.country]
            .into_iter()
            .filter_map(present)
        {
            out.push_str(", ");
            out.push_str(part);
        }

        match out.strip_prefix(", ") {
            Some(rest) => rest.to_string(),
            None => out,
        }
    }
}

/// A point on earth, optionally named and carrying postal details.
///
/// Coordinates are decimal degrees. Textual fields are trimmed on the way
/// in, so an absent value is always `None` and never an empty string.
///
/// # Examples
///
/// ```
/// use georoute_server::domain::{Location, PostalAddress};
///
/// let address = PostalAddress::default()
///     .with_street_and_number("Main St 1")
///     .with_zip_code("12345")
///     .with_city("Springfield");
/// let loc = Location::with_address(51.96, 7.62, address);
/// assert_eq!(loc.to_string(), "Main St 1, 12345 Springfield");
///
/// let named = Location::named("Town Hall", 51.96, 7.62);
/// assert_eq!(named.to_string(), "Town Hall");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLocation")]
pub struct Location {
    latitude: f64,
    longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    address: PostalAddress,
}

/// Wire form of [`Location`]; normalized on conversion.
#[derive(Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: PostalAddress,
}

impl From<RawLocation> for Location {
    fn from(raw: RawLocation) -> Self {
        let mut loc = Location::with_address(raw.latitude, raw.longitude, raw.address);
        loc.set_name(raw.name.as_deref());
        loc
    }
}

impl Location {
    /// Create a location from bare coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: None,
            address: PostalAddress::default(),
        }
    }

    /// Create a named location.
    pub fn named(name: &str, latitude: f64, longitude: f64) -> Self {
        let mut loc = Self::new(latitude, longitude);
        loc.set_name(Some(name));
        loc
    }

    /// Create a location with postal details.
    pub fn with_address(latitude: f64, longitude: f64, address: PostalAddress) -> Self {
        Self {
            latitude,
            longitude,
            name: None,
            address: address.normalized(),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Postal details (all fields already trimmed).
    pub fn address(&self) -> &PostalAddress {
        &self.address
    }

    pub fn street_and_number(&self) -> Option<&str> {
        self.address.street_and_number.as_deref()
    }

    pub fn zip_code(&self) -> Option<&str> {
        self.address.zip_code.as_deref()
    }

    pub fn neighborhood(&self) -> Option<&str> {
        self.address.neighborhood.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.address.city.as_deref()
    }

    pub fn county(&self) -> Option<&str> {
        self.address.county.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.address.state.as_deref()
    }

    pub fn country(&self) -> Option<&str> {
        self.address.country.as_deref()
    }

    /// Set or clear the display name.
    ///
    /// Changing the name changes the canonical string and therefore any
    /// route cache key derived from this location.
    pub fn set_name(&mut self, name: Option<&str>) {
        self.name = clean(name.map(str::to_string));
    }

    pub fn set_street_and_number(&mut self, value: Option<&str>) {
        self.address.street_and_number = clean(value.map(str::to_string));
    }

    pub fn set_zip_code(&mut self, value: Option<&str>) {
        self.address.zip_code = clean(value.map(str::to_string));
    }

    pub fn set_neighborhood(&mut self, value: Option<&str>) {
        self.address.neighborhood = clean(value.map(str::to_string));
    }

    pub fn set_city(&mut self, value: Option<&str>) {
        self.address.city = clean(value.map(str::to_string));
    }

    pub fn set_county(&mut self, value: Option<&str>) {
        self.address.county = clean(value.map(str::to_string));
    }

    pub fn set_state(&mut self, value: Option<&str>) {
        self.address.state = clean(value.map(str::to_string));
    }

    pub fn set_country(&mut self, value: Option<&str>) {
        self.address.country = clean(value.map(str::to_string));
    }

    /// Replace all postal details at once.
    pub fn set_address(&mut self, address: PostalAddress) {
        self.address = address.normalized();
    }

    /// Great-circle ("bee line") distance to `other` in metres.
    ///
    /// Uses the haversine formula on a sphere of radius [`EARTH_RADIUS_KM`].
    pub fn distance_to(&self, other: &Location) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = other.longitude.to_radians() - self.longitude.to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        // Rounding can push `a` just outside [0, 1] for antipodal points.
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c * 1000.0
    }

    /// True if both locations sit on exactly the same coordinates.
    pub fn same_coordinates(&self, other: &Location) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

impl fmt::Display for Location {
    /// The name if one is set, otherwise the assembled postal address.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.address.render()),
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn springfield() -> PostalAddress {
        PostalAddress::default()
            .with_street_and_number("Main St 1")
            .with_zip_code("12345")
            .with_city("Springfield")
    }

    #[test]
    fn name_wins_over_address() {
        let mut loc = Location::with_address(51.0, 7.0, springfield());
        loc.set_name(Some("Springfield Elementary"));
        assert_eq!(loc.to_string(), "Springfield Elementary");
    }

    #[test]
    fn street_zip_city() {
        let loc = Location::with_address(51.0, 7.0, springfield());
        assert_eq!(loc.to_string(), "Main St 1, 12345 Springfield");
    }

    #[test]
    fn city_without_zip_uses_comma() {
        let address = PostalAddress::default()
            .with_street_and_number("Main St 1")
            .with_city("Springfield");
        let loc = Location::with_address(51.0, 7.0, address);
        assert_eq!(loc.to_string(), "Main St 1, Springfield");
    }

    #[test]
    fn leading_separator_is_stripped() {
        let address = PostalAddress::default()
            .with_zip_code("48143")
            .with_city("Münster")
            .with_country("Germany");
        let loc = Location::with_address(51.96, 7.62, address);
        assert_eq!(loc.to_string(), "48143 Münster, Germany");
    }

    #[test]
    fn neighborhood_in_parentheses_after_city() {
        let address = springfield().with_neighborhood("Old Town");
        let loc = Location::with_address(51.0, 7.0, address);
        assert_eq!(loc.to_string(), "Main St 1, 12345 Springfield (Old Town)");
    }

    #[test]
    fn neighborhood_without_city() {
        let address = PostalAddress::default()
            .with_street_and_number("Main St 1")
            .with_neighborhood("Old Town");
        let loc = Location::with_address(51.0, 7.0, address);
        assert_eq!(loc.to_string(), "Main St 1 Old Town");
    }

    #[test]
    fn full_address() {
        let address = springfield()
            .with_neighborhood("Old Town")
            .with_county("Greene")
            .with_state("Ohio")
            .with_country("USA");
        let loc = Location::with_address(39.9, -83.8, address);
        assert_eq!(
            loc.to_string(),
            "Main St 1, 12345 Springfield (Old Town), Greene, Ohio, USA"
        );
    }

    #[test]
    fn bare_coordinates_render_empty() {
        assert_eq!(Location::new(1.0, 2.0).to_string(), "");
    }

    #[test]
    fn fields_are_trimmed_and_blank_becomes_none() {
        let address = PostalAddress::default()
            .with_street_and_number("  Main St 1 ")
            .with_zip_code("   ")
            .with_city("\tSpringfield\n");
        let loc = Location::with_address(51.0, 7.0, address);
        assert_eq!(loc.street_and_number(), Some("Main St 1"));
        assert_eq!(loc.zip_code(), None);
        assert_eq!(loc.city(), Some("Springfield"));
    }

    #[test]
    fn setters_trim() {
        let mut loc = Location::new(51.0, 7.0);
        loc.set_city(Some("  Springfield  "));
        loc.set_name(Some(""));
        assert_eq!(loc.city(), Some("Springfield"));
        assert_eq!(loc.name(), None);
        assert_eq!(loc.to_string(), "Springfield");
    }

    #[test]
    fn renaming_changes_canonical_string() {
        let mut loc = Location::with_address(51.0, 7.0, springfield());
        let before = loc.to_string();
        loc.set_name(Some("Home"));
        assert_ne!(before, loc.to_string());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let loc = Location::new(51.9625, 7.6256);
        assert_eq!(loc.distance_to(&loc), 0.0);
    }

    #[test]
    fn known_distance() {
        // Münster Hbf -> Dortmund Hbf, roughly 50 km as the crow flies.
        let muenster = Location::new(51.9566, 7.6353);
        let dortmund = Location::new(51.5178, 7.4593);
        let metres = muenster.distance_to(&dortmund);
        assert!((metres - 50_400.0).abs() < 1_500.0, "got {metres}");
    }

    #[test]
    fn antipodal_points_are_finite() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(0.0, 180.0);
        let d = a.distance_to(&b);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM * 1000.0).abs() < 1.0);
    }

    #[test]
    fn empty_address_detection() {
        assert!(PostalAddress::default().is_empty());
        assert!(!springfield().is_empty());
    }

    #[test]
    fn serde_roundtrip_keeps_fields() {
        let mut loc = Location::with_address(51.0, 7.0, springfield());
        loc.set_name(Some("Home"));
        let json = serde_json::to_string(&loc).unwrap();
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back, loc);
    }

    #[test]
    fn deserialize_trims_and_drops_blank_fields() {
        let json = r#"{
            "latitude": 51.0,
            "longitude": 7.0,
            "name": "  ",
            "address": {"city": " Springfield ", "zip_code": ""}
        }"#;
        let loc: Location = serde_json::from_str(json).unwrap();

        assert_eq!(loc.name(), None);
        assert_eq!(loc.city(), Some("Springfield"));
        assert_eq!(loc.zip_code(), None);
        assert_eq!(loc.to_string(), "Springfield");
    }
}
