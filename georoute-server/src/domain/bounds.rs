//! Plausibility regions for geocoding results.

use serde::{Deserialize, Serialize};

use super::Location;

/// An inclusive latitude/longitude rectangle.
///
/// Geocoders sometimes return a same-named place on another continent;
/// results outside the box are treated as implausible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// North-western Europe, from Portugal to the Baltic.
    pub const NORTH_WEST_EUROPE: BoundingBox = BoundingBox {
        min_latitude: 35.960223,
        max_latitude: 59.130863,
        min_longitude: -8.085938,
        max_longitude: 28.652344,
    };

    /// The whole globe. Every finite coordinate pair is plausible.
    pub const WORLD: BoundingBox = BoundingBox {
        min_latitude: -90.0,
        max_latitude: 90.0,
        min_longitude: -180.0,
        max_longitude: 180.0,
    };

    /// Create a box from its lower-left and upper-right corners.
    pub fn new(
        min_latitude: f64,
        min_longitude: f64,
        max_latitude: f64,
        max_longitude: f64,
    ) -> Self {
        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    /// True if `loc` lies inside the box, edges included.
    pub fn contains(&self, loc: &Location) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&loc.latitude())
            && (self.min_longitude..=self.max_longitude).contains(&loc.longitude())
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::NORTH_WEST_EUROPE
    }
}
