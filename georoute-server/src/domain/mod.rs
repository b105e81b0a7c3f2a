//! Core value types: locations, routes and plausibility boxes.

mod bounds;
mod location;
mod route;

pub use bounds::BoundingBox;
pub use location::{EARTH_RADIUS_KM, Location, PostalAddress};
pub use route::Route;
