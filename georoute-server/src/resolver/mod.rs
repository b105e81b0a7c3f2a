//! Geocoding and routing with provider fallback.
//!
//! [`Geocoder`] and [`Router`] each hold an ordered list of providers and
//! ask them one at a time until one succeeds. Both read from and write
//! to an optional [`GeoCache`](crate::cache::GeoCache); cache failures
//! are logged and otherwise ignored.

mod error;
mod fallback;
mod geocoder;
mod router;

pub use error::ResolveError;
pub use fallback::first_success;
pub use geocoder::{Geocoder, GeocoderConfig};
pub use router::{Router, RouterConfig, shortest_route};
