//! Adapters for external geocoding and routing services.
//!
//! Each provider sits behind one of three small traits so the resolvers
//! can treat them as an ordered, interchangeable list:
//!
//! - [`GeocodeProvider`]: address → [`Location`]
//! - [`RouteProvider`]: location pair → [`Route`]
//! - [`MatrixProvider`]: one destination, many starts → durations
//!
//! Methods return boxed futures so heterogeneous providers can live in
//! one `Vec<Box<dyn ...>>`.

mod error;
mod http;
mod locationiq;
mod mapquest;
#[cfg(test)]
pub(crate) mod mock;
mod openroute;
mod osrm;

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::domain::{Location, Route};

pub use error::ProviderError;
pub use http::DEFAULT_TIMEOUT_SECS;
pub use locationiq::{LocationIqClient, LocationIqConfig};
pub use mapquest::{MapQuestClient, MapQuestConfig};
pub use openroute::{OpenRouteServiceClient, OpenRouteServiceConfig};
pub use osrm::{OsrmClient, OsrmConfig};

/// Something with a name worth logging.
pub trait Provider: Send + Sync {
    /// Short, stable name used in log messages (e.g. `"mapquest"`).
    fn name(&self) -> &str;
}

/// Resolves a free-form address to a location.
pub trait GeocodeProvider: Provider {
    /// Look up `address`.
    ///
    /// Adapters should fill in postal details when the service returns
    /// them. Returns [`ProviderError::Unavailable`] without any network
    /// traffic if the provider needs a key that is not configured.
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<Location, ProviderError>>;
}

/// Computes a driving route between two locations.
pub trait RouteProvider: Provider {
    /// Route from `from` to `to`.
    ///
    /// The returned route carries duration (seconds), distance
    /// (kilometres) and, where the service exposes it, the step geometry
    /// as waypoints. Endpoints may be left unset; the resolver fills them.
    fn route<'a>(
        &'a self,
        from: &'a Location,
        to: &'a Location,
    ) -> BoxFuture<'a, Result<Route, ProviderError>>;
}

/// Computes travel durations from many starts to one destination.
pub trait MatrixProvider: Provider {
    /// One duration in seconds per entry of `starts`, in the same order.
    fn durations<'a>(
        &'a self,
        destination: &'a Location,
        starts: &'a [Location],
    ) -> BoxFuture<'a, Result<Vec<f64>, ProviderError>>;
}

impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: GeocodeProvider + ?Sized> GeocodeProvider for Arc<P> {
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<Location, ProviderError>> {
        (**self).geocode(address)
    }
}

impl<P: RouteProvider + ?Sized> RouteProvider for Arc<P> {
    fn route<'a>(
        &'a self,
        from: &'a Location,
        to: &'a Location,
    ) -> BoxFuture<'a, Result<Route, ProviderError>> {
        (**self).route(from, to)
    }
}

impl<P: MatrixProvider + ?Sized> MatrixProvider for Arc<P> {
    fn durations<'a>(
        &'a self,
        destination: &'a Location,
        starts: &'a [Location],
    ) -> BoxFuture<'a, Result<Vec<f64>, ProviderError>> {
        (**self).durations(destination, starts)
    }
}

/// `lon,lat` as used in OSRM and OpenRouteService URLs.
pub(crate) fn lon_lat(loc: &Location) -> String {
    format!("{},{}", loc.longitude(), loc.latitude())
}
