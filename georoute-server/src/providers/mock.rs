//! Scripted providers for testing without network access.
//!
//! Each mock answers every request the same way and counts how often it
//! was asked, so tests can check which providers a resolver consulted.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;

use crate::domain::{Location, Route};

use super::error::ProviderError;
use super::{GeocodeProvider, MatrixProvider, Provider, RouteProvider};

/// What a mock provider answers.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    /// Succeed with this value.
    Ok(T),
    /// Behave like a provider without a configured key.
    Unavailable,
    /// Fail like a server error with this message.
    Fail(String),
}

impl<T: Clone> Reply<T> {
    fn produce(&self, service: &str) -> Result<T, ProviderError> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Unavailable => Err(ProviderError::Unavailable {
                service: service.to_string(),
            }),
            Reply::Fail(message) => Err(ProviderError::Api {
                status: 503,
                message: message.clone(),
            }),
        }
    }
}

/// A geocoder that always gives the same answer.
#[derive(Debug)]
pub struct MockGeocoder {
    name: String,
    reply: Reply<Location>,
    calls: AtomicUsize,
}

impl MockGeocoder {
    pub fn new(name: impl Into<String>, reply: Reply<Location>) -> Self {
        Self {
            name: name.into(),
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always finds `location`.
    pub fn found(name: impl Into<String>, location: Location) -> Self {
        Self::new(name, Reply::Ok(location))
    }

    /// Always fails with a server error.
    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name, Reply::Fail("service unavailable".to_string()))
    }

    /// Always reports a missing key.
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self::new(name, Reply::Unavailable)
    }

    /// How many lookups were made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Provider for MockGeocoder {
    fn name(&self) -> &str {
        &self.name
    }
}

impl GeocodeProvider for MockGeocoder {
    fn geocode<'a>(&'a self, _address: &'a str) -> BoxFuture<'a, Result<Location, ProviderError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.reply.produce(&self.name);
        Box::pin(async move { result })
    }
}

/// A router that always gives the same answer.
#[derive(Debug)]
pub struct MockRouter {
    name: String,
    reply: Reply<Route>,
    calls: AtomicUsize,
}

impl MockRouter {
    pub fn new(name: impl Into<String>, reply: Reply<Route>) -> Self {
        Self {
            name: name.into(),
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always finds a route with the given duration (s) and distance (km).
    pub fn found(name: impl Into<String>, duration: f64, distance: f64) -> Self {
        let route = Route {
            duration,
            distance,
            ..Route::empty()
        };
        Self::new(name, Reply::Ok(route))
    }

    /// Always fails with a server error.
    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name, Reply::Fail("service unavailable".to_string()))
    }

    /// How many routes were requested.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Provider for MockRouter {
    fn name(&self) -> &str {
        &self.name
    }
}

impl RouteProvider for MockRouter {
    fn route<'a>(
        &'a self,
        _from: &'a Location,
        _to: &'a Location,
    ) -> BoxFuture<'a, Result<Route, ProviderError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.reply.produce(&self.name);
        Box::pin(async move { result })
    }
}

/// A matrix provider answering with fixed durations.
#[derive(Debug)]
pub struct MockMatrix {
    reply: Reply<Vec<f64>>,
    last_starts: Mutex<Option<usize>>,
}

impl MockMatrix {
    pub fn new(reply: Reply<Vec<f64>>) -> Self {
        Self {
            reply,
            last_starts: Mutex::new(None),
        }
    }

    /// Number of starts in the most recent request, if any.
    pub fn last_request_size(&self) -> Option<usize> {
        *self
            .last_starts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Provider for MockMatrix {
    fn name(&self) -> &str {
        "mock-matrix"
    }
}

impl MatrixProvider for MockMatrix {
    fn durations<'a>(
        &'a self,
        _destination: &'a Location,
        starts: &'a [Location],
    ) -> BoxFuture<'a, Result<Vec<f64>, ProviderError>> {
        *self
            .last_starts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(starts.len());
        let result = self.reply.produce(self.name());
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn geocoder_counts_calls() {
        let mock = MockGeocoder::found("a", Location::new(1.0, 2.0));
        assert_eq!(mock.geocode("x").await.unwrap(), Location::new(1.0, 2.0));
        assert_eq!(mock.geocode("y").await.unwrap(), Location::new(1.0, 2.0));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn unavailable_reply() {
        let mock = MockGeocoder::unavailable("a");
        let err = mock.geocode("x").await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn router_failure() {
        let mock = MockRouter::failing("r");
        let here = Location::new(0.0, 0.0);
        assert!(mock.route(&here, &here).await.is_err());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn matrix_records_request_size() {
        let mock = MockMatrix::new(Reply::Ok(vec![1.0, 2.0]));
        let dest = Location::new(0.0, 0.0);
        let starts = [Location::new(1.0, 1.0), Location::new(2.0, 2.0)];

        assert_eq!(mock.durations(&dest, &starts).await.unwrap(), vec![1.0, 2.0]);
        assert_eq!(mock.last_request_size(), Some(2));
    }
}
