//! Route calculation between locations.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::GeoCache;
use crate::credentials::Credentials;
use crate::domain::{Location, Route};
use crate::providers::{
    MatrixProvider, OpenRouteServiceClient, OpenRouteServiceConfig, OsrmClient, OsrmConfig,
    ProviderError, RouteProvider,
};
use crate::supervisor::ServiceLifecycle;

use super::error::ResolveError;
use super::fallback::first_success;

/// Configuration for the router.
#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    /// Log cache hits and each provider consulted at info level.
    pub verbose: bool,
}

impl RouterConfig {
    /// Enable or disable progress logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Calculates routes through an ordered list of routing providers.
///
/// Before each route calculation the router makes sure the local
/// routing service is up, starting it through its lifecycle if needed.
/// Duration matrices go to a single provider without fallback.
pub struct Router {
    config: RouterConfig,
    lifecycle: Arc<dyn ServiceLifecycle>,
    providers: Vec<Box<dyn RouteProvider>>,
    matrix: Box<dyn MatrixProvider>,
}

impl Router {
    pub fn new(
        config: RouterConfig,
        lifecycle: Arc<dyn ServiceLifecycle>,
        providers: Vec<Box<dyn RouteProvider>>,
        matrix: Box<dyn MatrixProvider>,
    ) -> Self {
        Self {
            config,
            lifecycle,
            providers,
            matrix,
        }
    }

    /// Local OSRM, then the OSRM demo server, then OpenRouteService.
    /// Matrices use the local OSRM server.
    pub fn with_default_providers(
        config: RouterConfig,
        lifecycle: Arc<dyn ServiceLifecycle>,
        credentials: Arc<Credentials>,
    ) -> Result<Self, ProviderError> {
        let local = Arc::new(OsrmClient::new(OsrmConfig::local())?);
        let providers: Vec<Box<dyn RouteProvider>> = vec![
            Box::new(Arc::clone(&local)),
            Box::new(OsrmClient::new(OsrmConfig::demo())?),
            Box::new(OpenRouteServiceClient::new(
                OpenRouteServiceConfig::default(),
                credentials,
            )?),
        ];
        Ok(Self::new(config, lifecycle, providers, Box::new(local)))
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Names of the configured route providers, in the order they are asked.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Calculate the recommended route from `from` to `to`.
    ///
    /// The returned route always carries `from` and `to` as its
    /// endpoints. Returns `Ok(None)` if every provider failed.
    pub async fn calculate_route(
        &self,
        from: &Location,
        to: &Location,
        cache: Option<&GeoCache>,
    ) -> Result<Option<Route>, ResolveError> {
        self.ensure_local_service().await;

        match cache {
            Some(cache) => match cache.read_route(from, to) {
                Ok(Some(route)) => {
                    if self.config.verbose {
                        info!(%from, %to, "using cache to route");
                    }
                    return Ok(Some(route.with_endpoints(from.clone(), to.clone())));
                }
                Ok(None) => debug!(%from, %to, "route cache miss"),
                Err(e) => warn!(%from, %to, error = %e, "could not read route cache"),
            },
            None => warn!("router is not using any cache"),
        }

        let found = first_success(
            &self.providers,
            self.config.verbose,
            |provider| provider.route(from, to),
            |_| Ok(()),
        )
        .await
        .map(|route| route.with_endpoints(from.clone(), to.clone()));

        match &found {
            Some(route) => {
                if let Some(cache) = cache
                    && let Err(e) = cache.store_route(from, to, route)
                {
                    warn!(%from, %to, error = %e, "could not store route");
                }
            }
            None => warn!(%from, %to, "could not find route with any provider"),
        }

        Ok(found)
    }

    /// Travel durations from each of `starts` to `destination`.
    ///
    /// One route per start, in order, with the duration filled in and
    /// distance set to [`Route::NOT_COMPUTED`]. There is no fallback: a
    /// failing matrix provider fails the whole call.
    pub async fn calculate_matrix(
        &self,
        destination: &Location,
        starts: &[Location],
    ) -> Result<Vec<Route>, ResolveError> {
        if starts.is_empty() {
            return Err(ResolveError::InvalidArgument(
                "at least one start is required".to_string(),
            ));
        }

        let durations = self
            .matrix
            .durations(destination, starts)
            .await
            .map_err(|source| ResolveError::Provider {
                provider: self.matrix.name().to_string(),
                source,
            })?;

        if durations.len() != starts.len() {
            return Err(ResolveError::Provider {
                provider: self.matrix.name().to_string(),
                source: ProviderError::Json {
                    message: format!(
                        "expected {} durations, got {}",
                        starts.len(),
                        durations.len()
                    ),
                },
            });
        }

        Ok(starts
            .iter()
            .zip(durations)
            .map(|(start, duration)| {
                Route::new(start.clone(), destination.clone(), duration, Route::NOT_COMPUTED)
            })
            .collect())
    }

    /// See [`shortest_route`].
    pub fn shortest_route<'r>(&self, routes: &'r [Route]) -> Result<&'r Route, ResolveError> {
        shortest_route(routes)
    }

    async fn ensure_local_service(&self) {
        if self.lifecycle.is_running().await {
            return;
        }
        if self.config.verbose {
            info!("local routing service not running, starting it");
        }
        if let Err(e) = self.lifecycle.ensure_running().await {
            warn!(error = %e, "could not start local routing service");
        }
    }
}

/// The route with the smallest duration. Ties go to the earliest route.
pub fn shortest_route(routes: &[Route]) -> Result<&Route, ResolveError> {
    let (first, rest) = routes.split_first().ok_or_else(|| {
        ResolveError::InvalidArgument("cannot pick the shortest of no routes".to_string())
    })?;

    Ok(rest.iter().fold(first, |best, route| {
        if route.duration < best.duration {
            route
        } else {
            best
        }
    }))
}
