//! Address to location resolution.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::GeoCache;
use crate::credentials::Credentials;
use crate::domain::{BoundingBox, Location};
use crate::providers::{
    GeocodeProvider, LocationIqClient, LocationIqConfig, MapQuestClient, MapQuestConfig,
    ProviderError,
};

use super::error::ResolveError;
use super::fallback::first_success;

/// Configuration for the geocoder.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Results outside this box are treated as implausible and discarded.
    pub bounds: BoundingBox,

    /// Log cache hits and each provider consulted at info level.
    pub verbose: bool,
}

impl GeocoderConfig {
    pub fn new(bounds: BoundingBox, verbose: bool) -> Self {
        Self { bounds, verbose }
    }

    /// Set the plausibility box.
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = bounds;
        self
    }

    /// Enable or disable progress logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::NORTH_WEST_EUROPE,
            verbose: false,
        }
    }
}

/// Resolves addresses through an ordered list of geocoding providers.
pub struct Geocoder {
    config: GeocoderConfig,
    providers: Vec<Box<dyn GeocodeProvider>>,
}

impl Geocoder {
    /// A geocoder asking `providers` in the given order.
    pub fn new(config: GeocoderConfig, providers: Vec<Box<dyn GeocodeProvider>>) -> Self {
        Self { config, providers }
    }

    /// MapQuest first, then LocationIQ.
    pub fn with_default_providers(
        config: GeocoderConfig,
        credentials: Arc<Credentials>,
    ) -> Result<Self, ProviderError> {
        let providers: Vec<Box<dyn GeocodeProvider>> = vec![
            Box::new(MapQuestClient::new(
                MapQuestConfig::default(),
                Arc::clone(&credentials),
            )?),
            Box::new(LocationIqClient::new(
                LocationIqConfig::default(),
                credentials,
            )?),
        ];
        Ok(Self::new(config, providers))
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    /// Names of the configured providers, in the order they are asked.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Find `address` on earth.
    ///
    /// Consults `cache` first, then each provider until one returns a
    /// location inside the configured bounds. A successful lookup is
    /// written back to the cache. Cache failures are logged and never
    /// fail the lookup.
    ///
    /// Returns `Ok(None)` if no provider found a plausible location.
    pub async fn find(
        &self,
        address: &str,
        cache: Option<&GeoCache>,
    ) -> Result<Option<Location>, ResolveError> {
        if address.trim().is_empty() {
            return Err(ResolveError::InvalidArgument(
                "address must not be empty".to_string(),
            ));
        }

        match cache {
            Some(cache) => match cache.read_location(address) {
                Ok(Some(location)) => {
                    if self.config.verbose {
                        info!(address, "using cache to find address");
                    }
                    return Ok(Some(location));
                }
                Ok(None) => debug!(address, "geocode cache miss"),
                Err(e) => warn!(address, error = %e, "could not read geocode cache"),
            },
            None => warn!("geocoder is not using any cache"),
        }

        let bounds = self.config.bounds;
        let found = first_success(
            &self.providers,
            self.config.verbose,
            |provider| provider.geocode(address),
            |location| {
                if bounds.contains(location) {
                    Ok(())
                } else {
                    Err(format!(
                        "{},{} is outside the plausible area",
                        location.latitude(),
                        location.longitude()
                    ))
                }
            },
        )
        .await;

        match &found {
            Some(location) => {
                if let Some(cache) = cache
                    && let Err(e) = cache.store_location(address, location)
                {
                    warn!(address, error = %e, "could not store geocode result");
                }
            }
            None => warn!(address, "could not find address with any provider"),
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockGeocoder;

    fn muenster() -> Location {
        Location::named("Münster", 51.9625, 7.6256)
    }

    #[test]
    fn default_config() {
        let config = GeocoderConfig::default();
        assert_eq!(config.bounds, BoundingBox::NORTH_WEST_EUROPE);
        assert!(!config.verbose);

        let config = config.with_bounds(BoundingBox::WORLD).with_verbose(true);
        assert_eq!(config.bounds, BoundingBox::WORLD);
        assert!(config.verbose);
    }

    #[test]
    fn default_provider_order() {
        let geocoder =
            Geocoder::with_default_providers(GeocoderConfig::default(), Arc::new(Credentials::empty()))
                .unwrap();
        assert_eq!(geocoder.provider_names(), vec!["mapquest", "locationiq"]);
    }

    #[tokio::test]
    async fn empty_address_is_invalid() {
        let geocoder = Geocoder::new(GeocoderConfig::default(), Vec::new());
        assert!(matches!(
            geocoder.find("", None).await,
            Err(ResolveError::InvalidArgument(_))
        ));
        assert!(matches!(
            geocoder.find("   ", None).await,
            Err(ResolveError::InvalidArgument(_))
        ));
    }
}
