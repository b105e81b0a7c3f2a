//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::GeoCache;
use crate::resolver::{Geocoder, Router};

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Address resolution
    pub geocoder: Arc<Geocoder>,

    /// Route calculation
    pub router: Arc<Router>,

    /// Cache shared by both resolvers, if any
    pub cache: Option<Arc<GeoCache>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(geocoder: Geocoder, router: Router, cache: Option<GeoCache>) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            router: Arc::new(router),
            cache: cache.map(Arc::new),
        }
    }

    pub fn cache(&self) -> Option<&GeoCache> {
        self.cache.as_deref()
    }
}
