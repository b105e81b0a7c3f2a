use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use georoute_server::cache::GeoCache;
use georoute_server::credentials::Credentials;
use georoute_server::resolver::{Geocoder, GeocoderConfig, Router, RouterConfig};
use georoute_server::supervisor::{
    LocalRoutingService, ServiceLifecycle, SupervisorConfig, Unmanaged,
};
use georoute_server::web::{AppState, serve, shutdown_signal};

const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

/// Cache entries older than this many days are resolved again.
const DEFAULT_CACHE_DAYS: u64 = 30;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let verbose = std::env::var("GEOROUTE_VERBOSE").is_ok_and(|v| v == "1" || v == "true");

    let credentials = match std::env::var("GEOROUTE_KEYS_FILE") {
        Ok(path) => Credentials::load(path)?,
        Err(_) => {
            tracing::warn!("GEOROUTE_KEYS_FILE not set, only keyless providers will answer");
            Credentials::empty()
        }
    };
    let credentials = Arc::new(credentials);

    let cache_days = match std::env::var("GEOROUTE_CACHE_DAYS") {
        Ok(days) => days.parse::<u64>()?,
        Err(_) => DEFAULT_CACHE_DAYS,
    };
    let durability = Duration::from_secs(cache_days * 24 * 60 * 60);
    let cache = match std::env::var("GEOROUTE_CACHE_FILE") {
        Ok(path) => GeoCache::open(path, durability)?,
        Err(_) => {
            tracing::info!("GEOROUTE_CACHE_FILE not set, caching in memory only");
            GeoCache::in_memory(durability)
        }
    };

    let lifecycle: Arc<dyn ServiceLifecycle> = match (
        std::env::var("GEOROUTE_OSRM_BINARY"),
        std::env::var("GEOROUTE_OSRM_DATA"),
    ) {
        (Ok(binary), Ok(data)) => Arc::new(LocalRoutingService::new(SupervisorConfig::osrm(
            binary, data,
        ))),
        _ => Arc::new(Unmanaged),
    };

    let geocoder = Geocoder::with_default_providers(
        GeocoderConfig::default().with_verbose(verbose),
        Arc::clone(&credentials),
    )?;
    let router = Router::with_default_providers(
        RouterConfig::default().with_verbose(verbose),
        lifecycle,
        credentials,
    )?;

    let state = AppState::new(geocoder, router, Some(cache));

    let addr: SocketAddr = std::env::var("GEOROUTE_LISTEN")
        .unwrap_or_else(|_| DEFAULT_LISTEN.to_string())
        .parse()?;
    tracing::info!(%addr, cache_days, "georoute listening");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  GET  /geocode?q=      - Resolve an address");
    tracing::info!("  POST /route           - Route between two points");
    tracing::info!("  POST /matrix          - Durations from many starts");
    tracing::info!("  POST /shortest        - Fastest of the given routes");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, state, shutdown_signal()).await?;
    Ok(())
}
