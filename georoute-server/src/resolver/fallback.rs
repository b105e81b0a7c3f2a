//! Ordered provider fallback.

use futures::future::BoxFuture;
use tracing::{info, warn};

use crate::providers::{Provider, ProviderError};

/// Ask each provider in turn until one returns an acceptable result.
///
/// Providers are awaited one at a time, in order. A provider without
/// credentials is skipped quietly, any other failure is logged as a
/// warning, and a result that `accept` rejects is discarded with its
/// reason. Returns `None` once the list is exhausted.
pub async fn first_success<'a, P, T, F, A>(
    providers: &'a [Box<P>],
    verbose: bool,
    mut attempt: F,
    mut accept: A,
) -> Option<T>
where
    P: Provider + ?Sized,
    F: FnMut(&'a P) -> BoxFuture<'a, Result<T, ProviderError>>,
    A: FnMut(&T) -> Result<(), String>,
{
    for provider in providers {
        let provider: &'a P = provider;
        let name = provider.name();
        if verbose {
            info!(provider = name, "asking provider");
        }

        match attempt(provider).await {
            Ok(value) => match accept(&value) {
                Ok(()) => return Some(value),
                Err(reason) => warn!(provider = name, %reason, "discarding result"),
            },
            Err(e) if e.is_unavailable() => {
                info!(provider = name, "skipping provider: {e}");
            }
            Err(e) => warn!(provider = name, error = %e, "provider failed"),
        }
    }
    None
}
