//! Error types for the resolvers.

use crate::providers::ProviderError;

/// Errors surfaced to callers of the resolvers.
///
/// Not finding anything is not an error: the resolvers return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The request itself is unusable
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A provider without fallback failed
    #[error("{provider} failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = ResolveError::InvalidArgument("empty address".to_string());
        assert_eq!(err.to_string(), "invalid argument: empty address");

        let err = ResolveError::Provider {
            provider: "osrm-local".to_string(),
            source: ProviderError::NoResult,
        };
        assert!(err.to_string().starts_with("osrm-local failed: "));
    }
}
