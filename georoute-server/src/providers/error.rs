//! Provider error types.

/// Errors from a single geocoding or routing provider.
///
/// The resolvers treat every variant as "try the next provider";
/// [`ProviderError::Unavailable`] is logged as a skip rather than a
/// failure.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No usable credential is configured for the provider
    #[error("no API key configured for {service}")]
    Unavailable { service: String },

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Invalid API key or unauthorized
    #[error("unauthorized (check the API key)")]
    Unauthorized,

    /// Rate limited by the provider
    #[error("rate limited")]
    RateLimited,

    /// Failed to parse the response body
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Provider understood the request but refused it (e.g. no route)
    #[error("request rejected: {message}")]
    Rejected { message: String },

    /// Provider answered but found nothing
    #[error("no result")]
    NoResult,
}

impl ProviderError {
    /// True if the provider was skipped for lack of credentials.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ProviderError::Unavailable { .. })
    }
}
