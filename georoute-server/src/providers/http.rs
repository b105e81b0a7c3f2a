//! Shared HTTP plumbing for the provider adapters.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::error::ProviderError;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Build a client with the given per-request timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()?;
    Ok(http)
}

/// GET `url` with `query` and decode the JSON body.
///
/// Maps 401/403 to [`ProviderError::Unauthorized`], 429 to
/// [`ProviderError::RateLimited`] and other failures to
/// [`ProviderError::Api`].
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, ProviderError> {
    let response = http.get(url).query(query).send().await?;
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProviderError::Unauthorized);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited);
    }

    let body = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message: body.chars().take(500).collect(),
        });
    }

    parse_json(&body)
}

/// Decode a JSON body, keeping a prefix of it in the error.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Json {
        message: format!("{e} (body: {})", body.chars().take(200).collect::<String>()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        assert!(build_client(DEFAULT_TIMEOUT_SECS).is_ok());
    }

    #[test]
    fn parse_json_error_keeps_body_prefix() {
        let err = parse_json::<Vec<u32>>("{\"oops\": true}").unwrap_err();
        match err {
            ProviderError::Json { message } => assert!(message.contains("oops")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
