//! Credential loading errors.

use std::path::PathBuf;

/// Errors that can occur while loading API keys.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// The key file could not be read
    #[error("failed to read API keys from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
