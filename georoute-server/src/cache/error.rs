//! Cache error types.

use std::path::PathBuf;

/// Errors raised while reading or writing cached entries.
///
/// Resolvers log these and carry on; a broken cache never fails a lookup.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing file could not be read or written
    #[error("cache I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry could not be serialized
    #[error("failed to encode cache entry: {message}")]
    Encode { message: String },

    /// A stored entry could not be deserialized
    #[error("failed to decode cache entry {key:?}: {message}")]
    Decode { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CacheError::Decode {
            key: "münster".into(),
            message: "expected value".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to decode cache entry \"münster\": expected value"
        );

        let err = CacheError::Io {
            path: PathBuf::from("/tmp/geo.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("cache I/O error on /tmp/geo.json"));
    }
}
