//! API key lookup for the external providers.
//!
//! Keys are read from a plain text file with one `serviceID key` pair per
//! line. Values starting with [`PLACEHOLDER_PREFIX`] are template
//! leftovers (`PASTE_YOUR_KEY_HERE`) and count as not configured.

mod error;

use std::collections::HashMap;
use std::path::Path;

pub use error::CredentialsError;

/// Prefix of placeholder values shipped in the key file template.
pub const PLACEHOLDER_PREFIX: &str = "PASTE_";

/// Service identifiers used by the bundled provider adapters.
pub mod service {
    pub const MAPQUEST: &str = "mapquest";
    pub const LOCATIONIQ: &str = "locationiq";
    pub const OPENROUTESERVICE: &str = "openrouteservice";
}

/// Service ID → API key map.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    keys: HashMap<String, String>,
}

impl Credentials {
    /// Credentials with no keys at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load keys from a file.
    ///
    /// Blank lines and lines starting with `#` are ignored. Lines without
    /// a key are logged and skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CredentialsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let credentials = Self::parse(&contents);
        tracing::debug!(
            path = %path.display(),
            services = credentials.keys.len(),
            "loaded API keys"
        );
        Ok(credentials)
    }

    /// Parse the `serviceID key` format.
    pub fn parse(contents: &str) -> Self {
        let mut keys = HashMap::new();

        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once(char::is_whitespace) {
                Some((service, key)) if !key.trim().is_empty() => {
                    keys.insert(service.to_string(), key.trim().to_string());
                }
                _ => {
                    tracing::warn!(line = lineno + 1, "ignoring API key line without a key");
                }
            }
        }

        Self { keys }
    }

    /// Add or replace the key for `service`.
    pub fn insert(&mut self, service: impl Into<String>, key: impl Into<String>) {
        self.keys.insert(service.into(), key.into());
    }

    /// The configured value for `service`, placeholder or not.
    pub fn get(&self, service: &str) -> Option<&str> {
        self.keys.get(service).map(String::as_str)
    }

    /// True if `service` has a real (non-placeholder) key.
    pub fn has(&self, service: &str) -> bool {
        self.get(service)
            .is_some_and(|key| !key.starts_with(PLACEHOLDER_PREFIX))
    }

    /// The key for `service`, or `None` if missing or a placeholder.
    pub fn usable(&self, service: &str) -> Option<&str> {
        self.get(service)
            .filter(|key| !key.starts_with(PLACEHOLDER_PREFIX))
    }
}
