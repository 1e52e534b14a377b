//! Secret resolution dispatcher

use crate::error::SecretError;
use crate::uri::SecretUri;

/// Resolves credentials from various backends based on URI scheme
#[derive(Debug, Default)]
pub struct SecretResolver {
    _private: (),
}

impl SecretResolver {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Resolve a SecretUri to its actual value
    pub fn resolve(&self, uri: &SecretUri) -> Result<String, SecretError> {
        tracing::debug!(backend = uri.backend_name(), "Resolving secret");

        match uri {
            SecretUri::Plain(value) => Ok(value.clone()),

            #[cfg(feature = "env")]
            SecretUri::Env { var_name } => crate::backends::env::resolve(var_name),

            #[cfg(not(feature = "env"))]
            SecretUri::Env { .. } => Err(SecretError::disabled("env")),

            #[cfg(feature = "file")]
            SecretUri::File { path } => crate::backends::file::resolve(path),

            #[cfg(not(feature = "file"))]
            SecretUri::File { .. } => Err(SecretError::disabled("file")),

            #[cfg(feature = "base64")]
            SecretUri::Base64 { data } => crate::backends::base64::resolve(data),

            #[cfg(not(feature = "base64"))]
            SecretUri::Base64 { .. } => Err(SecretError::disabled("base64")),
        }
    }

    /// Resolve a SecretUri, trimming whitespace from the result
    pub fn resolve_trimmed(&self, uri: &SecretUri) -> Result<String, SecretError> {
        self.resolve(uri).map(|s| s.trim().to_string())
    }
}
