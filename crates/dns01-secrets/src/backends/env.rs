//! Environment variable backend

use crate::error::SecretError;

pub fn resolve(var_name: &str) -> Result<String, SecretError> {
    std::env::var(var_name).map_err(|_| SecretError::EnvNotSet {
        var: var_name.to_string(),
    })
}
