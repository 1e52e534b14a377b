use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::SecretError;

/// A reference to a credential that can be resolved from various backends.
///
/// Supports the following URI schemes:
/// - `env://VAR_NAME` - Environment variable
/// - `file:///path/to/file` - File content (bare `/`, `./` and `../` paths too)
/// - `base64://DATA` - Inline base64-encoded value
/// - Plain string - Literal value
#[derive(Clone, PartialEq)]
pub enum SecretUri {
    /// Plain text value (no URI scheme)
    Plain(String),

    /// Environment variable: `env://VAR_NAME`
    Env { var_name: String },

    /// File path: `file:///path/to/file` or just a path
    File { path: PathBuf },

    /// Inline base64: `base64://DATA`
    Base64 { data: String },
}

impl SecretUri {
    pub fn is_plain(&self) -> bool {
        matches!(self, SecretUri::Plain(_))
    }

    /// Get the backend name for logging/errors
    pub fn backend_name(&self) -> &'static str {
        match self {
            SecretUri::Plain(_) => "plain",
            SecretUri::Env { .. } => "env",
            SecretUri::File { .. } => "file",
            SecretUri::Base64 { .. } => "base64",
        }
    }
}

// Plain and base64 variants carry the token itself
impl fmt::Debug for SecretUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretUri::Plain(_) => f.write_str("Plain(<redacted>)"),
            SecretUri::Env { var_name } => f.debug_struct("Env").field("var_name", var_name).finish(),
            SecretUri::File { path } => f.debug_struct("File").field("path", path).finish(),
            SecretUri::Base64 { .. } => f.write_str("Base64(<redacted>)"),
        }
    }
}

impl FromStr for SecretUri {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(var_name) = s.strip_prefix("env://") {
            parse_env_uri(s, var_name)
        } else if let Some(path) = s.strip_prefix("file://") {
            parse_file_uri(s, path)
        } else if let Some(data) = s.strip_prefix("base64://") {
            parse_base64_uri(s, data)
        } else if looks_like_file_path(s) {
            Ok(SecretUri::File {
                path: PathBuf::from(s),
            })
        } else {
            Ok(SecretUri::Plain(s.to_string()))
        }
    }
}

fn parse_env_uri(s: &str, var_name: &str) -> Result<SecretUri, SecretError> {
    if var_name.is_empty() {
        return Err(SecretError::invalid_uri(
            s,
            "env URI must specify a variable name",
        ));
    }

    Ok(SecretUri::Env {
        var_name: var_name.to_string(),
    })
}

fn parse_file_uri(s: &str, path: &str) -> Result<SecretUri, SecretError> {
    if path.is_empty() {
        return Err(SecretError::invalid_uri(s, "file URI must specify a path"));
    }

    Ok(SecretUri::File {
        path: PathBuf::from(path),
    })
}

fn parse_base64_uri(s: &str, data: &str) -> Result<SecretUri, SecretError> {
    if data.is_empty() {
        return Err(SecretError::invalid_uri(s, "base64 URI must carry data"));
    }

    Ok(SecretUri::Base64 {
        data: data.to_string(),
    })
}

fn looks_like_file_path(s: &str) -> bool {
    s.starts_with('/') || s.starts_with("./") || s.starts_with("../")
}

impl<'de> Deserialize<'de> for SecretUri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SecretUri::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uri() {
        let uri: SecretUri = "env://DIGITALOCEAN_TOKEN".parse().unwrap();
        assert_eq!(
            uri,
            SecretUri::Env {
                var_name: "DIGITALOCEAN_TOKEN".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_file_uri() {
        let uri: SecretUri = "file:///run/secrets/do-token".parse().unwrap();
        assert_eq!(
            uri,
            SecretUri::File {
                path: PathBuf::from("/run/secrets/do-token"),
            }
        );
    }

    #[test]
    fn test_parse_bare_paths() {
        for raw in ["/run/secrets/do-token", "./do-token", "../secrets/do-token"] {
            let uri: SecretUri = raw.parse().unwrap();
            assert_eq!(
                uri,
                SecretUri::File {
                    path: PathBuf::from(raw),
                }
            );
        }
    }

    #[test]
    fn test_parse_base64_uri() {
        let uri: SecretUri = "base64://ZG9wX3YxX3Rva2Vu".parse().unwrap();
        assert_eq!(
            uri,
            SecretUri::Base64 {
                data: "ZG9wX3YxX3Rva2Vu".to_string(),
            }
        );
        assert_eq!(uri.backend_name(), "base64");
    }

    #[test]
    fn test_parse_plain_value() {
        let uri: SecretUri = "dop_v1_plain".parse().unwrap();
        assert!(uri.is_plain());
        assert_eq!(uri, SecretUri::Plain("dop_v1_plain".to_string()));
    }

    #[test]
    fn test_empty_schemes_are_rejected() {
        for raw in ["env://", "file://", "base64://"] {
            let result: Result<SecretUri, _> = raw.parse();
            assert!(
                matches!(result, Err(SecretError::InvalidUri { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_debug_hides_inline_tokens() {
        let plain = SecretUri::Plain("dop_v1_secret".to_string());
        assert!(!format!("{:?}", plain).contains("dop_v1_secret"));

        let encoded = SecretUri::Base64 {
            data: "ZG9wX3YxX3Rva2Vu".to_string(),
        };
        assert!(!format!("{:?}", encoded).contains("ZG9wX3YxX3Rva2Vu"));

        let env = SecretUri::Env {
            var_name: "DIGITALOCEAN_TOKEN".to_string(),
        };
        assert!(format!("{:?}", env).contains("DIGITALOCEAN_TOKEN"));
    }
}
