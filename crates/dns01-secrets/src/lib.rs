//! Credential resolution for DNS-01 providers
//!
//! API tokens are usually referenced from configuration rather than written
//! inline. This crate turns such a reference into the actual token:
//!
//! - **Environment variables** (`env://VAR_NAME`): Read from process environment
//! - **Files** (`file:///path` or just `/path`): Read content from filesystem
//! - **Base64** (`base64://DATA`): Decode an inline base64 value
//! - **Plain values**: Any string without a URI scheme is treated as a literal value
//!
//! # Example
//!
//! ```rust,ignore
//! use dns01_secrets::{SecretUri, SecretResolver};
//!
//! let uri: SecretUri = "env://DIGITALOCEAN_TOKEN".parse()?;
//! let token = SecretResolver::new().resolve_trimmed(&uri)?;
//! ```
//!
//! # Features
//!
//! - `env` (default): Enable environment variable support
//! - `file` (default): Enable file reading support
//! - `base64` (default): Enable inline base64 values via the `base64` crate

mod backends;
mod error;
mod resolver;
mod uri;

pub use error::SecretError;
pub use resolver::SecretResolver;
pub use uri::SecretUri;
