//! DNS-01 provider abstraction
//!
//! An ACME client only needs two things from a DNS backend: put a TXT record
//! in place for a challenge, and take it away again afterwards. This trait
//! captures exactly that so backends are interchangeable behind
//! `Arc<dyn Dns01Provider>`.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from DNS provider operations
#[derive(Debug, Error)]
pub enum DnsError {
    /// The provider API answered with a status >= 400.
    ///
    /// `id` and `message` come from the provider's error body and are empty
    /// when the body was missing or could not be decoded.
    #[error("HTTP {status}: {id}: {message}")]
    ProviderApi {
        status: u16,
        id: String,
        message: String,
    },

    /// Connection failure, timeout, or an undecodable success body
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// `remove` was called for a FQDN this provider is not tracking
    #[error("unknown record ID for '{fqdn}'")]
    UnknownRecord { fqdn: String },
}

impl DnsError {
    /// HTTP status of a provider rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            DnsError::ProviderApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Trait for DNS-01 challenge providers
///
/// Implementations must be safe to call concurrently for different FQDNs.
#[async_trait]
pub trait Dns01Provider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &'static str;

    /// Create the challenge TXT record for `fqdn`
    ///
    /// # Arguments
    /// * `fqdn` - The domain the record is created under
    /// * `value` - The key-authorization digest
    /// * `ttl` - Requested TTL in seconds; backends may ignore it
    async fn create_txt_record(&self, fqdn: &str, value: &str, ttl: u32)
        -> Result<(), DnsError>;

    /// Remove the challenge TXT record previously created for `fqdn`
    async fn remove_txt_record(&self, fqdn: &str, value: &str, ttl: u32)
        -> Result<(), DnsError>;
}
