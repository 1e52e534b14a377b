use std::fmt;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::provider::{Dns01Provider, DnsError};
use crate::state::RecordIds;

/// DigitalOcean API v2 base URL
pub const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

/// DigitalOcean domain records client for DNS-01 challenges
///
/// Remembers the ID of every TXT record it creates, keyed by FQDN, so the
/// record can be deleted by ID afterwards. Only records created through this
/// instance can be removed through it.
///
/// Creating twice for the same FQDN without removing in between replaces the
/// tracked ID; the first remote record is then no longer reachable through
/// `remove` and has to be cleaned up by hand. Concurrent create/remove calls
/// for the same FQDN are not coordinated beyond the map lock, so their outcome
/// depends on which request completes first.
pub struct DigitalOceanProvider {
    client: Client,
    api_token: String,
    api_base: String,
    record_ids: RecordIds,
}

#[derive(Debug, Serialize)]
struct CreateTxtRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct DomainRecordResponse {
    domain_record: DomainRecord,
}

#[derive(Debug, Deserialize)]
struct DomainRecord {
    id: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorBody {
    id: String,
    message: String,
}

impl DigitalOceanProvider {
    /// Create a provider with a default HTTP client
    ///
    /// No request is made here. The default client has no timeout; use
    /// [`DigitalOceanProvider::with_client`] to configure one.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self::with_client(api_token, Client::new())
    }

    /// Create a provider on top of a caller-configured HTTP client
    pub fn with_client(api_token: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            api_token: api_token.into(),
            api_base: DIGITALOCEAN_API_BASE.to_string(),
            record_ids: RecordIds::new(),
        }
    }

    /// Send requests to `api_base` instead of the public API
    pub fn with_base_url(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Record ID currently tracked for `fqdn`
    pub fn tracked_record_id(&self, fqdn: &str) -> Option<u64> {
        self.record_ids.get(fqdn)
    }

    /// Number of FQDNs with a tracked record
    pub fn tracked_count(&self) -> usize {
        self.record_ids.len()
    }

    fn records_url(&self, fqdn: &str) -> String {
        format!("{}/domains/{}/records", self.api_base, fqdn)
    }

    /// Create a TXT record named `@` under `fqdn`
    ///
    /// `ttl` is accepted for interface compatibility but not sent; the
    /// domain's default TTL applies.
    pub async fn create(&self, fqdn: &str, value: &str, _ttl: u32) -> Result<(), DnsError> {
        tracing::debug!(fqdn, "Creating TXT record");

        let response = self
            .client
            .post(self.records_url(fqdn))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .json(&CreateTxtRecord {
                record_type: "TXT",
                name: "@",
                data: value,
            })
            .send()
            .await?;

        let response = error_for_status(response).await?;
        let created: DomainRecordResponse = response.json().await?;
        let record_id = created.domain_record.id;

        if let Some(previous) = self.record_ids.track(fqdn, record_id) {
            tracing::warn!(
                fqdn,
                previous,
                record_id,
                "Replaced tracked TXT record; the previous record is no longer tracked"
            );
        }

        tracing::info!(fqdn, record_id, "Created TXT record");
        Ok(())
    }

    /// Delete the TXT record previously created for `fqdn`
    ///
    /// Fails with [`DnsError::UnknownRecord`] without contacting the API when
    /// no record is tracked. `value` and `ttl` are not used; deletion is by ID.
    pub async fn remove(&self, fqdn: &str, _value: &str, _ttl: u32) -> Result<(), DnsError> {
        let record_id = self
            .record_ids
            .get(fqdn)
            .ok_or_else(|| DnsError::UnknownRecord {
                fqdn: fqdn.to_string(),
            })?;

        tracing::debug!(fqdn, record_id, "Deleting TXT record");

        let response = self
            .client
            .delete(format!("{}/{}", self.records_url(fqdn), record_id))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        error_for_status(response).await?;
        self.record_ids.forget(fqdn);

        tracing::info!(fqdn, record_id, "Deleted TXT record");
        Ok(())
    }
}

/// Turn a status >= 400 into [`DnsError::ProviderApi`]
async fn error_for_status(response: Response) -> Result<Response, DnsError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(provider_api_error(status, &body))
}

/// Decode a DigitalOcean error body, falling back to empty fields
fn provider_api_error(status: u16, body: &str) -> DnsError {
    let ApiErrorBody { id, message } = serde_json::from_str(body).unwrap_or_default();
    DnsError::ProviderApi {
        status,
        id,
        message,
    }
}

impl fmt::Debug for DigitalOceanProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitalOceanProvider")
            .field("api_base", &self.api_base)
            .field("api_token", &"<redacted>")
            .field("tracked_records", &self.record_ids.len())
            .finish()
    }
}

#[async_trait]
impl Dns01Provider for DigitalOceanProvider {
    fn name(&self) -> &'static str {
        "digitalocean"
    }

    async fn create_txt_record(
        &self,
        fqdn: &str,
        value: &str,
        ttl: u32,
    ) -> Result<(), DnsError> {
        self.create(fqdn, value, ttl).await
    }

    async fn remove_txt_record(
        &self,
        fqdn: &str,
        value: &str,
        ttl: u32,
    ) -> Result<(), DnsError> {
        self.remove(fqdn, value, ttl).await
    }
}
