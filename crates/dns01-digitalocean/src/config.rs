//! Provider configuration with environment variable priority
//!
//! Configuration is resolved in this order (first found wins):
//! 1. Environment variables (DNS01_*)
//! 2. Config file (dns01.toml)
//! 3. Default values (where applicable)

use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use dns01_secrets::{SecretResolver, SecretUri};
use reqwest::Client;
use serde::Deserialize;

use crate::digitalocean::{DigitalOceanProvider, DIGITALOCEAN_API_BASE};

/// Environment variable prefix
const ENV_PREFIX: &str = "DNS01";

/// Provider configuration (parsed from TOML, can be overridden by env)
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProviderConfig {
    /// DigitalOcean API configuration
    pub digitalocean: Option<DigitalOceanConfig>,
}

/// DigitalOcean API configuration
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DigitalOceanConfig {
    /// Personal access token with write scope (env://, file://, base64:// or plain)
    pub api_token: Option<SecretUri>,

    /// API base URL, mostly useful for testing against a mock
    pub api_base: Option<String>,

    /// HTTP client timeout in seconds (no timeout when unset)
    pub timeout_secs: Option<u64>,
}

/// Resolved configuration with the actual token value
pub struct ResolvedProviderConfig {
    pub api_token: String,
    pub api_base: String,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ResolvedProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProviderConfig")
            .field("api_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

fn get_env_u64(name: &str) -> Option<u64> {
    get_env(name).and_then(|v| v.parse().ok())
}

impl ProviderConfig {
    /// Load configuration from a TOML file (optional)
    pub fn load(path: &str) -> Self {
        if Path::new(path).exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path, e);
                }
            }
        }
        Self::default()
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve configuration from environment variables first, then config file
    pub fn resolve(self) -> anyhow::Result<ResolvedProviderConfig> {
        let do_config = self.digitalocean.unwrap_or_default();

        // API token: ENV > config > required
        let api_token_uri = match get_env("DIGITALOCEAN_API_TOKEN") {
            Some(source) => source
                .parse::<SecretUri>()
                .map_err(|e| anyhow::anyhow!("Invalid DigitalOcean API token source: {}", e))?,
            None => do_config.api_token.ok_or_else(|| anyhow::anyhow!(
                "DigitalOcean API token required. Set DNS01_DIGITALOCEAN_API_TOKEN or digitalocean.api_token in config"
            ))?,
        };

        // API base: ENV > config > default
        let api_base = get_env("DIGITALOCEAN_API_BASE")
            .or(do_config.api_base)
            .unwrap_or_else(|| DIGITALOCEAN_API_BASE.to_string());

        // Timeout: ENV > config > none
        let timeout = get_env_u64("TIMEOUT_SECS")
            .or(do_config.timeout_secs)
            .map(Duration::from_secs);

        let api_token = SecretResolver::new()
            .resolve_trimmed(&api_token_uri)
            .map_err(|e| anyhow::anyhow!("Failed to resolve DigitalOcean API token: {}", e))?;

        if api_token.is_empty() {
            anyhow::bail!("DigitalOcean API token resolved to an empty value");
        }

        Ok(ResolvedProviderConfig {
            api_token,
            api_base,
            timeout,
        })
    }

    /// Load config file and resolve with environment variable overrides
    pub fn load_and_resolve(path: &str) -> anyhow::Result<ResolvedProviderConfig> {
        Self::load(path).resolve()
    }
}

impl ResolvedProviderConfig {
    /// Build the HTTP client and the provider from this configuration
    pub fn build_provider(&self) -> anyhow::Result<DigitalOceanProvider> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(DigitalOceanProvider::with_client(self.api_token.clone(), client)
            .with_base_url(self.api_base.clone()))
    }
}
