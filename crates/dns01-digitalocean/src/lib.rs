//! ACME DNS-01 challenge provider for DigitalOcean DNS
//!
//! [`DigitalOceanProvider`] creates the challenge TXT record through the
//! DigitalOcean domain records API and remembers the record ID so the same
//! record can be deleted once the challenge is validated. It implements
//! [`Dns01Provider`], so an ACME client can hold it as
//! `Arc<dyn Dns01Provider>` next to other backends.

mod config;
mod digitalocean;
mod provider;
mod state;

// Re-export public types
pub use config::{DigitalOceanConfig, ProviderConfig, ResolvedProviderConfig};
pub use digitalocean::{DigitalOceanProvider, DIGITALOCEAN_API_BASE};
pub use provider::{Dns01Provider, DnsError};
