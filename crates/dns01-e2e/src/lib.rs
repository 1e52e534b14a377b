//! End-to-end test utilities for the DigitalOcean DNS-01 provider
//!
//! This crate runs the real provider against an in-process mock of the
//! DigitalOcean domain records API, so no account or network access is needed.

pub mod mock_api;

pub use mock_api::{MockDigitalOceanApi, MockResponse, RecordedRequest, TEST_TOKEN};

/// Initialize tracing for tests (safe to call more than once)
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dns01_digitalocean=debug,dns01_e2e=debug")
        .with_test_writer()
        .try_init();
}
