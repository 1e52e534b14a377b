use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use dns01_digitalocean::{Dns01Provider, ProviderConfig};

/// DNS-01 helper - publishes ACME challenge TXT records on DigitalOcean DNS
#[derive(Parser, Debug)]
#[command(name = "dns01-digitalocean")]
#[command(about = "Create and clean up ACME DNS-01 TXT records on DigitalOcean")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "dns01.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create TXT records, keep them until interrupted, then remove them
    Hold {
        /// Record to publish, as FQDN=VALUE (repeatable)
        #[arg(
            short,
            long = "record",
            value_name = "FQDN=VALUE",
            required = true,
            value_parser = parse_record
        )]
        records: Vec<ChallengeRecord>,

        /// TTL handed to the provider (DigitalOcean applies its default)
        #[arg(long, default_value_t = 120)]
        ttl: u32,

        /// Remove the records after this many seconds instead of waiting for a signal
        #[arg(long, value_name = "SECS")]
        duration: Option<u64>,
    },
}

/// A challenge record given on the command line
#[derive(Debug, Clone, PartialEq)]
struct ChallengeRecord {
    fqdn: String,
    value: String,
}

fn parse_record(s: &str) -> Result<ChallengeRecord, String> {
    let (fqdn, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FQDN=VALUE, got '{}'", s))?;

    // DigitalOcean domain names carry no trailing dot
    let fqdn = fqdn.trim().trim_end_matches('.');
    if fqdn.is_empty() {
        return Err(format!("missing FQDN in '{}'", s));
    }
    if value.is_empty() {
        return Err(format!("missing TXT value in '{}'", s));
    }

    Ok(ChallengeRecord {
        fqdn: fqdn.to_string(),
        value: value.to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("dns01_digitalocean=info".parse()?)
                .add_directive("dns01_secrets=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = ProviderConfig::load_and_resolve(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    tracing::info!("DigitalOcean API: {}", config.api_base);

    let provider: Arc<dyn Dns01Provider> = Arc::new(config.build_provider()?);

    match args.command {
        Command::Hold {
            records,
            ttl,
            duration,
        } => hold(provider, records, ttl, duration).await,
    }
}

/// Publish every record, wait, then remove what was published
async fn hold(
    provider: Arc<dyn Dns01Provider>,
    records: Vec<ChallengeRecord>,
    ttl: u32,
    duration: Option<u64>,
) -> Result<()> {
    // One tracked record per FQDN: a repeat would replace the first record's ID
    let mut seen = HashSet::new();
    for record in &records {
        if !seen.insert(record.fqdn.as_str()) {
            anyhow::bail!(
                "FQDN '{}' given more than once; only one TXT record per FQDN can be held",
                record.fqdn
            );
        }
    }

    let mut failures = 0usize;

    let mut creates = JoinSet::new();
    for record in records {
        let provider = provider.clone();
        creates.spawn(async move {
            let result = provider
                .create_txt_record(&record.fqdn, &record.value, ttl)
                .await;
            (record, result)
        });
    }

    let mut created = Vec::new();
    while let Some(joined) = creates.join_next().await {
        match joined {
            Ok((record, Ok(()))) => created.push(record),
            Ok((record, Err(e))) => {
                tracing::error!(fqdn = %record.fqdn, "Failed to create TXT record: {}", e);
                failures += 1;
            }
            Err(e) => {
                tracing::error!("Create task failed: {}", e);
                failures += 1;
            }
        }
    }

    if failures == 0 {
        tracing::info!(
            "{} TXT record(s) published on {}, waiting before cleanup",
            created.len(),
            provider.name()
        );
        match duration {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                        tracing::info!("Hold duration elapsed");
                    }
                    _ = shutdown_signal() => {}
                }
            }
            None => shutdown_signal().await,
        }
    } else {
        tracing::warn!("Cleaning up {} record(s) after failures", created.len());
    }

    let mut removes = JoinSet::new();
    for record in created {
        let provider = provider.clone();
        removes.spawn(async move {
            let result = provider
                .remove_txt_record(&record.fqdn, &record.value, ttl)
                .await;
            (record, result)
        });
    }

    while let Some(joined) = removes.join_next().await {
        match joined {
            Ok((_, Ok(()))) => {}
            Ok((record, Err(e))) => {
                tracing::error!(fqdn = %record.fqdn, "Failed to remove TXT record: {}", e);
                failures += 1;
            }
            Err(e) => {
                tracing::error!("Remove task failed: {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} TXT record operation(s) failed", failures);
    }

    tracing::info!("All TXT records cleaned up");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM");
        }
    }
}
