//! Subgraph Pool Cache Service
//!
//! Warm-up check: builds a provider for every configured chain and protocol,
//! reads each snapshot once through the cache, logs the pool counts and exits.
//! A non-zero exit means a snapshot is missing, unreadable or malformed.
//!
//! Routers embed the library and hold their own providers; this binary does
//! not serve reads.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use subgraph_pool_cache::{
    store, ChainId, LocalPoolCache, PoolCacheConfig, PoolCacheCore, Protocol, V2SubgraphProvider,
    V3SubgraphProvider,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pool_cache_service", about = "Check that the subgraph pool snapshots load")]
struct Args {
    /// TOML config file; POOL_CACHE_* environment variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chain ids to warm, replacing the configured list
    #[arg(long = "chain")]
    chains: Vec<u32>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("subgraph_pool_cache=info,pool_cache_service=info"));
    if args.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🚀 Starting Subgraph Pool Cache warm-up check");

    let mut config = PoolCacheConfig::load(args.config.as_deref())
        .context("Failed to load pool cache configuration")?;
    if !args.chains.is_empty() {
        config.chains = args
            .chains
            .iter()
            .map(|id| ChainId::try_from(*id).map_err(|e| anyhow::anyhow!("{}", e)))
            .collect::<Result<Vec<_>>>()?;
    }
    config.validate().context("Invalid pool cache configuration")?;

    info!("⚡ Configuration:");
    info!("  Bucket: {}", config.bucket);
    info!("  Base key: {}", config.base_key);
    info!("  Chains: {:?}", config.chains);
    info!("  Protocols: {:?}", config.protocols);
    info!("  Store: {:?}", config.store.kind);
    if let Some(endpoint) = &config.store.endpoint {
        info!("  Store endpoint: {}", endpoint);
    }
    info!("  Cache TTL: {}s", config.cache_ttl_secs);

    let store = store::from_config(&config.store)
        .await
        .context("Failed to build object store client")?;
    let core = Arc::new(PoolCacheCore::new(
        Arc::new(LocalPoolCache::with_ttl(config.cache_ttl())),
        store,
    ));

    let mut v2_providers = Vec::new();
    let mut v3_providers = Vec::new();

    for &chain in &config.chains {
        for &protocol in &config.protocols {
            match protocol {
                Protocol::V2 => {
                    let provider = V2SubgraphProvider::eager_build(
                        core.clone(),
                        &config.bucket,
                        &config.base_key,
                        chain,
                    )
                    .await
                    .with_context(|| format!("Failed to warm V2 pools for chain {}", chain))?;
                    v2_providers.push(provider);
                }
                Protocol::V3 => {
                    let provider = V3SubgraphProvider::eager_build(
                        core.clone(),
                        &config.bucket,
                        &config.base_key,
                        chain,
                    )
                    .await
                    .with_context(|| format!("Failed to warm V3 pools for chain {}", chain))?;
                    v3_providers.push(provider);
                }
            }
        }
    }

    // Served from the local tier now; every read here is a cache hit
    for provider in &v2_providers {
        let pools = provider.get_pools().await?;
        info!(chain = %provider.chain(), protocol = "V2", count = pools.len(), "V2 pools ready");
    }
    for provider in &v3_providers {
        let pools = provider.get_pools().await?;
        info!(chain = %provider.chain(), protocol = "V3", count = pools.len(), "V3 pools ready");
    }

    info!(
        "✅ Pool cache warm: {} V2 providers, {} V3 providers, {} local entries",
        v2_providers.len(),
        v3_providers.len(),
        core.local_cache().len()
    );

    Ok(())
}
