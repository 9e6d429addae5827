//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the static directory from the `nodes` section
//! - Select the dialer for the configured protocol
//! - Assemble the health cache
//!
//! # Design Decisions
//! - Fail fast: an unknown protocol is fatal

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::cache::HealthCache;
use crate::config::HealthCacheConfig;
use crate::lifecycle::Shutdown;
use crate::topology::StaticDirectory;
use crate::transport::{DialerRegistry, HealthReport, RegistryError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("transport selection failed: {0}")]
    Transport(#[from] RegistryError),
}

/// Build a cache over the built-in dialers with its own shutdown scope.
pub fn build_cache(config: &HealthCacheConfig) -> Result<HealthCache<HealthReport>, StartupError> {
    let registry = DialerRegistry::with_defaults(config.transport.connect_timeout());
    build_cache_with(config, &registry, CancellationToken::new())
}

/// Build a cache whose streams stop when `shutdown` is triggered.
pub fn build_cache_under(
    config: &HealthCacheConfig,
    shutdown: &Shutdown,
) -> Result<HealthCache<HealthReport>, StartupError> {
    let registry = DialerRegistry::with_defaults(config.transport.connect_timeout());
    build_cache_with(config, &registry, shutdown.token())
}

/// Build a cache, picking the dialer from `registry`.
pub fn build_cache_with(
    config: &HealthCacheConfig,
    registry: &DialerRegistry<HealthReport>,
    root: CancellationToken,
) -> Result<HealthCache<HealthReport>, StartupError> {
    let dialer = registry.get(&config.transport.protocol)?;
    let directory = StaticDirectory::from_config(&config.nodes);

    tracing::info!(
        protocol = %config.transport.protocol,
        nodes = directory.len(),
        keep_alive_secs = config.cache.keep_alive_secs,
        "Health cache configured"
    );

    Ok(HealthCache::from_config(
        Arc::new(directory),
        dialer,
        &config.cache,
        root,
    ))
}
