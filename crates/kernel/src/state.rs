//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::file::{BunnyStorage, ImageStorage};
use crate::metrics::Metrics;
use crate::middleware::CorsPolicy;
use crate::services::{self, IdentityProvider, SupabaseIdentity};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Origin allow-list for the image endpoints.
    cors: CorsPolicy,

    /// Bearer token verification.
    identity: Arc<dyn IdentityProvider>,

    /// Image storage backend.
    storage: Arc<dyn ImageStorage>,

    /// Prometheus metrics.
    metrics: Metrics,
}

impl AppState {
    /// Create application state with the real upstream clients.
    pub fn new(config: &Config) -> Result<Self> {
        let client = services::http_client(config.upstream_timeout)?;

        let identity = SupabaseIdentity::from_config(client.clone(), config);
        let storage = BunnyStorage::from_config(client, config)
            .context("failed to configure image storage")?;

        info!(
            storage = storage.scheme(),
            origins = ?config.cors_allowed_origins,
            "Upstream clients configured"
        );

        Ok(Self::with_services(
            CorsPolicy::new(config.cors_allowed_origins.clone())?,
            Arc::new(identity),
            Arc::new(storage),
        ))
    }

    /// Create application state from explicit collaborators.
    pub fn with_services(
        cors: CorsPolicy,
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn ImageStorage>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cors,
                identity,
                storage,
                metrics: Metrics::new(),
            }),
        }
    }

    /// Get the origin policy.
    pub fn cors(&self) -> &CorsPolicy {
        &self.inner.cors
    }

    /// Get the identity provider.
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.identity
    }

    /// Get the image storage backend.
    pub fn storage(&self) -> &Arc<dyn ImageStorage> {
        &self.inner.storage
    }

    /// Get the metrics registry.
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }
}
