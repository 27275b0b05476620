//! Image storage backends.
//!
//! Provides the deletion capability used by the image endpoint and its
//! Bunny.net edge storage implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Config;

/// Failure reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend answered with a non-success status.
    #[error("{status_text}")]
    Rejected { status: u16, status_text: String },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl StorageError {
    /// Build a rejection from a response status.
    pub fn rejected(status: StatusCode) -> Self {
        Self::Rejected {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or(status.as_str())
                .to_string(),
        }
    }
}

/// Image storage backend trait.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Delete the image stored under `filename`.
    async fn delete(&self, filename: &str) -> Result<(), StorageError>;

    /// Get the storage scheme (e.g., "bunny").
    fn scheme(&self) -> &'static str;
}

/// Bunny.net edge storage.
///
/// Objects live at `{endpoint}/{zone}/{folder}/{filename}` and are
/// authorized with the zone password in the `AccessKey` header.
pub struct BunnyStorage {
    client: reqwest::Client,
    /// Endpoint plus zone and folder segments.
    base_url: Url,
    access_key: String,
}

impl BunnyStorage {
    /// Create a new Bunny storage client.
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        zone: &str,
        folder: &str,
        access_key: impl Into<String>,
    ) -> Result<Self> {
        let mut base_url = Url::parse(endpoint).context("invalid storage endpoint URL")?;
        {
            let mut segments = base_url
                .path_segments_mut()
                .map_err(|()| anyhow::anyhow!("storage endpoint cannot be a base URL"))?;
            segments.pop_if_empty();
            segments.push(zone);
            segments.extend(folder.split('/').filter(|s| !s.is_empty()));
        }

        Ok(Self {
            client,
            base_url,
            access_key: access_key.into(),
        })
    }

    /// Create from application configuration.
    pub fn from_config(client: reqwest::Client, config: &Config) -> Result<Self> {
        Self::new(
            client,
            &config.storage_endpoint(),
            &config.bunny_storage_zone,
            &config.bunny_storage_folder,
            config.bunny_api_key.clone(),
        )
    }

    /// URL of the object for `filename`, with the name percent-encoded.
    pub fn object_url(&self, filename: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(filename);
        }
        url
    }
}

#[async_trait]
impl ImageStorage for BunnyStorage {
    async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        let url = self.object_url(filename);

        let response = self
            .client
            .delete(url.clone())
            .header("AccessKey", &self.access_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "storage rejected delete");
            return Err(StorageError::rejected(status));
        }

        debug!(url = %url, "image deleted from storage");
        Ok(())
    }

    fn scheme(&self) -> &'static str {
        "bunny"
    }
}

impl std::fmt::Debug for BunnyStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BunnyStorage")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}
