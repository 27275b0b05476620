//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Origins allowed to call the image endpoints when `CORS_ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:5173", "https://fprints.xyz"];

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// CORS allowed origins. The first entry is the fallback origin
    /// echoed to callers that are not on the list.
    pub cors_allowed_origins: Vec<String>,

    /// Identity provider (Supabase) base URL.
    pub supabase_url: String,

    /// Identity provider anonymous API key.
    pub supabase_anon_key: String,

    /// Bunny storage access key.
    pub bunny_api_key: String,

    /// Bunny storage zone name.
    pub bunny_storage_zone: String,

    /// Bunny storage region prefix, e.g. "ny" or "uk". Empty means the
    /// primary (Falkenstein) endpoint.
    pub bunny_storage_region: String,

    /// Folder inside the storage zone that holds uploaded images.
    pub bunny_storage_folder: String,

    /// Explicit storage endpoint, overriding the region-derived host.
    pub bunny_storage_endpoint: Option<String>,

    /// Timeout applied to each outbound request (default: 30s).
    pub upstream_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{key} environment variable is required"))
        };

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let cors_allowed_origins: Vec<String> = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(v) => v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        };
        if cors_allowed_origins.is_empty() {
            anyhow::bail!("CORS_ALLOWED_ORIGINS must list at least one origin");
        }

        let supabase_url = required("SUPABASE_URL")?;
        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;
        let bunny_api_key = required("BUNNY_API_KEY")?;
        let bunny_storage_zone = required("BUNNY_STORAGE_ZONE")?;

        let bunny_storage_region = lookup("BUNNY_STORAGE_REGION")
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let bunny_storage_folder = lookup("BUNNY_STORAGE_FOLDER")
            .map(|s| s.trim().trim_matches('/').to_string())
            .unwrap_or_default();
        let bunny_storage_endpoint = lookup("BUNNY_STORAGE_ENDPOINT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let upstream_timeout_secs: u64 = lookup("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("UPSTREAM_TIMEOUT_SECS must be a valid u64")?;

        Ok(Self {
            port,
            cors_allowed_origins,
            supabase_url,
            supabase_anon_key,
            bunny_api_key,
            bunny_storage_zone,
            bunny_storage_region,
            bunny_storage_folder,
            bunny_storage_endpoint,
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
        })
    }

    /// Base URL of the storage API, without the zone.
    pub fn storage_endpoint(&self) -> String {
        match &self.bunny_storage_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None if self.bunny_storage_region.is_empty() => {
                "https://storage.bunnycdn.com".to_string()
            }
            None => format!("https://{}.storage.bunnycdn.com", self.bunny_storage_region),
        }
    }
}

// Keys stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"<redacted>")
            .field("bunny_api_key", &"<redacted>")
            .field("bunny_storage_zone", &self.bunny_storage_zone)
            .field("bunny_storage_region", &self.bunny_storage_region)
            .field("bunny_storage_folder", &self.bunny_storage_folder)
            .field("bunny_storage_endpoint", &self.bunny_storage_endpoint)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}
