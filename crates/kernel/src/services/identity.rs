//! Bearer token verification against the Supabase auth API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;

/// A caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Resolves bearer tokens to users.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the user owning `token`. Any error means the token is not
    /// accepted.
    async fn resolve_user(&self, token: &str) -> Result<AuthenticatedUser>;
}

/// Supabase GoTrue client.
///
/// Calls `GET {url}/auth/v1/user` with the project's anon key and the
/// caller's access token.
pub struct SupabaseIdentity {
    client: reqwest::Client,
    user_endpoint: String,
    anon_key: String,
}

impl SupabaseIdentity {
    /// Create a new Supabase identity client.
    pub fn new(client: reqwest::Client, url: &str, anon_key: impl Into<String>) -> Self {
        Self {
            client,
            user_endpoint: format!("{}/auth/v1/user", url.trim_end_matches('/')),
            anon_key: anon_key.into(),
        }
    }

    /// Create from application configuration.
    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            client,
            &config.supabase_url,
            config.supabase_anon_key.clone(),
        )
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn resolve_user(&self, token: &str) -> Result<AuthenticatedUser> {
        let response = self
            .client
            .get(&self.user_endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .context("failed to reach identity provider")?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "identity provider rejected token");
            anyhow::bail!("identity provider returned {status}");
        }

        let user: AuthenticatedUser = response
            .json()
            .await
            .context("invalid user payload from identity provider")?;

        debug!(user_id = %user.id, "bearer token resolved");
        Ok(user)
    }
}

impl std::fmt::Debug for SupabaseIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseIdentity")
            .field("user_endpoint", &self.user_endpoint)
            .finish()
    }
}
