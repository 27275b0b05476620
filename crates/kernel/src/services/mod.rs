//! Clients for the external services the kernel depends on.

pub mod identity;

pub use identity::{AuthenticatedUser, IdentityProvider, SupabaseIdentity};

use std::time::Duration;

use anyhow::{Context, Result};

/// Build the HTTP client shared by all upstream services.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        // Upstream APIs never redirect; following one would leak credentials
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("failed to build HTTP client")
}
